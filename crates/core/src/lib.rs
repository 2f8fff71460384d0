//! # LexSkill Core
//!
//! Domain types, traits, and error definitions for LexSkill, a framework that
//! turns free-text language-model output into structured, auditable decision
//! records for legal-operations workflows.
//!
//! This crate has **no network dependencies**. It defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined as a trait here. Implementations live in their
//! respective crates:
//! - [`Skill`]: one task domain (triage, collections, briefing, ...)
//! - [`Provider`]: the external model service
//!
//! Every skill produces the same [`SkillResult`] carrying exactly one
//! [`Classification`], so unrelated assessments can be logged, compared and
//! escalated uniformly.

pub mod classification;
pub mod error;
pub mod message;
pub mod provider;
pub mod result;
pub mod skill;

// Re-export key types at crate root for ergonomics
pub use classification::Classification;
pub use error::{Error, ProviderError, Result};
pub use message::{Message, Role};
pub use provider::{ContentSegment, Provider, ProviderRequest, ProviderResponse, Usage};
pub use result::SkillResult;
pub use skill::{DISCLAIMER, Skill, SkillConfig, UNIVERSAL_ESCALATION_TRIGGERS};
