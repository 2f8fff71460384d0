//! Skill variants and the skill manager for LexSkill.
//!
//! Five task domains share one result contract:
//!
//! | Skill | Classification | Escalation |
//! |---|---|---|
//! | `case_triage` | from the model | from the model |
//! | `collections_risk` | derived from `risk_score` | from the model |
//! | `briefing` | from `overall_status` | forced at 5+ priority alerts |
//! | `charge_extraction` | from the model | exactly when RED |
//! | `document_generation` | from the model | from the model |
//!
//! All of them parse model text through [`parse::parse_with`], so a reply
//! that cannot be read always surfaces as an escalated result.

pub mod briefing;
pub mod charges;
pub mod collections;
pub mod document;
pub mod manager;
pub mod parse;
pub mod triage;

pub use briefing::{BriefingSkill, format_briefing_markdown};
pub use charges::{Charge, ChargeClass, ChargeExtractionSkill, charges_from_result};
pub use collections::{CollectionsRiskSkill, DunningStage, classify_risk_score};
pub use document::DocumentGenerationSkill;
pub use manager::{SkillInfo, SkillManager, builtin_skills, serialize_input};
pub use parse::{FallbackPolicy, ParseFailure, extract_json_object};
pub use triage::{CASE_PHASES, CasePhase, CaseTriageSkill, PhaseAssessment, phase_assessment};
