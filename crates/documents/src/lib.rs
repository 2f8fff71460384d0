//! # LexSkill Documents
//!
//! Template-driven drafting on top of the `document_generation` skill.
//!
//! ```text
//! TemplateStore ──► template + body ──┐
//! CaseStore ──► case context ─────────┼─► resolve_variables ─► SkillManager (or substitute)
//! explicit values ────────────────────┘                              │
//!                                      DocumentRenderer ◄────────────┘ ─► log_generation
//! ```

pub mod generator;
pub mod render;
pub mod store;
pub mod variables;

pub use generator::{DocumentGenerator, GenerationOutcome, GenerationRequest, QualityAssessment};
pub use render::{DocumentRenderer, TextFileRenderer, output_filename};
pub use store::{
    CaseStore, GeneratedDocument, InMemoryCaseStore, InMemoryTemplateStore, Template, TemplateStore,
};
pub use variables::{
    Confidence, ResolvedVariable, VariableResolution, VariableSource, placeholders, resolve_variables,
    substitute,
};
