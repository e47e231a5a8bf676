//! Justification engine: assigns a purpose, business value, and
//! confidence score to every entity, asking the LLM per entity in
//! hierarchy order and queuing clarification questions for whatever it
//! is unsure about. Reuses `domain::ports::LlmRouter` rather than
//! declaring its own port.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{build_prompt, EntityContext, JustificationEngine};
pub use domain::{
    ClarificationField, ClarificationQuestion, ConfidenceLevel, EntityKindHint, InferredFrom,
    Justification, DEFAULT_CLARIFICATION_THRESHOLD,
};
