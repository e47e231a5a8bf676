//! Justification domain model: the rich, in-memory record the engine
//! builds per entity, its confidence scoring, and the clarification
//! queue that backs the follow-up question workflow.

use serde::{Deserialize, Serialize};

/// Confidence band derived from `confidence_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Uncertain,
}

impl ConfidenceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else if score >= 0.3 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Uncertain
        }
    }
}

/// Where a justification's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredFrom {
    Llm,
    Heuristic,
    UserProvided,
    Aggregated,
}

/// Kind of entity a justification targets, used only to prioritize
/// clarification questions (`entity_type_priority`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKindHint {
    File,
    Module,
    Class,
    Interface,
    Function,
    Method,
    Variable,
}

impl EntityKindHint {
    /// Higher-level entities are asked about first: a misjustified file
    /// poisons every justification built on top of it.
    fn priority(self) -> u32 {
        match self {
            EntityKindHint::File => 0,
            EntityKindHint::Module => 1,
            EntityKindHint::Class | EntityKindHint::Interface => 2,
            EntityKindHint::Function | EntityKindHint::Method => 3,
            EntityKindHint::Variable => 4,
        }
    }
}

/// One field the user may be asked to confirm or correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationField {
    Purpose,
    BusinessValue,
    FeatureContext,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub entity_id: String,
    pub field: ClarificationField,
    pub question: String,
    pub priority: u32,
}

impl ClarificationQuestion {
    /// `entityTypePriority*100 + hierarchyDepth*10 + floor((1-score)*10)`;
    /// lower sorts first.
    pub fn priority_for(entity_kind: EntityKindHint, hierarchy_depth: u32, confidence_score: f32) -> u32 {
        let confidence_term = ((1.0 - confidence_score.clamp(0.0, 1.0)) * 10.0).floor() as u32;
        entity_kind.priority() * 100 + hierarchy_depth * 10 + confidence_term
    }
}

/// The engine's per-entity record: a superset of
/// `codegraph_storage::Justification`, flattened down to that narrower
/// persisted shape on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Justification {
    pub entity_id: String,
    pub purpose_summary: String,
    pub business_value: Option<String>,
    pub feature_context: Option<String>,
    pub detailed_description: Option<String>,
    pub tags: Vec<String>,
    pub confidence_score: f32,
    pub reasoning: Option<String>,
    pub needs_clarification: bool,
    pub clarification_questions: Vec<String>,
    pub inferred_from: InferredFrom,
    pub last_confirmed_by_user: bool,
}

impl Justification {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence_score)
    }

    /// Heuristic fallback used when the LLM response is missing or
    /// fails schema validation: low confidence, flagged for review.
    pub fn heuristic_fallback(entity_id: impl Into<String>, name_hint: &str, path_hint: &str) -> Self {
        let purpose_summary = format!("Inferred from name/path: `{name_hint}` in `{path_hint}`");
        Self {
            entity_id: entity_id.into(),
            purpose_summary,
            business_value: None,
            feature_context: None,
            detailed_description: None,
            tags: Vec::new(),
            confidence_score: 0.1,
            reasoning: Some("heuristic fallback: LLM response missing or invalid".to_string()),
            needs_clarification: true,
            clarification_questions: Vec::new(),
            inferred_from: InferredFrom::Heuristic,
            last_confirmed_by_user: false,
        }
    }

    /// Applies a user's answer to the given field: raises confidence by
    /// 0.3 (capped at 1.0), marks the provenance, clears the
    /// clarification flag once above threshold.
    pub fn apply_user_answer(&mut self, field: ClarificationField, answer: &str, clarification_threshold: f32) {
        match field {
            ClarificationField::Purpose => self.purpose_summary = answer.to_string(),
            ClarificationField::BusinessValue => self.business_value = Some(answer.to_string()),
            ClarificationField::FeatureContext => self.feature_context = Some(answer.to_string()),
            ClarificationField::Other => self.detailed_description = Some(answer.to_string()),
        }
        self.confidence_score = (self.confidence_score + 0.3).min(1.0);
        self.inferred_from = InferredFrom::UserProvided;
        self.last_confirmed_by_user = true;
        if self.confidence_score >= clarification_threshold {
            self.needs_clarification = false;
        }
    }

    pub fn to_storage_row(&self) -> codegraph_storage::Justification {
        codegraph_storage::Justification {
            entity_id: self.entity_id.clone(),
            purpose: self.purpose_summary.clone(),
            business_value: self.business_value.clone(),
            confidence: self.confidence_score,
            status: if self.needs_clarification {
                codegraph_storage::JustificationStatus::NeedsClarification
            } else if self.last_confirmed_by_user {
                codegraph_storage::JustificationStatus::Confirmed
            } else {
                codegraph_storage::JustificationStatus::Pending
            },
            created_at: chrono::Utc::now(),
        }
    }
}

pub const DEFAULT_CLARIFICATION_THRESHOLD: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_bands_match_thresholds() {
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.3), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.2), ConfidenceLevel::Uncertain);
    }

    #[test]
    fn higher_level_entities_prioritized_first() {
        let file_priority = ClarificationQuestion::priority_for(EntityKindHint::File, 0, 0.2);
        let function_priority = ClarificationQuestion::priority_for(EntityKindHint::Function, 0, 0.2);
        assert!(file_priority < function_priority);
    }

    #[test]
    fn user_answer_raises_confidence_and_clears_flag() {
        let mut j = Justification::heuristic_fallback("e1", "handler", "src/api.rs");
        assert!(j.needs_clarification);

        j.apply_user_answer(ClarificationField::Purpose, "Handles incoming webhook POSTs", DEFAULT_CLARIFICATION_THRESHOLD);

        assert_eq!(j.purpose_summary, "Handles incoming webhook POSTs");
        assert!((j.confidence_score - 0.4).abs() < 1e-6);
        assert_eq!(j.inferred_from, InferredFrom::UserProvided);
        assert!(j.needs_clarification); // 0.4 < 0.5 threshold, still pending

        j.apply_user_answer(ClarificationField::BusinessValue, "Keeps billing in sync", DEFAULT_CLARIFICATION_THRESHOLD);
        assert!(!j.needs_clarification); // 0.7 >= 0.5
    }

    #[test]
    fn confidence_capped_at_one() {
        let mut j = Justification::heuristic_fallback("e1", "x", "y");
        j.confidence_score = 0.9;
        j.apply_user_answer(ClarificationField::Purpose, "answer", DEFAULT_CLARIFICATION_THRESHOLD);
        assert_eq!(j.confidence_score, 1.0);
    }
}
