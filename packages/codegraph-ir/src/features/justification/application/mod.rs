//! Justification engine: builds the typed prompt for one entity, parses
//! and validates the LLM's response, and maintains the clarification
//! queue across entities.
//!
//! Prompt-assembly style borrows the typed-summary convention used for
//! per-kind analysis results in `features/effect_analysis`.

use std::collections::BinaryHeap;
use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::domain::models::{LlmInferOptions, LlmInferResult};
use crate::domain::ports::LlmRouter;
use crate::errors::Result;
use crate::features::justification::domain::{
    ClarificationField, ClarificationQuestion, EntityKindHint, InferredFrom, Justification,
    DEFAULT_CLARIFICATION_THRESHOLD,
};

/// Minimal context gathered for one entity before prompting: parent
/// justification, callers/callees with their own summaries, siblings.
#[derive(Debug, Clone, Default)]
pub struct EntityContext {
    pub entity_id: String,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub source_excerpt: String,
    pub parent_purpose: Option<String>,
    pub caller_summaries: Vec<String>,
    pub callee_summaries: Vec<String>,
    pub sibling_names: Vec<String>,
    pub project_name: Option<String>,
}

/// The JSON shape the prompt asks the LLM to emit. Field names match
/// the wire schema exactly so `serde_json` can deserialize without a
/// translation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JustificationResponse {
    purpose_summary: String,
    business_value: Option<String>,
    feature_context: Option<String>,
    detailed_description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    confidence_score: f32,
    reasoning: Option<String>,
    #[serde(default)]
    needs_clarification: bool,
    #[serde(default)]
    clarification_questions: Vec<String>,
}

/// Builds the typed prompt variant for the given entity kind.
pub fn build_prompt(ctx: &EntityContext) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "You are analyzing a {kind} named `{name}` at `{path}`.",
        kind = ctx.kind,
        name = ctx.name,
        path = ctx.path
    ));

    if let Some(parent) = &ctx.parent_purpose {
        sections.push(format!("Parent purpose: {parent}"));
    }
    if !ctx.caller_summaries.is_empty() {
        sections.push(format!("Called by: {}", ctx.caller_summaries.join("; ")));
    }
    if !ctx.callee_summaries.is_empty() {
        sections.push(format!("Calls: {}", ctx.callee_summaries.join("; ")));
    }
    if !ctx.sibling_names.is_empty() {
        sections.push(format!("Sibling entities: {}", ctx.sibling_names.join(", ")));
    }
    if let Some(project) = &ctx.project_name {
        sections.push(format!("Project: {project}"));
    }

    sections.push(format!("Source:\n```\n{}\n```", ctx.source_excerpt));

    sections.push(
        "Respond with a JSON object matching exactly this schema: \
        {\"purposeSummary\": string, \"businessValue\": string|null, \
        \"featureContext\": string|null, \"detailedDescription\": string|null, \
        \"tags\": string[], \"confidenceScore\": number (0-1), \"reasoning\": string|null, \
        \"needsClarification\": boolean, \"clarificationQuestions\": string[]}. \
        Emit nothing but that JSON object."
            .to_string(),
    );

    sections.join("\n\n")
}

/// Parses and validates an LLM response, falling back to a heuristic
/// justification when it is missing or fails schema validation.
fn parse_response(ctx: &EntityContext, raw: &str) -> Justification {
    let parsed: std::result::Result<JustificationResponse, _> = serde_json::from_str(raw.trim());

    match parsed {
        Ok(resp) if !resp.purpose_summary.trim().is_empty() && (0.0..=1.0).contains(&resp.confidence_score) => {
            Justification {
                entity_id: ctx.entity_id.clone(),
                purpose_summary: resp.purpose_summary,
                business_value: resp.business_value,
                feature_context: resp.feature_context,
                detailed_description: resp.detailed_description,
                tags: resp.tags,
                confidence_score: resp.confidence_score,
                reasoning: resp.reasoning,
                needs_clarification: resp.needs_clarification,
                clarification_questions: resp.clarification_questions,
                inferred_from: InferredFrom::Llm,
                last_confirmed_by_user: false,
            }
        }
        _ => Justification::heuristic_fallback(ctx.entity_id.clone(), &ctx.name, &ctx.path),
    }
}

/// Orchestrates the per-entity prompt/parse cycle and the clarification
/// queue. Hierarchy-order traversal itself is the caller's
/// responsibility (it owns the entity tree); this engine only needs to
/// be called in parent-before-child order so `parent_purpose` is
/// available when it matters.
pub struct JustificationEngine {
    llm: std::sync::Arc<dyn LlmRouter>,
    clarification_threshold: f32,
    pending_questions: parking_lot::Mutex<BinaryHeap<Reverse<PrioritizedQuestion>>>,
}

#[derive(Debug, Clone, PartialEq)]
struct PrioritizedQuestion(ClarificationQuestion);

impl Eq for PrioritizedQuestion {}

impl PartialOrd for PrioritizedQuestion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedQuestion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.priority.cmp(&other.0.priority)
    }
}

impl JustificationEngine {
    pub fn new(llm: std::sync::Arc<dyn LlmRouter>) -> Self {
        Self {
            llm,
            clarification_threshold: DEFAULT_CLARIFICATION_THRESHOLD,
            pending_questions: parking_lot::Mutex::new(BinaryHeap::new()),
        }
    }

    /// Justifies one entity: builds the prompt, calls the LLM, parses
    /// the response, and enqueues up to 3 clarification questions if
    /// the resulting confidence is below threshold.
    pub async fn justify(&self, ctx: &EntityContext, entity_kind: EntityKindHint, hierarchy_depth: u32) -> Result<Justification> {
        let prompt = build_prompt(ctx);
        let justification = match self.llm.infer(&prompt, LlmInferOptions::default()).await {
            Ok(LlmInferResult { text, .. }) => parse_response(ctx, &text),
            Err(_) => Justification::heuristic_fallback(ctx.entity_id.clone(), &ctx.name, &ctx.path),
        };

        if justification.confidence_score < self.clarification_threshold {
            self.enqueue_questions(ctx, &justification, entity_kind, hierarchy_depth);
        }

        Ok(justification)
    }

    fn enqueue_questions(&self, ctx: &EntityContext, justification: &Justification, entity_kind: EntityKindHint, hierarchy_depth: u32) {
        let priority = ClarificationQuestion::priority_for(entity_kind, hierarchy_depth, justification.confidence_score);
        let mut heap = self.pending_questions.lock();
        for question in justification.clarification_questions.iter().take(3) {
            heap.push(Reverse(PrioritizedQuestion(ClarificationQuestion {
                entity_id: ctx.entity_id.clone(),
                field: ClarificationField::Other,
                question: question.clone(),
                priority,
            })));
        }
    }

    /// Returns the top-N pending questions, deduplicated per entity
    /// (at most one question surfaced per entity per batch).
    pub fn next_clarification_batch(&self, n: usize) -> Vec<ClarificationQuestion> {
        let mut heap = self.pending_questions.lock();
        let mut seen_entities = std::collections::HashSet::new();
        let mut batch = Vec::new();
        let mut deferred = Vec::new();

        while batch.len() < n {
            match heap.pop() {
                Some(Reverse(q)) => {
                    if seen_entities.insert(q.0.entity_id.clone()) {
                        batch.push(q.0);
                    } else {
                        deferred.push(Reverse(q));
                    }
                }
                None => break,
            }
        }
        for item in deferred {
            heap.push(item);
        }
        batch
    }

    pub fn pending_question_count(&self) -> usize {
        self.pending_questions.lock().len()
    }

    /// Aggregates child justifications into a parent summary. The
    /// result is flagged `aggregated` regardless of confidence.
    pub async fn aggregate(&self, parent_ctx: &EntityContext, child_summaries: &[String]) -> Result<Justification> {
        let prompt = format!(
            "Summarize the overall purpose of `{}` given its children's purposes:\n{}\n\n{}",
            parent_ctx.name,
            child_summaries.join("\n- "),
            "Respond with the same JSON schema as before."
        );

        let mut justification = match self.llm.infer(&prompt, LlmInferOptions::default()).await {
            Ok(LlmInferResult { text, .. }) => parse_response(parent_ctx, &text),
            Err(_) => Justification::heuristic_fallback(parent_ctx.entity_id.clone(), &parent_ctx.name, &parent_ctx.path),
        };
        justification.inferred_from = InferredFrom::Aggregated;
        Ok(justification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubRouter(String);

    #[async_trait]
    impl LlmRouter for StubRouter {
        async fn infer(&self, _prompt: &str, _options: LlmInferOptions) -> Result<LlmInferResult> {
            Ok(LlmInferResult {
                text: self.0.clone(),
                model_id: "stub".to_string(),
            })
        }
        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    fn sample_ctx() -> EntityContext {
        EntityContext {
            entity_id: "e1".to_string(),
            name: "process_payment".to_string(),
            path: "src/billing.rs".to_string(),
            kind: "function".to_string(),
            source_excerpt: "fn process_payment() {}".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn prompt_includes_entity_and_context() {
        let mut ctx = sample_ctx();
        ctx.parent_purpose = Some("Billing module".to_string());
        ctx.caller_summaries = vec!["checkout handler".to_string()];

        let prompt = build_prompt(&ctx);

        assert!(prompt.contains("process_payment"));
        assert!(prompt.contains("Billing module"));
        assert!(prompt.contains("checkout handler"));
    }

    #[tokio::test]
    async fn valid_response_parsed_into_justification() {
        let response = serde_json::json!({
            "purposeSummary": "Processes a customer payment",
            "businessValue": "Revenue collection",
            "featureContext": null,
            "detailedDescription": null,
            "tags": ["billing"],
            "confidenceScore": 0.9,
            "reasoning": "Clear from name and body",
            "needsClarification": false,
            "clarificationQuestions": []
        })
        .to_string();

        let engine = JustificationEngine::new(std::sync::Arc::new(StubRouter(response)));
        let justification = engine.justify(&sample_ctx(), EntityKindHint::Function, 3).await.unwrap();

        assert_eq!(justification.purpose_summary, "Processes a customer payment");
        assert_eq!(justification.confidence_level(), crate::features::justification::domain::ConfidenceLevel::High);
        assert_eq!(engine.pending_question_count(), 0);
    }

    #[tokio::test]
    async fn invalid_response_falls_back_to_heuristic() {
        let engine = JustificationEngine::new(std::sync::Arc::new(StubRouter("not json".to_string())));
        let justification = engine.justify(&sample_ctx(), EntityKindHint::Function, 3).await.unwrap();

        assert_eq!(justification.inferred_from, crate::features::justification::domain::InferredFrom::Heuristic);
        assert!(justification.needs_clarification);
    }

    #[tokio::test]
    async fn low_confidence_enqueues_clarification_questions() {
        let response = serde_json::json!({
            "purposeSummary": "Unclear helper",
            "businessValue": null,
            "featureContext": null,
            "detailedDescription": null,
            "tags": [],
            "confidenceScore": 0.2,
            "reasoning": null,
            "needsClarification": true,
            "clarificationQuestions": ["What does this function compute?", "Who calls it?"]
        })
        .to_string();

        let engine = JustificationEngine::new(std::sync::Arc::new(StubRouter(response)));
        engine.justify(&sample_ctx(), EntityKindHint::Function, 3).await.unwrap();

        assert_eq!(engine.pending_question_count(), 2);
        let batch = engine.next_clarification_batch(10);
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn clarification_batch_dedupes_per_entity() {
        let engine = JustificationEngine::new(std::sync::Arc::new(StubRouter("{}".to_string())));
        let ctx = sample_ctx();
        let justification = Justification {
            entity_id: ctx.entity_id.clone(),
            purpose_summary: "x".to_string(),
            business_value: None,
            feature_context: None,
            detailed_description: None,
            tags: vec![],
            confidence_score: 0.1,
            reasoning: None,
            needs_clarification: true,
            clarification_questions: vec!["Q1".to_string(), "Q2".to_string()],
            inferred_from: InferredFrom::Heuristic,
            last_confirmed_by_user: false,
        };
        engine.enqueue_questions(&ctx, &justification, EntityKindHint::Function, 0);

        let batch = engine.next_clarification_batch(10);
        assert_eq!(batch.len(), 1); // both questions belong to the same entity
    }
}
