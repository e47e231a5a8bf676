//! Hybrid Search Service — fuses the lexical (Tantivy) and semantic
//! (embedding) retrieval legs with intent-tuned Reciprocal Rank
//! Fusion, then enriches and boosts the merged result set.
//!
//! # RRF (Reciprocal Rank Fusion)
//!
//! ```text
//! RRF_score(d) = Σ (1 / (k_leg + rank_leg(d)))
//! ```
//! `k_leg` is chosen per query intent rather than a single constant,
//! so that e.g. a "who calls X" query weights the lexical leg (exact
//! symbol hits) over the semantic one.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::domain::models::LlmInferOptions;
use crate::domain::ports::{Embedder, LlmRouter};
use crate::errors::Result;
use crate::features::lexical::tantivy_index::{SearchHit, TantivyLexicalIndex};
use crate::features::pattern_detection::detect_patterns;
use codegraph_storage::{Store, StoreParams};

/// Unified search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Search query (natural language or keywords)
    pub query: String,

    /// Filters (file path, repo ID, business scope, etc.)
    pub filters: Vec<Filter>,

    /// Result limit, applied after fusion and normalization.
    pub limit: usize,

    /// Hybrid search configuration
    pub hybrid_config: Option<HybridSearchConfig>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: Vec::new(),
            limit: 30,
            hybrid_config: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_hybrid(mut self, config: HybridSearchConfig) -> Self {
        self.hybrid_config = Some(config);
        self
    }

    fn business_scope(&self) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            Filter::Custom(key, value) if key == "feature_context" => Some(value.as_str()),
            _ => None,
        })
    }

    fn file_path_filter(&self) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            Filter::FilePath(pattern) => Some(pattern.as_str()),
            _ => None,
        })
    }
}

/// Search filter.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Filter by file path (glob pattern)
    FilePath(String),

    /// Filter by repository ID
    RepoId(String),

    /// Filter by chunk kind (function, class, file)
    ChunkKind(String),

    /// Custom filter (key-value). `("feature_context", value)` scopes
    /// results to files whose justification's business value matches.
    Custom(String, String),
}

/// Hybrid search configuration. `rrf_k_*` are intent-tuned and kept
/// tunable rather than hardcoded so they can be re-derived from search
/// quality telemetry later.
#[derive(Debug, Clone)]
pub struct HybridSearchConfig {
    pub enable_lexical: bool,
    pub enable_semantic: bool,
    /// Ask the LLM router for 3 synonyms and run them as extra semantic queries.
    pub enable_query_expansion: bool,
    /// Synthesize a cited Markdown answer for question-shaped queries.
    pub enable_synthesis: bool,
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            enable_lexical: true,
            enable_semantic: true,
            enable_query_expansion: false,
            enable_synthesis: false,
        }
    }
}

/// Query intent, driving both RRF constants and query expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    Definition,
    Usage,
    Conceptual,
    Keyword,
}

impl QueryIntent {
    /// `(k_semantic, k_lexical)` — lower k weights that leg more heavily.
    fn rrf_constants(self) -> (f32, f32) {
        match self {
            QueryIntent::Definition => (40.0, 80.0),
            QueryIntent::Usage => (80.0, 40.0),
            QueryIntent::Conceptual => (50.0, 70.0),
            QueryIntent::Keyword => (60.0, 60.0),
        }
    }
}

fn classify_intent(query: &str) -> QueryIntent {
    let usage_re = Regex::new(r"(?i)who calls|callers of|usages|references to|where is .+ used").unwrap();
    let definition_re =
        Regex::new(r"(?i)where is .+ defined|^(class|interface|type|struct|enum)\s+\w+").unwrap();
    let conceptual_re = Regex::new(r"(?i)^how does|^explain|what is the purpose of|^why does|^what does").unwrap();

    if usage_re.is_match(query) {
        QueryIntent::Usage
    } else if definition_re.is_match(query) {
        QueryIntent::Definition
    } else if conceptual_re.is_match(query) {
        QueryIntent::Conceptual
    } else {
        QueryIntent::Keyword
    }
}

fn is_question(query: &str) -> bool {
    let trimmed = query.trim();
    trimmed.ends_with('?')
        || Regex::new(r"(?i)^(what|how|why|where|when|who|which|explain)\b")
            .unwrap()
            .is_match(trimmed)
}

fn is_filename_query(query: &str) -> bool {
    let extension_re = Regex::new(r"\.(rs|py|ts|tsx|js|jsx|go|java|kt|rb)$").unwrap();
    extension_re.is_match(query) || query.contains('/')
}

/// One fused, enriched hit in a hybrid search response.
#[derive(Debug, Clone)]
pub struct HybridResult {
    pub file_path: String,
    pub entity_id: Option<String>,
    pub name: Option<String>,
    pub score: f32,
    pub snippet: Option<String>,
    pub justification: Option<String>,
    pub business_value: Option<String>,
    pub patterns: Vec<String>,
    pub popularity: u64,
    pub top_callers: Vec<String>,
    pub from_semantic: bool,
}

/// Unified search response.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub results: Vec<HybridResult>,
    pub total: usize,
    pub latency_ms: u64,
    pub sources: Vec<String>,
    pub intent: Option<String>,
    /// `[n]`-cited Markdown answer, present only for question-shaped
    /// queries with synthesis enabled and an LLM router configured.
    pub synthesis: Option<String>,
}

struct RankedFile {
    file_path: String,
    semantic_rank: Option<usize>,
    lexical_rank: Option<usize>,
    lexical_hit: Option<SearchHit>,
    from_semantic_entity: Option<String>,
}

/// Hybrid search service over the lexical index, the vector store, and
/// an optional LLM router for query expansion / answer synthesis.
pub struct QueryRouter {
    lexical_index: Arc<TantivyLexicalIndex>,
    store: Arc<dyn Store>,
    embedder: Option<Arc<dyn Embedder>>,
    llm: Option<Arc<dyn LlmRouter>>,
}

impl QueryRouter {
    pub fn new(lexical_index: Arc<TantivyLexicalIndex>, store: Arc<dyn Store>) -> Self {
        Self { lexical_index, store, embedder: None, llm: None }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmRouter>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let start = std::time::Instant::now();
        let config = request.hybrid_config.clone().unwrap_or_default();
        let intent = classify_intent(&request.query);
        let (k_semantic, k_lexical) = intent.rrf_constants();

        let mut sources = Vec::new();

        let business_files = match request.business_scope() {
            Some(ctx) => Some(self.resolve_business_scope(ctx).await?),
            None => None,
        };

        // --- Lexical leg ---
        let lexical_hits = if config.enable_lexical {
            sources.push("lexical".to_string());
            match self.lexical_index.search(&request.query, request.limit * 2) {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!("hybrid search: lexical leg unavailable: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        // --- Semantic leg (primary query + expansions) ---
        let mut semantic_hits: Vec<(String, Option<String>, f32)> = Vec::new();
        if config.enable_semantic {
            if let Some(embedder) = &self.embedder {
                sources.push("semantic".to_string());
                let mut queries = vec![request.query.clone()];
                if config.enable_query_expansion {
                    queries.extend(self.expand_query(&request.query).await);
                }

                // Primary query runs first; expansions only contribute
                // entities the primary query didn't already surface,
                // via the `seen` dedupe below, so primary order wins.
                let mut seen = std::collections::HashSet::new();
                for query_text in &queries {
                    let matches = match embedder.embed(query_text).await {
                        Ok(embedding) => {
                            self.store.vector_search(&embedding.vector, request.limit * 2).await.unwrap_or_default()
                        }
                        Err(e) => {
                            tracing::warn!("hybrid search: embedder unavailable: {e}");
                            Vec::new()
                        }
                    };
                    for m in matches {
                        if !seen.insert(m.entity_id.clone()) {
                            continue;
                        }
                        if let Some((file_path, name)) = self.resolve_entity_file(&m.entity_id).await? {
                            semantic_hits.push((file_path, name, m.score));
                        }
                    }
                }
            }
        }

        // --- Rank both legs per file ---
        let mut ranked: HashMap<String, RankedFile> = HashMap::new();
        for (rank, hit) in lexical_hits.into_iter().enumerate() {
            if let Some(scope) = &business_files {
                if !scope.contains(&hit.file_path) {
                    continue;
                }
            }
            if let Some(pattern) = request.file_path_filter() {
                if !hit.file_path.contains(pattern) {
                    continue;
                }
            }
            ranked
                .entry(hit.file_path.clone())
                .or_insert_with(|| RankedFile {
                    file_path: hit.file_path.clone(),
                    semantic_rank: None,
                    lexical_rank: None,
                    lexical_hit: None,
                    from_semantic_entity: None,
                })
                .lexical_rank
                .get_or_insert(rank + 1);
            let file_path = hit.file_path.clone();
            ranked.get_mut(&file_path).unwrap().lexical_hit = Some(hit);
        }

        for (rank, (file_path, entity_id, _score)) in semantic_hits.into_iter().enumerate() {
            if let Some(scope) = &business_files {
                if !scope.contains(&file_path) {
                    continue;
                }
            }
            if let Some(pattern) = request.file_path_filter() {
                if !file_path.contains(pattern) {
                    continue;
                }
            }
            let entry = ranked.entry(file_path.clone()).or_insert_with(|| RankedFile {
                file_path: file_path.clone(),
                semantic_rank: None,
                lexical_rank: None,
                lexical_hit: None,
                from_semantic_entity: None,
            });
            entry.semantic_rank.get_or_insert(rank + 1);
            if entry.from_semantic_entity.is_none() {
                entry.from_semantic_entity = entity_id;
            }
        }

        // --- RRF fusion ---
        let filename_query = is_filename_query(&request.query);
        let mut scored = Vec::with_capacity(ranked.len());
        for (_, entry) in ranked {
            let mut score = 0.0f32;
            if let Some(r) = entry.semantic_rank {
                score += 1.0 / (k_semantic + r as f32);
            }
            if let Some(r) = entry.lexical_rank {
                score += 1.0 / (k_lexical + r as f32);
            }

            let has_semantic = entry.semantic_rank.is_some();
            let result = self
                .enrich(&entry.file_path, entry.from_semantic_entity.as_deref(), entry.lexical_hit.as_ref())
                .await?;

            if filename_query && entry.file_path.contains(&request.query) {
                score *= 1.5;
            }
            if has_semantic {
                score *= 1.1;
            }
            score *= 1.0 + 0.1 * ((1 + result.popularity) as f32).log2();

            scored.push((score, result));
        }

        let max_score = scored.iter().map(|(s, _)| *s).fold(0.0f32, f32::max);
        if max_score > 0.0 {
            for (score, _) in scored.iter_mut() {
                *score /= max_score;
            }
        }
        scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let total = scored.len();
        let results: Vec<HybridResult> = scored
            .into_iter()
            .take(request.limit)
            .map(|(score, mut r)| {
                r.score = score;
                r
            })
            .collect();

        let synthesis = if config.enable_synthesis && is_question(&request.query) {
            self.synthesize(&request.query, &results).await
        } else {
            None
        };

        Ok(SearchResponse {
            total,
            results,
            latency_ms: start.elapsed().as_millis() as u64,
            sources,
            intent: Some(format!("{intent:?}").to_lowercase()),
            synthesis,
        })
    }

    async fn resolve_business_scope(&self, feature_context: &str) -> Result<std::collections::HashSet<String>> {
        let mut params = StoreParams::new();
        params.insert("pattern".to_string(), serde_json::json!(format!("%{feature_context}%")));
        let rows = self
            .store
            .query(
                "SELECT e.file_path AS file_path FROM entities e \
                 JOIN justifications j ON e.id = j.entity_id \
                 WHERE j.business_value LIKE :pattern",
                params,
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get("file_path").and_then(|v| v.as_str()).map(String::from))
            .collect())
    }

    async fn resolve_entity_file(&self, entity_id: &str) -> Result<Option<(String, Option<String>)>> {
        let mut params = StoreParams::new();
        params.insert("id".to_string(), serde_json::json!(entity_id));
        let rows = self
            .store
            .query("SELECT file_path, name FROM entities WHERE id = :id", params)
            .await?;
        Ok(rows.into_iter().next().and_then(|row| {
            let file_path = row.get("file_path").and_then(|v| v.as_str())?.to_string();
            let name = row.get("name").and_then(|v| v.as_str()).map(String::from);
            Some((file_path, name))
        }))
    }

    async fn expand_query(&self, query: &str) -> Vec<String> {
        let Some(llm) = &self.llm else { return Vec::new() };
        let prompt = format!(
            "Give exactly 3 short search synonyms for the code search query \"{query}\", one per line, no numbering."
        );
        match llm.infer(&prompt, LlmInferOptions { max_tokens: Some(64), temperature: Some(0.2) }).await {
            Ok(result) => result.text.lines().map(str::trim).filter(|l| !l.is_empty()).take(3).map(String::from).collect(),
            Err(e) => {
                tracing::warn!("hybrid search: query expansion failed: {e}");
                Vec::new()
            }
        }
    }

    async fn enrich(
        &self,
        file_path: &str,
        entity_id: Option<&str>,
        lexical_hit: Option<&SearchHit>,
    ) -> Result<HybridResult> {
        let mut params = StoreParams::new();
        params.insert("file_path".to_string(), serde_json::json!(file_path));

        let entity_row = if let Some(id) = entity_id {
            let mut p = StoreParams::new();
            p.insert("id".to_string(), serde_json::json!(id));
            self.store
                .query("SELECT id, name, signature FROM entities WHERE id = :id", p)
                .await?
                .into_iter()
                .next()
        } else {
            self.store
                .query(
                    "SELECT id, name, signature FROM entities WHERE file_path = :file_path AND kind != 'file' LIMIT 1",
                    params.clone(),
                )
                .await?
                .into_iter()
                .next()
        };

        let resolved_id = entity_row.as_ref().and_then(|r| r.get("id")).and_then(|v| v.as_str()).map(String::from);
        let name = entity_row.as_ref().and_then(|r| r.get("name")).and_then(|v| v.as_str()).map(String::from);
        let signature = entity_row.as_ref().and_then(|r| r.get("signature")).and_then(|v| v.as_str()).map(String::from);

        let (justification, business_value) = match &resolved_id {
            Some(id) => self.fetch_justification(id).await?,
            None => (None, None),
        };

        let (popularity, top_callers) = match &resolved_id {
            Some(id) => self.fetch_callers(id).await?,
            None => (0, Vec::new()),
        };

        let patterns = match &resolved_id {
            Some(id) => self.fetch_patterns(id, name.as_deref().unwrap_or_default()).await?,
            None => Vec::new(),
        };

        let snippet = lexical_hit
            .and_then(|hit| hit.line.map(|_| hit.content.clone()))
            .or(signature);

        Ok(HybridResult {
            file_path: file_path.to_string(),
            entity_id: resolved_id,
            name,
            score: 0.0,
            snippet,
            justification,
            business_value,
            patterns,
            popularity,
            top_callers,
            from_semantic: entity_id.is_some(),
        })
    }

    async fn fetch_justification(&self, entity_id: &str) -> Result<(Option<String>, Option<String>)> {
        let mut params = StoreParams::new();
        params.insert("id".to_string(), serde_json::json!(entity_id));
        let row = self
            .store
            .query("SELECT purpose, business_value FROM justifications WHERE entity_id = :id", params)
            .await?
            .into_iter()
            .next();
        Ok(match row {
            Some(r) => (
                r.get("purpose").and_then(|v| v.as_str()).map(String::from),
                r.get("business_value").and_then(|v| v.as_str()).map(String::from),
            ),
            None => (None, None),
        })
    }

    async fn fetch_callers(&self, entity_id: &str) -> Result<(u64, Vec<String>)> {
        let mut params = StoreParams::new();
        params.insert("id".to_string(), serde_json::json!(entity_id));
        let rows = self
            .store
            .query(
                "SELECT e.name AS name FROM edges ed JOIN entities e ON e.id = ed.from_id \
                 WHERE ed.to_id = :id AND ed.kind = 'CALLS'",
                params,
            )
            .await?;
        let popularity = rows.len() as u64;
        let top_callers = rows
            .into_iter()
            .filter_map(|row| row.get("name").and_then(|v| v.as_str()).map(String::from))
            .take(3)
            .collect();
        Ok((popularity, top_callers))
    }

    async fn fetch_patterns(&self, entity_id: &str, entity_name: &str) -> Result<Vec<String>> {
        let mut params = StoreParams::new();
        params.insert("id".to_string(), serde_json::json!(entity_id));
        let rows = self
            .store
            .query(
                "SELECT e.name AS name FROM edges ed JOIN entities e ON e.id = ed.to_id \
                 WHERE ed.from_id = :id AND ed.kind = 'HAS_METHOD'",
                params,
            )
            .await?;
        let method_names: Vec<String> =
            rows.into_iter().filter_map(|row| row.get("name").and_then(|v| v.as_str()).map(String::from)).collect();
        Ok(detect_patterns(entity_name, &method_names).into_iter().map(|p| p.as_str().to_string()).collect())
    }

    async fn synthesize(&self, query: &str, results: &[HybridResult]) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let top: Vec<&HybridResult> = results.iter().take(5).collect();
        if top.is_empty() {
            return None;
        }

        let mut prompt = format!("Answer the question using only the numbered sources below. Cite sources as [n].\n\nQuestion: {query}\n\nSources:\n");
        for (i, r) in top.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] {} — {}\n    business value: {}\n    confidence patterns: {:?}\n    snippet: {}\n",
                i + 1,
                r.file_path,
                r.justification.clone().unwrap_or_else(|| "no justification recorded".to_string()),
                r.business_value.clone().unwrap_or_else(|| "unknown".to_string()),
                r.patterns,
                r.snippet.clone().unwrap_or_default(),
            ));
        }

        match llm.infer(&prompt, LlmInferOptions { max_tokens: Some(512), temperature: Some(0.1) }).await {
            Ok(result) => Some(result.text),
            Err(e) => {
                tracing::warn!("hybrid search: synthesis failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lexical::{FileToIndex, IndexingMode};
    use codegraph_storage::SqliteStore;
    use tempfile::TempDir;

    async fn open_store() -> Arc<dyn Store> {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        store.initialize().await.expect("initialize schema");
        Arc::new(store)
    }

    #[test]
    fn classifies_intent_families() {
        assert_eq!(classify_intent("who calls fetch_user"), QueryIntent::Usage);
        assert_eq!(classify_intent("where is UserRepo defined"), QueryIntent::Definition);
        assert_eq!(classify_intent("how does caching work here"), QueryIntent::Conceptual);
        assert_eq!(classify_intent("fetch_user"), QueryIntent::Keyword);
    }

    #[test]
    fn rrf_constants_match_spec_table() {
        assert_eq!(QueryIntent::Definition.rrf_constants(), (40.0, 80.0));
        assert_eq!(QueryIntent::Usage.rrf_constants(), (80.0, 40.0));
        assert_eq!(QueryIntent::Conceptual.rrf_constants(), (50.0, 70.0));
        assert_eq!(QueryIntent::Keyword.rrf_constants(), (60.0, 60.0));
    }

    #[test]
    fn detects_question_shaped_queries() {
        assert!(is_question("What does this function do?"));
        assert!(is_question("how does the cache work"));
        assert!(!is_question("fetch_user"));
    }

    #[tokio::test]
    async fn search_request_builder() {
        let request = SearchRequest::new("async function")
            .with_filter(Filter::FilePath("src/".to_string()))
            .with_limit(10);

        assert_eq!(request.query, "async function");
        assert_eq!(request.limit, 10);
        assert_eq!(request.filters.len(), 1);
    }

    #[tokio::test]
    async fn lexical_only_search_returns_ranked_hits() {
        let temp_dir = TempDir::new().unwrap();
        let index_dir = temp_dir.path().join("index");

        let lexical_index = Arc::new(
            TantivyLexicalIndex::new(&index_dir, "test_repo".to_string(), IndexingMode::Balanced).unwrap(),
        );

        let files = vec![FileToIndex::new(
            "test_repo",
            "src/main.rs",
            "async fn fetch_data() {\n    println!(\"Fetching...\");\n}\n",
        )
        .unwrap()];
        lexical_index.index_files_batch(&files, false).unwrap();

        let store = open_store().await;
        let router = QueryRouter::new(lexical_index, store);
        let request = SearchRequest::new("fetch").with_limit(5);

        let response = router.search(&request).await.unwrap();

        assert!(!response.results.is_empty());
        assert!(response.sources.contains(&"lexical".to_string()));
        assert_eq!(response.results[0].file_path, "src/main.rs");
    }

    #[tokio::test]
    async fn empty_legs_produce_empty_response() {
        let temp_dir = TempDir::new().unwrap();
        let index_dir = temp_dir.path().join("index");
        let lexical_index = Arc::new(
            TantivyLexicalIndex::new(&index_dir, "test_repo".to_string(), IndexingMode::Balanced).unwrap(),
        );
        let store = open_store().await;
        let router = QueryRouter::new(lexical_index, store);

        let response = router.search(&SearchRequest::new("nonexistent_symbol_xyz")).await.unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.total, 0);
    }
}
