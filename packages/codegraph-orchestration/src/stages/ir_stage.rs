use crate::dependency_graph::{compute_affected_files, ReverseDependencyIndex};
use crate::error::Result;
use crate::job::StageId;
use crate::pipeline::{StageContext, StageHandler, StageInput, StageMetrics, StageOutput};
use async_trait::async_trait;
use codegraph_ir::features::graph_builder::write_file_extraction;
use codegraph_ir::features::parsing::{create_full_registry, extract_file, LanguageRegistry};
use codegraph_ir::features::scanning::{hash_content, FileInfo};
use codegraph_ir::shared::models::EdgeKind;
use codegraph_storage::Store;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// One file's import edge, kept across indexing runs so the next
/// incremental run can rebuild its reverse dependency index without
/// re-parsing unaffected files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportInfo {
    pub source_file: String,
    pub target_file: String,
}

/// Per-file extraction summary, checkpointed as this stage's cache
/// output so the next incremental run can diff against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRResult {
    pub file_path: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub errors: Vec<String>,
    pub imports: Vec<ImportInfo>,
}

/// Extraction + Graph Writer stage: parses each file with the
/// tree-sitter plugin registry, then persists its entities and edges
/// with delete-then-insert semantics.
pub struct IRStage {
    repo_id: String,
    store: Arc<dyn Store>,
    registry: LanguageRegistry,
}

impl IRStage {
    pub fn new(repo_id: String, store: Arc<dyn Store>) -> Self {
        Self {
            repo_id,
            store,
            registry: create_full_registry(),
        }
    }
}

#[async_trait]
impl StageHandler for IRStage {
    fn stage_id(&self) -> StageId {
        StageId::Extracting
    }

    async fn execute(&self, input: StageInput, ctx: &mut StageContext) -> Result<StageOutput> {
        let start = Instant::now();

        let (files_to_process, previous_results, reverse_deps): (
            Vec<PathBuf>,
            Option<Vec<IRResult>>,
            Arc<ReverseDependencyIndex>,
        ) = if input.incremental {
            info!(
                "IRStage: incremental mode, {} changed files of {} total",
                input.changed_files.as_ref().map(|c| c.len()).unwrap_or(0),
                input.files.len()
            );

            let reverse_deps = Arc::new(ReverseDependencyIndex::new());
            let prev_cache_key = ctx
                .previous_snapshot_id
                .as_ref()
                .map(|snap| format!("ir:{}:{}", ctx.repo_id, snap));

            let prev_results = match prev_cache_key {
                Some(key) => match ctx.checkpoint_mgr.load_checkpoint(&key).await {
                    Ok(Some(data)) => match bincode::deserialize::<Vec<IRResult>>(&data) {
                        Ok(results) => {
                            for result in &results {
                                let source_file = PathBuf::from(&result.file_path);
                                for import in &result.imports {
                                    reverse_deps
                                        .add_wildcard_import(source_file.clone(), PathBuf::from(&import.target_file));
                                }
                            }
                            Some(results)
                        }
                        Err(e) => {
                            warn!("IRStage: failed to deserialize previous IR: {e}");
                            None
                        }
                    },
                    _ => {
                        warn!("IRStage: no previous IR checkpoint found, falling back to full rebuild");
                        None
                    }
                },
                None => None,
            };

            let changed_files = input.changed_files.clone().unwrap_or_default();
            let affected = compute_affected_files(&changed_files, &reverse_deps);
            let affected_files: Vec<PathBuf> =
                input.files.iter().filter(|f| affected.contains(*f)).cloned().collect();

            info!(
                "IRStage: {} changed files affect {} files",
                changed_files.len(),
                affected_files.len()
            );

            (affected_files, prev_results, reverse_deps)
        } else {
            info!(
                "IRStage: full mode, {} files with {} workers",
                input.files.len(),
                input.config.parallel_workers
            );
            (input.files.clone(), None, Arc::new(ReverseDependencyIndex::new()))
        };

        // Extraction is CPU-bound and safe to fan out with Rayon; the
        // Graph Writer's store calls are async and run afterward.
        let extracted: Vec<(PathBuf, String, codegraph_ir::features::parsing::ExtractionResult)> = files_to_process
            .par_iter()
            .map(|file_path| {
                let content = std::fs::read_to_string(file_path).unwrap_or_default();
                let result = extract_file(&self.registry, &self.repo_id, &file_path.to_string_lossy(), &content)
                    .unwrap_or_else(|e| {
                        let mut r = codegraph_ir::features::parsing::ExtractionResult::new();
                        r.add_error(e.to_string());
                        r
                    });
                (file_path.clone(), content, result)
            })
            .collect();

        let mut new_results = Vec::with_capacity(extracted.len());
        let mut nodes_created = 0;
        let mut all_errors = Vec::new();
        let mut files_processed = 0;

        for (file_path, content, extraction) in extracted {
            let relative_path = file_path.to_string_lossy().to_string();
            let imports: Vec<ImportInfo> = extraction
                .edges
                .iter()
                .filter(|e| e.kind == EdgeKind::Imports)
                .map(|e| ImportInfo {
                    source_file: relative_path.clone(),
                    target_file: e.target_id.clone(),
                })
                .collect();

            if input.incremental {
                for import in &imports {
                    reverse_deps.add_wildcard_import(file_path.clone(), PathBuf::from(&import.target_file));
                }
            }

            let file_info = FileInfo::new(
                relative_path.clone(),
                relative_path.clone(),
                hash_content(content.as_bytes()),
                content.len() as u64,
            );

            if let Err(e) = write_file_extraction(self.store.as_ref(), &file_info, &extraction).await {
                warn!("IRStage: failed to write {}: {e}", relative_path);
                all_errors.push(format!("{relative_path}: {e}"));
            } else {
                files_processed += 1;
            }

            nodes_created += extraction.nodes.len();
            all_errors.extend(extraction.errors.clone());

            new_results.push(IRResult {
                file_path: relative_path,
                node_count: extraction.nodes.len(),
                edge_count: extraction.edges.len(),
                errors: extraction.errors,
                imports,
            });
        }

        let final_results = match (input.incremental, previous_results) {
            (true, Some(prev)) => {
                let reprocessed: HashSet<String> =
                    files_to_process.iter().map(|p| p.to_string_lossy().to_string()).collect();
                let mut merged: Vec<IRResult> =
                    prev.into_iter().filter(|r| !reprocessed.contains(&r.file_path)).collect();
                merged.extend(new_results);
                merged
            }
            _ => new_results,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "IRStage: {} files written, {} nodes, {} errors in {}ms",
            files_processed,
            nodes_created,
            all_errors.len(),
            duration_ms
        );

        let cache_data = bincode::serialize(&final_results)?;

        Ok(StageOutput {
            cache_data,
            metrics: StageMetrics {
                files_processed,
                nodes_created,
                chunks_created: 0,
                duration_ms,
                errors: all_errors,
            },
        })
    }

    fn output_cache_key(&self, ctx: &StageContext) -> String {
        ctx.cache_keys.ir_key()
    }
}
