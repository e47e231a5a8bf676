//! Ghost node resolution: a lightweight stand-in for symbols that live
//! outside the project (third-party packages, vendored dependencies).
//! Created on first reference and cached so subsequent references
//! resolve to the same node.

use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::types::ResolvedImport;
use crate::shared::models::{Edge, EdgeKind, NodeKind};

const DEFAULT_CACHE_SIZE: usize = 4096;

const VENDOR_DIR_NAMES: &[&str] = &[
    "node_modules",
    "vendor",
    "site-packages",
    "dist-packages",
    ".venv",
    "venv",
    "target/debug/deps",
    "target/release/deps",
    "Pods",
    "bower_components",
];

/// Lightweight placeholder for an external (non-source) symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostNode {
    pub id: String,
    pub name: String,
    pub package_name: String,
    pub entity_type: NodeKind,
    pub signature: Option<String>,
    pub is_external: bool,
}

impl GhostNode {
    fn new(package_name: String, symbol: String, entity_type: NodeKind) -> Self {
        Self {
            id: format!("ghost:{package_name}:{symbol}"),
            name: symbol,
            package_name,
            entity_type,
            signature: None,
            is_external: true,
        }
    }
}

/// Resolves external symbol references to cached `GhostNode`s.
///
/// Grounded on the `dashmap`-guarded registry pattern used throughout
/// this module and the `lru` dependency already used for other caches.
pub struct GhostResolver {
    cache: Mutex<LruCache<String, Arc<GhostNode>>>,
}

impl GhostResolver {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = std::num::NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Resolves `reference` (e.g. `lodash.map`, `numpy.array`) against
    /// `source_path`, returning the cached ghost node or creating one.
    pub fn resolve(&self, reference: &str, entity_type: NodeKind) -> Arc<GhostNode> {
        let package_name = extract_package_name(reference);
        let symbol = reference
            .split(['.', ':', '/'])
            .next_back()
            .unwrap_or(reference)
            .to_string();
        let id = format!("ghost:{package_name}:{symbol}");

        let mut cache = self.cache.lock();
        if let Some(existing) = cache.get(&id) {
            return existing.clone();
        }
        let ghost = Arc::new(GhostNode::new(package_name, symbol, entity_type));
        cache.put(id, ghost.clone());
        ghost
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GhostResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the package name a reference belongs to: the full scoped
/// name for `@org/pkg`-style references, otherwise the first path
/// segment (`numpy.array` -> `numpy`, `github.com/foo/bar.Baz` ->
/// `github.com`).
pub fn extract_package_name(reference: &str) -> String {
    if let Some(rest) = reference.strip_prefix('@') {
        let mut parts = rest.splitn(2, '/');
        let scope = parts.next().unwrap_or_default();
        let pkg = parts.next().and_then(|s| s.split(['/', '.']).next());
        return match pkg {
            Some(pkg) if !pkg.is_empty() => format!("@{scope}/{pkg}"),
            _ => format!("@{scope}"),
        };
    }

    reference
        .split(['.', ':', '/'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(reference)
        .to_string()
}

/// Whether `path` lives inside a vendor/dependency directory and
/// should be treated as external rather than part of the project.
pub fn is_vendor_path(path: &str) -> bool {
    let normalized = path.replace('\\', "/");
    normalized
        .split('/')
        .any(|segment| VENDOR_DIR_NAMES.contains(&segment))
}

/// Turns every unresolved (external) import into a ghost node plus a
/// `ReferencesExternal` edge from the importing node. Resolved imports
/// are skipped; the call-graph linker already covers those with a
/// `Calls`/`Imports` edge to a real node.
pub fn link_external_references(
    resolver: &GhostResolver,
    source_node_id: &str,
    resolved: &ResolvedImport,
) -> Option<(Arc<GhostNode>, Edge)> {
    if !resolved.is_external {
        return None;
    }
    let ghost = resolver.resolve(&resolved.import_fqn, NodeKind::ExternalModule);
    let edge = Edge::new(source_node_id.to_string(), ghost.id.clone(), EdgeKind::ReferencesExternal);
    Some((ghost, edge))
}
