//! Extract-file use case: the production path from raw source to
//! extracted `Node`/`Edge`s, bridging the per-language `LanguagePlugin`
//! extractors (which only ever ran from each plugin's own test module)
//! to a single `(source, file_path) -> ExtractionResult` entry point.

use tree_sitter::Parser as TsParser;

use crate::features::parsing::ports::{ExtractionContext, ExtractionResult, LanguageId, LanguageRegistry};
use crate::shared::models::{CodegraphError, ErrorKind, Result};

fn tree_sitter_language(id: LanguageId) -> tree_sitter::Language {
    match id {
        LanguageId::Python => tree_sitter_python::language(),
        LanguageId::Java => tree_sitter_java::language(),
        LanguageId::TypeScript | LanguageId::JavaScript => tree_sitter_typescript::language_typescript(),
        LanguageId::Kotlin => tree_sitter_kotlin::language(),
        LanguageId::Rust => tree_sitter_rust::language(),
        LanguageId::Go => tree_sitter_go::language(),
    }
}

/// Extracts nodes and edges from one file's source, dispatching on its
/// extension to the matching plugin in `registry`. Files with no
/// registered plugin return an empty result with a recorded error
/// rather than failing the caller, matching the Parse Adapter's
/// "parse errors do not abort the file" policy.
pub fn extract_file(
    registry: &LanguageRegistry,
    repo_id: &str,
    file_path: &str,
    source: &str,
) -> Result<ExtractionResult> {
    let ext = std::path::Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let plugin = match registry.get_by_extension(ext) {
        Some(p) => p,
        None => {
            let mut result = ExtractionResult::new();
            result.add_error(format!("no language plugin registered for extension '{ext}'"));
            return Ok(result);
        }
    };

    let mut parser = TsParser::new();
    parser
        .set_language(&tree_sitter_language(plugin.language_id()))
        .map_err(|e| CodegraphError::new(ErrorKind::Parse, format!("grammar load failed: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| CodegraphError::parse("tree-sitter produced no tree").with_file(file_path))?;

    let mut ctx = ExtractionContext::new(source, file_path, repo_id, plugin.language_id());
    let mut result = plugin.extract(&mut ctx, &tree)?;
    if tree.root_node().has_error() {
        result.add_error("parse tree contains error nodes; partial extraction used");
    }
    Ok(result)
}
