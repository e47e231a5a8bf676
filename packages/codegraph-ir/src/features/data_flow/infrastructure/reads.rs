/*
 * READS Analysis - Variable usage tracking
 *
 * Extracts variable reads (usage) from expressions.
 *
 * PRODUCTION GRADE:
 * - Track all variable references
 * - Distinguish reads from writes
 * - No fake data
 */

use crate::shared::models::Span;
use tree_sitter::Node;

/// Variable read (usage)
#[derive(Debug, Clone)]
pub struct VariableRead {
    pub name: String,
    pub span: Span,
}

/// Extract variable reads from block
///
/// Finds all identifier usages (not assignments).
pub fn extract_reads_in_block(block_node: &Node, source: &str) -> Vec<VariableRead> {
    let mut reads = Vec::new();
    traverse_for_reads(block_node, source, &mut reads);
    reads
}

fn traverse_for_reads(node: &Node, source: &str, reads: &mut Vec<VariableRead>) {
    // Skip assignment left sides
    if node.kind() == "assignment" {
        // Only traverse right side
        if let Some(right) = node.child(2) {
            // After '='
            traverse_for_reads(&right, source, reads);
        }
        return;
    }

    // Identifier = potential read
    if node.kind() == "identifier" {
        let name = get_node_text(node, source);
        let span = node_to_span(node);

        reads.push(VariableRead { name, span });
    }

    // Recurse
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            traverse_for_reads(&child, source, reads);
        }
    }
}

fn get_node_text(node: &Node, source: &str) -> String {
    source[node.start_byte()..node.end_byte()].to_string()
}

fn node_to_span(node: &Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        start.row as u32 + 1,
        start.column as u32,
        end.row as u32 + 1,
        end.column as u32,
    )
}
