//! Data-flow analysis: definition/use graphs and regex-based taint detection,
//! feeding the semantic analyzer pass.

pub mod domain;
pub mod infrastructure;

pub use domain::dfg::{DFNode, DFNodeKind, DataFlowGraph};
pub use infrastructure::*;
