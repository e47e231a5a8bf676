//! Graph Builder use cases: the in-memory `GraphDocument` assembly
//! path and the Graph Writer that persists one file's extraction
//! result to the store.

pub mod graph_usecase;
pub mod graph_writer;

pub use graph_usecase::{GraphBuilderUseCase, GraphBuilderUseCaseImpl};
pub use graph_writer::write_file_extraction;
