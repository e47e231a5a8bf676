//! Design pattern detection: cheap, regex-driven classification of a
//! class by its own name and the names of its methods.

pub mod domain;
pub mod infrastructure;

pub use domain::DesignPattern;
pub use infrastructure::detect_patterns;
