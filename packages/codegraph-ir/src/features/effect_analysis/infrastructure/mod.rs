pub mod effect_analyzer;
/// Effect Analysis Infrastructure
pub mod local_analyzer;
pub mod patterns;

pub use effect_analyzer::*;
pub use local_analyzer::*;
