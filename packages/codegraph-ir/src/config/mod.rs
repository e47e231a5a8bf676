//! Project configuration
//!
//! A single-tier YAML-backed config keyed by project root, covering the
//! fields persisted state needs: identity, language scope, file
//! inclusion/exclusion patterns, and LLM provider selection.

pub mod error;
pub mod project_config;

pub use error::{ConfigError, ConfigResult};
pub use project_config::{resolve_api_keys, ApiKeys, ModelProvider, ProjectConfig, CURRENT_VERSION};
