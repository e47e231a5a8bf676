//! Project configuration - persisted per project root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

pub const CURRENT_VERSION: u32 = 1;

/// Which LLM backend serves `justify` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Local,
    Openai,
    Anthropic,
    Google,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Local => "local",
            ModelProvider::Openai => "openai",
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Google => "google",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ModelProvider::Local)
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ModelProvider::Local),
            "openai" => Ok(ModelProvider::Openai),
            "anthropic" => Ok(ModelProvider::Anthropic),
            "google" => Ok(ModelProvider::Google),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// API keys for cloud model providers, keyed by provider name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,
}

impl ApiKeys {
    pub fn for_provider(&self, provider: ModelProvider) -> Option<&str> {
        match provider {
            ModelProvider::Local => None,
            ModelProvider::Openai => self.openai.as_deref(),
            ModelProvider::Anthropic => self.anthropic.as_deref(),
            ModelProvider::Google => self.google.as_deref(),
        }
    }

    /// Fill in any missing key from the matching `<PROVIDER>_API_KEY`
    /// environment variable, without overwriting an explicit config value.
    pub fn merge_env(&mut self) {
        if self.openai.is_none() {
            self.openai = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.anthropic.is_none() {
            self.anthropic = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if self.google.is_none() {
            self.google = std::env::var("GOOGLE_API_KEY").ok();
        }
    }
}

/// Persisted per-project configuration (spec §6 "Persisted state").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub version: u32,
    pub root: PathBuf,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub languages: Vec<String>,
    pub source_patterns: Vec<String>,
    pub ignore_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    pub model_provider: ModelProvider,
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub skip_llm: bool,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    90
}

impl ProjectConfig {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            version: CURRENT_VERSION,
            root: root.into(),
            name: name.into(),
            framework: None,
            languages: Vec::new(),
            source_patterns: vec!["**/*".to_string()],
            ignore_patterns: default_ignore_patterns(),
            llm_model: None,
            model_provider: ModelProvider::Local,
            api_keys: ApiKeys::default(),
            skip_llm: false,
            retention_days: default_retention_days(),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.version != CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: vec![CURRENT_VERSION],
            });
        }
        if !self.skip_llm
            && self.model_provider.requires_api_key()
            && self.api_keys.for_provider(self.model_provider).is_none()
        {
            return Err(ConfigError::MissingApiKey {
                provider: self.model_provider.as_str().to_string(),
            });
        }
        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".codegraph").join("config.yaml")
    }

    pub fn load(root: &Path) -> ConfigResult<Self> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Err(ConfigError::NotFound {
                root: root.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(&path)?;
        let mut config: ProjectConfig = serde_yaml::from_str(&contents)?;
        config.api_keys.merge_env();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> ConfigResult<()> {
        let path = Self::config_path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(&path, yaml)?;
        Ok(())
    }
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/.codegraph/**".to_string(),
    ]
}

/// Resolved API keys merged from config and environment, addressable by
/// provider string for the LLM router's provider lookup.
pub fn resolve_api_keys(config: &ProjectConfig) -> HashMap<String, String> {
    let mut keys = HashMap::new();
    if let Some(key) = &config.api_keys.openai {
        keys.insert("openai".to_string(), key.clone());
    }
    if let Some(key) = &config.api_keys.anthropic {
        keys.insert("anthropic".to_string(), key.clone());
    }
    if let Some(key) = &config.api_keys.google {
        keys.insert("google".to_string(), key.clone());
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_has_sane_defaults() {
        let config = ProjectConfig::new("/repo", "repo");
        assert_eq!(config.version, CURRENT_VERSION);
        assert_eq!(config.model_provider, ModelProvider::Local);
        assert_eq!(config.retention_days, 90);
        assert!(!config.skip_llm);
    }

    #[test]
    fn validate_requires_api_key_for_cloud_provider() {
        let mut config = ProjectConfig::new("/repo", "repo");
        config.model_provider = ModelProvider::Openai;
        assert!(config.validate().is_err());

        config.api_keys.openai = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn skip_llm_bypasses_api_key_requirement() {
        let mut config = ProjectConfig::new("/repo", "repo");
        config.model_provider = ModelProvider::Anthropic;
        config.skip_llm = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unsupported_version() {
        let mut config = ProjectConfig::new("/repo", "repo");
        config.version = 99;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ProjectConfig::new(dir.path(), "demo");
        config.languages.push("rust".to_string());
        config.save(dir.path()).unwrap();

        let loaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.languages, vec!["rust".to_string()]);
    }

    #[test]
    fn load_missing_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProjectConfig::load(dir.path()),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn model_provider_round_trips_through_str() {
        assert_eq!("openai".parse::<ModelProvider>().unwrap(), ModelProvider::Openai);
        assert!("azure".parse::<ModelProvider>().is_err());
    }
}
