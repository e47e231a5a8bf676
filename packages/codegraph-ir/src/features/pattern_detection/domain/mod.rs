//! Design pattern vocabulary detected from naming conventions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignPattern {
    Singleton,
    Factory,
    Observer,
}

impl DesignPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignPattern::Singleton => "singleton",
            DesignPattern::Factory => "factory",
            DesignPattern::Observer => "observer",
        }
    }
}
