//! Model value object naming a reasoning model

use serde::{Deserialize, Serialize};

/// Identifier of a reasoning model (Value Object)
///
/// Models are addressed by the provider's own identifier (`gpt-4o-mini`,
/// `llama3.1:70b`, ...). The domain never interprets the name beyond
/// rejecting blank values during config validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    /// Model used when nothing else is configured.
    pub const DEFAULT: &'static str = "gpt-4o-mini";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::new(Self::DEFAULT)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::new(s.trim()))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}
