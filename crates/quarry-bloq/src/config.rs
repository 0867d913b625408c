//! Conversion settings.

use serde::{Deserialize, Serialize};

use crate::error::BloqResult;

/// Order in which composite instances are visited during export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Topological order that runs qubit-freeing bloqs as early as possible
    /// and qubit-allocating bloqs as late as possible.
    #[default]
    Greedy,
    /// Topological order that follows insertion order where it can.
    Insertion,
}

/// Settings for converting between bloqs and circuits.
///
/// ```rust
/// use quarry_bloq::{InteropConfig, TraversalOrder};
///
/// let config = InteropConfig::from_json(r#"{"traversal": "insertion"}"#).unwrap();
/// assert_eq!(config.traversal, TraversalOrder::Insertion);
/// assert_eq!(config.default_register, "qubits");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteropConfig {
    /// Register name used when importing without an explicit signature.
    pub default_register: String,
    /// Export traversal order.
    pub traversal: TraversalOrder,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            default_register: "qubits".into(),
            traversal: TraversalOrder::Greedy,
        }
    }
}

impl InteropConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default import register name.
    #[must_use]
    pub fn with_default_register(mut self, name: impl Into<String>) -> Self {
        self.default_register = name.into();
        self
    }

    /// Set the export traversal order.
    #[must_use]
    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> BloqResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InteropConfig::default();
        assert_eq!(config.default_register, "qubits");
        assert_eq!(config.traversal, TraversalOrder::Greedy);
        assert_eq!(InteropConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn test_builders() {
        let config = InteropConfig::new()
            .with_default_register("q")
            .with_traversal(TraversalOrder::Insertion);
        assert_eq!(config.default_register, "q");
        assert_eq!(config.traversal, TraversalOrder::Insertion);
    }

    #[test]
    fn test_invalid_json() {
        assert!(InteropConfig::from_json(r#"{"traversal": "sideways"}"#).is_err());
    }
}
