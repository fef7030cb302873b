//! Document configuration: which attribute names carry the cross-cutting
//! behaviors every node gets.
//!
//! The config deserializes from JSON with every field optional, so a host
//! can ship a partial override next to its markup files.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Document`](crate::document::Document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Namespace prefix that marks bind attributes (`bind:text="name"`).
    pub bind_namespace: String,
    /// Attribute that registers a widget in the ref table.
    pub id_attr: String,
    /// Attribute (plain and bound) that hides a widget.
    pub visibility_attr: String,
    /// Bind attribute that binds a node's text content.
    pub content_attr: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            bind_namespace: "bind".into(),
            id_attr: "id".into(),
            visibility_attr: "hidden".into(),
            content_attr: "content".into(),
        }
    }
}

impl DocumentConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind namespace (builder).
    pub fn with_bind_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.bind_namespace = namespace.into();
        self
    }

    /// Set the id attribute name (builder).
    pub fn with_id_attr(mut self, attr: impl Into<String>) -> Self {
        self.id_attr = attr.into();
        self
    }

    /// Set the visibility attribute name (builder).
    pub fn with_visibility_attr(mut self, attr: impl Into<String>) -> Self {
        self.visibility_attr = attr.into();
        self
    }

    /// Set the content bind attribute name (builder).
    pub fn with_content_attr(mut self, attr: impl Into<String>) -> Self {
        self.content_attr = attr.into();
        self
    }

    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DocumentConfig::new();
        assert_eq!(config.bind_namespace, "bind");
        assert_eq!(config.id_attr, "id");
        assert_eq!(config.visibility_attr, "hidden");
        assert_eq!(config.content_attr, "content");
    }

    #[test]
    fn builder_chain() {
        let config = DocumentConfig::new()
            .with_bind_namespace("x")
            .with_id_attr("ref")
            .with_visibility_attr("collapsed")
            .with_content_attr("text");
        assert_eq!(config.bind_namespace, "x");
        assert_eq!(config.id_attr, "ref");
        assert_eq!(config.visibility_attr, "collapsed");
        assert_eq!(config.content_attr, "text");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DocumentConfig::from_json(r#"{"bind_namespace": "x"}"#).unwrap();
        assert_eq!(config, DocumentConfig::new().with_bind_namespace("x"));
    }

    #[test]
    fn json_round_trip() {
        let config = DocumentConfig::new().with_id_attr("ref");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(DocumentConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(DocumentConfig::from_json("{").is_err());
    }
}
