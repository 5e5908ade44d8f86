//! Node-level data model

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a node plays in an analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Treatment whose effect is estimated
    Exposure,
    /// Variable the effect is estimated on
    Outcome,
    /// Ordinary measured variable
    #[default]
    Covariate,
    /// Latent variable; never part of an adjustment set
    Unobserved,
}

impl Role {
    /// Lowercase name used in messages and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Exposure => "exposure",
            Role::Outcome => "outcome",
            Role::Covariate => "covariate",
            Role::Unobserved => "unobserved",
        }
    }

    /// Whether conditioning on the node is possible at all
    pub fn is_observed(self) -> bool {
        !matches!(self, Role::Unobserved)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable in a causal DAG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier used in relations and queries
    pub id: String,
    /// Display label for an external renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display coordinates for an external renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<(f64, f64)>,
    /// Analysis role
    #[serde(default)]
    pub role: Role,
}

impl Node {
    /// Create an untagged node
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            coords: None,
            role: Role::Covariate,
        }
    }

    /// Label if set, identifier otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Check an identifier against `[A-Za-z0-9_.]+`
pub fn validate_identifier(id: &str) -> Result<(), GraphError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidIdentifier(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(validate_identifier("mood").is_ok());
        assert!(validate_identifier("x_1.lag").is_ok());
        assert!(matches!(
            validate_identifier(""),
            Err(GraphError::InvalidIdentifier(_))
        ));
        assert!(validate_identifier("two words").is_err());
        assert!(validate_identifier("a~b").is_err());
    }

    #[test]
    fn test_display_name_prefers_label() {
        let mut node = Node::new("podcast");
        assert_eq!(node.display_name(), "podcast");
        node.label = Some("Listened to podcast".into());
        assert_eq!(node.display_name(), "Listened to podcast");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Unobserved).unwrap();
        assert_eq!(json, "\"unobserved\"");
        assert!(!Role::Unobserved.is_observed());
        assert!(Role::Covariate.is_observed());
    }
}
