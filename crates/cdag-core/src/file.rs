//! Declarative DAG files
//!
//! ```toml
//! exposure = "podcast"
//! outcome = "exam"
//! relations = [
//!     "podcast ~ mood + humor + prepared",
//!     "exam ~ mood + prepared",
//! ]
//!
//! [labels]
//! podcast = "Listened to podcast"
//!
//! [coords]
//! podcast = [1.0, 2.0]
//!
//! [limits]
//! max_candidates = 16
//! ```
//!
//! The same shape is accepted as JSON.

use crate::config::AnalysisLimits;
use crate::construction::DagBuilder;
use crate::dag::CausalDag;
use crate::error::{FileError, GraphError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path as FsPath;
use tracing::debug;

/// On-disk DAG declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DagFile {
    /// Exposure node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,
    /// Outcome node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Latent nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unobserved: Vec<String>,
    /// Standalone nodes with no edges
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
    /// `effect ~ cause + cause` formulas
    #[serde(default)]
    pub relations: Vec<String>,
    /// Display labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Display coordinates
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub coords: BTreeMap<String, [f64; 2]>,
    /// Analysis limits
    #[serde(default)]
    pub limits: AnalysisLimits,
}

impl DagFile {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, FileError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse JSON text
    pub fn from_json_str(text: &str) -> Result<Self, FileError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from disk, choosing the format by extension
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "loading dag file");

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(FileError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Builder populated with every declaration in the file
    pub fn to_builder(&self) -> Result<DagBuilder, GraphError> {
        let mut builder = DagBuilder::with_limits(self.limits);
        for id in &self.nodes {
            builder.node(id)?;
        }
        for formula in &self.relations {
            builder.formula(formula)?;
        }
        if let Some(x) = &self.exposure {
            builder.exposure(x)?;
        }
        if let Some(y) = &self.outcome {
            builder.outcome(y)?;
        }
        for id in &self.unobserved {
            builder.unobserved(id);
        }
        for (id, label) in &self.labels {
            builder.label(id, label);
        }
        for (id, [x, y]) in &self.coords {
            builder.coords(id, *x, *y);
        }
        Ok(builder)
    }

    /// Build the graph
    pub fn build(&self) -> Result<CausalDag, GraphError> {
        self.to_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    const PODCAST: &str = r#"
exposure = "podcast"
outcome = "exam"
relations = [
    "podcast ~ mood + humor + prepared",
    "exam ~ mood + prepared",
]

[labels]
podcast = "Listened to podcast"

[coords]
mood = [0.0, 1.0]
"#;

    #[test]
    fn test_toml_round_into_dag() {
        let file = DagFile::from_toml_str(PODCAST).unwrap();
        let dag = file.build().unwrap();

        assert_eq!(dag.node_count(), 5);
        assert_eq!(dag.exposure(), Some("podcast"));
        assert_eq!(dag.node("mood").unwrap().coords, Some((0.0, 1.0)));
        assert_eq!(
            dag.node("podcast").unwrap().display_name(),
            "Listened to podcast"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "exposure": "x",
            "outcome": "y",
            "unobserved": ["u"],
            "nodes": ["w"],
            "relations": ["x ~ u", "y ~ u + x"]
        }"#;
        let dag = DagFile::from_json_str(json).unwrap().build().unwrap();
        assert_eq!(dag.node("u").unwrap().role, Role::Unobserved);
        assert!(dag.contains("w"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            DagFile::from_toml_str("exposur = \"x\""),
            Err(FileError::Toml(_))
        ));
    }

    #[test]
    fn test_limits_table() {
        let file = DagFile::from_toml_str("relations = [\"y ~ x\"]\n[limits]\nmax_paths = 5\n").unwrap();
        assert_eq!(file.limits.max_paths, 5);
        assert_eq!(file.build().unwrap().limits().max_paths, 5);
    }
}
