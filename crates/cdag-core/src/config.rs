//! Analysis limits
//!
//! Path enumeration and adjustment-set search are exponential in the worst
//! case. These limits keep a mis-declared graph from running away.

use serde::{Deserialize, Serialize};

/// Bounds applied during construction and analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// Maximum nodes a graph may declare
    pub max_nodes: usize,
    /// Maximum adjustment candidates before subset search is refused
    pub max_candidates: usize,
    /// Maximum paths collected between two nodes
    pub max_paths: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_nodes: 64,
            max_candidates: 24,
            max_paths: 10_000,
        }
    }
}

impl AnalysisLimits {
    /// Limits with every bound lifted
    pub fn unbounded() -> Self {
        Self {
            max_nodes: usize::MAX,
            max_candidates: usize::MAX,
            max_paths: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let limits: AnalysisLimits = toml::from_str("max_candidates = 8").unwrap();
        assert_eq!(limits.max_candidates, 8);
        assert_eq!(limits.max_nodes, AnalysisLimits::default().max_nodes);
        assert_eq!(limits.max_paths, 10_000);
    }
}
