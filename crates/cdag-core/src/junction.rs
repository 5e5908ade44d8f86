//! Three-node junctions: fork, chain, collider

use crate::dag::CausalDag;
use crate::error::AnalysisError;
use crate::paths::Step;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a middle node `q` connects its two path neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Junction {
    /// `x <- q -> y`
    Fork,
    /// `x -> q -> y` or `x <- q <- y`
    Chain,
    /// `x -> q <- y`
    Collider,
}

impl Junction {
    /// Junction formed by the step into `q` and the step out of `q`
    pub fn from_steps(into: Step, out_of: Step) -> Self {
        match (into, out_of) {
            (Step::Forward, Step::Backward) => Junction::Collider,
            (Step::Backward, Step::Forward) => Junction::Fork,
            _ => Junction::Chain,
        }
    }

    /// Whether association flows through the junction
    ///
    /// `conditioned`: the middle node is in the conditioning set.
    /// `descendant_conditioned`: some descendant of it is.
    pub fn transmits(self, conditioned: bool, descendant_conditioned: bool) -> bool {
        match self {
            Junction::Fork | Junction::Chain => !conditioned,
            Junction::Collider => conditioned || descendant_conditioned,
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Junction::Fork => "fork",
            Junction::Chain => "chain",
            Junction::Collider => "collider",
        };
        f.write_str(s)
    }
}

/// Classify `q` between `x` and `y` from local edge direction
pub fn classify(dag: &CausalDag, x: &str, q: &str, y: &str) -> Result<Junction, AnalysisError> {
    let into = step_between(dag, x, q)?;
    let out_of = step_between(dag, q, y)?;
    match (into, out_of) {
        (Some(a), Some(b)) => Ok(Junction::from_steps(a, b)),
        _ => Err(AnalysisError::NotAdjacent {
            left: x.to_string(),
            middle: q.to_string(),
            right: y.to_string(),
        }),
    }
}

fn step_between(dag: &CausalDag, from: &str, to: &str) -> Result<Option<Step>, AnalysisError> {
    if dag.has_edge(from, to)? {
        Ok(Some(Step::Forward))
    } else if dag.has_edge(to, from)? {
        Ok(Some(Step::Backward))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::DagBuilder;

    fn dag(formulas: &str) -> CausalDag {
        let mut builder = DagBuilder::new();
        builder.formulas(formulas).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_classifies_fork() {
        let g = dag("x ~ q; y ~ q");
        assert_eq!(classify(&g, "x", "q", "y").unwrap(), Junction::Fork);
    }

    #[test]
    fn test_classifies_chain_both_ways() {
        let g = dag("q ~ x; y ~ q");
        assert_eq!(classify(&g, "x", "q", "y").unwrap(), Junction::Chain);
        assert_eq!(classify(&g, "y", "q", "x").unwrap(), Junction::Chain);
    }

    #[test]
    fn test_classifies_collider() {
        let g = dag("q ~ x + y");
        assert_eq!(classify(&g, "x", "q", "y").unwrap(), Junction::Collider);
    }

    #[test]
    fn test_not_adjacent() {
        let g = dag("q ~ x; z ~ y");
        assert!(matches!(
            classify(&g, "x", "q", "y"),
            Err(AnalysisError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn test_transmission_rules() {
        assert!(Junction::Fork.transmits(false, false));
        assert!(!Junction::Fork.transmits(true, false));
        assert!(Junction::Chain.transmits(false, true));
        assert!(!Junction::Chain.transmits(true, true));
        assert!(!Junction::Collider.transmits(false, false));
        assert!(Junction::Collider.transmits(true, false));
        assert!(Junction::Collider.transmits(false, true));
    }
}
