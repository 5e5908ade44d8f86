//! Adjustment sets
//!
//! A set Z is a valid adjustment set for the effect of X on Y when:
//! 1. Z contains no descendant of X,
//! 2. Z contains no unobserved node and neither endpoint,
//! 3. every non-causal path between X and Y is blocked given Z.
//!
//! Rule 1 keeps every causal path open and keeps Z off colliders that sit
//! downstream of X. Rule 3 rejects any set that opens a collider path.
//!
//! [`AdjustmentSetSolver::find_adjustment_sets`] returns all minimal valid
//! sets. Candidates are drawn from the ancestors of X and Y, where every
//! minimal set lives.

use crate::dag::CausalDag;
use crate::error::AnalysisError;
use crate::junction::Junction;
use crate::paths::{Path, PathFinder};
use crate::types::Role;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// A set of node identifiers to condition on
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AdjustmentSet(BTreeSet<String>);

impl AdjustmentSet {
    /// Number of nodes in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty (no adjustment needed)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` is in the set
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Members in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Underlying ordered set
    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for AdjustmentSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a AdjustmentSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AdjustmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(id)?;
        }
        f.write_str("}")
    }
}

/// Why a node should not be adjusted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Lies on a causal path; adjusting blocks part of the effect
    Mediator,
    /// Collider on an exposure-outcome path; adjusting opens the path
    Collider,
    /// Downstream of the exposure
    DescendantOfExposure,
    /// Cannot be measured
    Unobserved,
    /// The exposure or outcome itself
    Endpoint,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::Mediator => "mediator: do not adjust",
            WarningKind::Collider => "collider: do not adjust",
            WarningKind::DescendantOfExposure => "descendant of exposure: do not adjust",
            WarningKind::Unobserved => "unobserved: cannot adjust",
            WarningKind::Endpoint => "exposure or outcome",
        };
        f.write_str(s)
    }
}

/// "Do not adjust" flag on a node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AdjustmentWarning {
    /// Flagged node
    pub node: String,
    /// Reason
    pub kind: WarningKind,
}

/// Evaluation of a proposed adjustment set
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentCheck {
    /// Set that was evaluated
    pub set: AdjustmentSet,
    /// Whether it identifies the causal effect
    pub valid: bool,
    /// Non-causal paths still open given the set
    pub open_backdoor_paths: Vec<Path>,
    /// Causal paths the set blocks
    pub blocked_causal_paths: Vec<Path>,
    /// Flags for members of the set
    pub warnings: Vec<AdjustmentWarning>,
}

/// Computes and checks adjustment sets for one exposure/outcome pair
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentSetSolver<'g> {
    finder: PathFinder<'g>,
}

impl<'g> AdjustmentSetSolver<'g> {
    /// Solver for two named nodes
    pub fn new(dag: &'g CausalDag, exposure: &str, outcome: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            finder: PathFinder::new(dag, exposure, outcome)?,
        })
    }

    /// Solver for the graph's designated exposure and outcome
    pub fn for_designated(dag: &'g CausalDag) -> Result<Self, AnalysisError> {
        Ok(Self {
            finder: PathFinder::for_designated(dag)?,
        })
    }

    /// Underlying path finder
    pub fn finder(&self) -> &PathFinder<'g> {
        &self.finder
    }

    /// Every minimal valid adjustment set, sorted by size then lexically
    ///
    /// Returns a single empty set when no backdoor path is open.
    pub fn find_adjustment_sets(&self) -> Result<Vec<AdjustmentSet>, AnalysisError> {
        let dag = self.finder.dag();
        let backdoor = self.finder.backdoor_paths()?;
        let none = HashSet::new();

        if backdoor.iter().all(|p| !p.is_open_ix(dag, &none)) {
            debug!(
                exposure = self.finder.exposure(),
                outcome = self.finder.outcome(),
                "no open backdoor paths"
            );
            return Ok(vec![AdjustmentSet::default()]);
        }

        let candidates = self.candidates();
        let limit = dag.limits().max_candidates;
        if candidates.len() > limit {
            return Err(AnalysisError::TooManyCandidates {
                count: candidates.len(),
                limit,
            });
        }

        let mut minimal: Vec<HashSet<NodeIndex>> = Vec::new();
        for size in 1..=candidates.len() {
            let mut picks: Vec<usize> = (0..size).collect();
            loop {
                let set: HashSet<NodeIndex> = picks.iter().map(|&i| candidates[i]).collect();
                let covers_known = minimal.iter().any(|m| m.is_subset(&set));
                if !covers_known && backdoor.iter().all(|p| !p.is_open_ix(dag, &set)) {
                    minimal.push(set);
                }
                if !next_combination(&mut picks, candidates.len()) {
                    break;
                }
            }
        }

        if minimal.is_empty() {
            warn!(
                exposure = self.finder.exposure(),
                outcome = self.finder.outcome(),
                "no observable adjustment set closes every backdoor path"
            );
            return Err(AnalysisError::NoValidAdjustmentSet {
                exposure: self.finder.exposure().to_string(),
                outcome: self.finder.outcome().to_string(),
            });
        }

        let mut sets: Vec<AdjustmentSet> = minimal
            .iter()
            .map(|set| set.iter().map(|&ix| dag.name(ix)).collect())
            .collect();
        sets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        info!(
            exposure = self.finder.exposure(),
            outcome = self.finder.outcome(),
            sets = sets.len(),
            "found minimal adjustment sets"
        );
        Ok(sets)
    }

    /// Evaluate a proposed set
    pub fn check_adjustment<I, S>(&self, z: I) -> Result<AdjustmentCheck, AnalysisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dag = self.finder.dag();
        let z_ix = dag.resolve(z)?;
        let set: AdjustmentSet = z_ix.iter().map(|&ix| dag.name(ix)).collect();

        let (causal, backdoor): (Vec<Path>, Vec<Path>) = self
            .finder
            .collect_paths()?
            .into_iter()
            .partition(Path::is_causal);

        let open_backdoor_paths: Vec<Path> = backdoor
            .into_iter()
            .filter(|p| p.is_open_ix(dag, &z_ix))
            .collect();
        let blocked_causal_paths: Vec<Path> = causal
            .into_iter()
            .filter(|p| !p.is_open_ix(dag, &z_ix))
            .collect();

        let warnings: Vec<AdjustmentWarning> = self
            .adjustment_warnings()?
            .into_iter()
            .filter(|w| set.contains(&w.node))
            .collect();

        // Colliders are judged through the paths they open; a collider
        // conditioned together with a blocker on its path is admissible.
        let x = self.finder.exposure_ix();
        let y = self.finder.outcome_ix();
        let downstream = dag.descendants_ix(x);
        let admissible = z_ix.iter().all(|&ix| {
            ix != x && ix != y && dag.role(ix).is_observed() && !downstream.contains(&ix)
        });

        let valid =
            admissible && open_backdoor_paths.is_empty() && blocked_causal_paths.is_empty();

        Ok(AdjustmentCheck {
            set,
            valid,
            open_backdoor_paths,
            blocked_causal_paths,
            warnings,
        })
    }

    /// "Do not adjust" flags for every node, sorted by node then reason
    ///
    /// A node on a causal path is flagged `Mediator`; a collider on any path
    /// is flagged `Collider`; any other descendant of the exposure is flagged
    /// `DescendantOfExposure`. Unobserved nodes and the endpoints are always
    /// flagged.
    pub fn adjustment_warnings(&self) -> Result<Vec<AdjustmentWarning>, AnalysisError> {
        let dag = self.finder.dag();
        let mut flags: BTreeMap<String, BTreeSet<WarningKind>> = BTreeMap::new();
        let mut flag = |ix: NodeIndex, kind: WarningKind| {
            flags.entry(dag.name(ix).to_string()).or_default().insert(kind);
        };

        flag(self.finder.exposure_ix(), WarningKind::Endpoint);
        flag(self.finder.outcome_ix(), WarningKind::Endpoint);

        for path in self.finder.collect_paths()? {
            if path.is_causal() {
                for &ix in path.interior_ix() {
                    flag(ix, WarningKind::Mediator);
                }
            }
            for (&ix, (_, junction)) in path.interior_ix().iter().zip(path.junctions()) {
                if junction == Junction::Collider {
                    flag(ix, WarningKind::Collider);
                }
            }
        }

        for ix in dag.descendants_ix(self.finder.exposure_ix()) {
            flag(ix, WarningKind::DescendantOfExposure);
        }

        for node in dag.nodes_with_role(Role::Unobserved) {
            flag(dag.ix(&node.id)?, WarningKind::Unobserved);
        }

        Ok(flags
            .into_iter()
            .flat_map(|(node, kinds)| {
                let specific = kinds.contains(&WarningKind::Mediator)
                    || kinds.contains(&WarningKind::Collider)
                    || kinds.contains(&WarningKind::Endpoint);
                kinds
                    .into_iter()
                    .filter(move |k| !(specific && *k == WarningKind::DescendantOfExposure))
                    .map(move |kind| AdjustmentWarning {
                        node: node.clone(),
                        kind,
                    })
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    /// Observable ancestors of exposure or outcome that are not descendants
    /// of the exposure, in identifier order
    fn candidates(&self) -> Vec<NodeIndex> {
        let dag = self.finder.dag();
        let x = self.finder.exposure_ix();
        let y = self.finder.outcome_ix();
        let forbidden = dag.descendants_ix(x);

        let mut pool: Vec<NodeIndex> = dag
            .ancestors_ix(x)
            .union(&dag.ancestors_ix(y))
            .copied()
            .filter(|&ix| ix != x && ix != y)
            .filter(|ix| !forbidden.contains(ix))
            .filter(|&ix| dag.role(ix).is_observed())
            .collect();
        pool.sort_by(|a, b| dag.name(*a).cmp(dag.name(*b)));
        pool
    }
}

/// Advance `picks` to the next k-combination of `0..n` in lexicographic order
fn next_combination(picks: &mut [usize], n: usize) -> bool {
    let k = picks.len();
    for i in (0..k).rev() {
        if picks[i] < n - k + i {
            picks[i] += 1;
            for j in i + 1..k {
                picks[j] = picks[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Every minimal adjustment set for the effect of `exposure` on `outcome`
pub fn find_adjustment_sets(
    dag: &CausalDag,
    exposure: &str,
    outcome: &str,
) -> Result<Vec<AdjustmentSet>, AnalysisError> {
    AdjustmentSetSolver::new(dag, exposure, outcome)?.find_adjustment_sets()
}
