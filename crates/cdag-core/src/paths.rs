//! Path enumeration between exposure and outcome
//!
//! Paths are simple walks over the undirected skeleton of the DAG. Edge
//! direction is kept per step so that every intermediate node can be
//! classified as a [`Junction`], and so that a path can be tested for being
//! open under a conditioning set.
//!
//! [`Paths`] is lazy: nodes are expanded only as the iterator is pulled.
//! Neighbours are visited in identifier order, so two iterations over the
//! same graph yield the same sequence.

use crate::dag::CausalDag;
use crate::error::{AnalysisError, GraphError};
use crate::junction::Junction;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Empty conditioning set
pub const UNCONDITIONED: [&str; 0] = [];

/// Direction of the edge traversed by one path step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Edge points along the walk: `a -> b`
    Forward,
    /// Edge points against the walk: `a <- b`
    Backward,
}

/// A simple path between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    nodes: Vec<String>,
    steps: Vec<Step>,
    #[serde(skip)]
    ixs: Vec<NodeIndex>,
}

impl Path {
    fn from_indices(dag: &CausalDag, ixs: Vec<NodeIndex>, steps: Vec<Step>) -> Self {
        let nodes = ixs.iter().map(|&ix| dag.name(ix).to_string()).collect();
        Self { nodes, steps, ixs }
    }

    /// Node identifiers from exposure to outcome
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// One step per edge
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of nodes, endpoints included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, one less than [`Path::node_count`]
    pub fn edge_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no edges
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every edge points from the exposure toward the outcome
    pub fn is_causal(&self) -> bool {
        self.steps.iter().all(|s| *s == Step::Forward)
    }

    /// Any non-causal path
    pub fn is_backdoor(&self) -> bool {
        !self.is_causal()
    }

    /// First edge points into the start node (classic backdoor shape)
    pub fn enters_start(&self) -> bool {
        self.steps.first() == Some(&Step::Backward)
    }

    /// Junction type at every intermediate node
    pub fn junctions(&self) -> Vec<(&str, Junction)> {
        self.steps
            .windows(2)
            .zip(&self.nodes[1..])
            .map(|(pair, node)| (node.as_str(), Junction::from_steps(pair[0], pair[1])))
            .collect()
    }

    /// Intermediate nodes that are colliders on this path
    pub fn colliders(&self) -> Vec<&str> {
        self.junctions()
            .into_iter()
            .filter(|(_, j)| *j == Junction::Collider)
            .map(|(n, _)| n)
            .collect()
    }

    /// Whether the path is open (d-connecting) given conditioning set `z`
    ///
    /// Blocked iff it contains a non-collider in `z`, or a collider that is
    /// not in `z` and has no descendant in `z`.
    pub fn is_open<I, S>(&self, dag: &CausalDag, z: I) -> Result<bool, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let z = dag.resolve(z)?;
        Ok(self.is_open_ix(dag, &z))
    }

    pub(crate) fn is_open_ix(&self, dag: &CausalDag, z: &HashSet<NodeIndex>) -> bool {
        self.steps
            .windows(2)
            .zip(&self.ixs[1..])
            .all(|(pair, &q)| {
                let junction = Junction::from_steps(pair[0], pair[1]);
                let conditioned = z.contains(&q);
                let descendant_conditioned = junction == Junction::Collider
                    && !conditioned
                    && dag.descendants_ix(q).iter().any(|d| z.contains(d));
                junction.transmits(conditioned, descendant_conditioned)
            })
    }

    pub(crate) fn interior_ix(&self) -> &[NodeIndex] {
        match self.ixs.len() {
            0..=2 => &[],
            n => &self.ixs[1..n - 1],
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.nodes.first() else {
            return Ok(());
        };
        f.write_str(first)?;
        for (step, node) in self.steps.iter().zip(&self.nodes[1..]) {
            let arrow = match step {
                Step::Forward => " -> ",
                Step::Backward => " <- ",
            };
            write!(f, "{arrow}{node}")?;
        }
        Ok(())
    }
}

/// Entry point for path queries between a fixed pair of nodes
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    dag: &'g CausalDag,
    exposure: NodeIndex,
    outcome: NodeIndex,
}

impl<'g> PathFinder<'g> {
    /// Finder between two named nodes
    pub fn new(dag: &'g CausalDag, exposure: &str, outcome: &str) -> Result<Self, AnalysisError> {
        let x = dag.ix(exposure)?;
        let y = dag.ix(outcome)?;
        if x == y {
            return Err(AnalysisError::SameEndpoints(exposure.to_string()));
        }
        Ok(Self {
            dag,
            exposure: x,
            outcome: y,
        })
    }

    /// Finder between the graph's designated exposure and outcome
    pub fn for_designated(dag: &'g CausalDag) -> Result<Self, AnalysisError> {
        let exposure = dag.exposure_ix().ok_or(AnalysisError::MissingRole("exposure"))?;
        let outcome = dag.outcome_ix().ok_or(AnalysisError::MissingRole("outcome"))?;
        Ok(Self {
            dag,
            exposure,
            outcome,
        })
    }

    /// Graph being searched
    pub fn dag(&self) -> &'g CausalDag {
        self.dag
    }

    /// Start node
    pub fn exposure(&self) -> &'g str {
        self.dag.name(self.exposure)
    }

    /// End node
    pub fn outcome(&self) -> &'g str {
        self.dag.name(self.outcome)
    }

    pub(crate) fn exposure_ix(&self) -> NodeIndex {
        self.exposure
    }

    pub(crate) fn outcome_ix(&self) -> NodeIndex {
        self.outcome
    }

    /// Fresh lazy iterator over all simple paths
    pub fn paths(&self) -> Paths<'g> {
        Paths::new(self.dag, self.exposure, self.outcome)
    }

    /// Collect every path, refusing to go past the configured path limit
    pub fn collect_paths(&self) -> Result<Vec<Path>, AnalysisError> {
        let limit = self.dag.limits().max_paths;
        let mut out = Vec::new();
        for path in self.paths() {
            if out.len() == limit {
                return Err(AnalysisError::TooManyPaths(limit));
            }
            out.push(path);
        }
        debug!(
            exposure = self.exposure(),
            outcome = self.outcome(),
            paths = out.len(),
            "enumerated paths"
        );
        Ok(out)
    }

    /// Directed paths from exposure to outcome
    pub fn causal_paths(&self) -> Result<Vec<Path>, AnalysisError> {
        Ok(self.collect_paths()?.into_iter().filter(Path::is_causal).collect())
    }

    /// Non-causal paths
    pub fn backdoor_paths(&self) -> Result<Vec<Path>, AnalysisError> {
        Ok(self.collect_paths()?.into_iter().filter(Path::is_backdoor).collect())
    }

    /// Paths that are open given conditioning set `z`
    pub fn open_paths<I, S>(&self, z: I) -> Result<Vec<Path>, AnalysisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let z = self.dag.resolve(z)?;
        Ok(self
            .collect_paths()?
            .into_iter()
            .filter(|p| p.is_open_ix(self.dag, &z))
            .collect())
    }
}

impl<'g> IntoIterator for &PathFinder<'g> {
    type Item = Path;
    type IntoIter = Paths<'g>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths()
    }
}

/// Enumerate simple paths between `exposure` and `outcome`
pub fn find_paths<'g>(
    dag: &'g CausalDag,
    exposure: &str,
    outcome: &str,
) -> Result<Paths<'g>, AnalysisError> {
    Ok(PathFinder::new(dag, exposure, outcome)?.paths())
}

impl CausalDag {
    /// Whether `x` and `y` are d-separated given `z`
    ///
    /// True iff every path between them is blocked.
    pub fn d_separated<I, S>(&self, x: &str, y: &str, z: I) -> Result<bool, AnalysisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let finder = PathFinder::new(self, x, y)?;
        let z = self.resolve(z)?;
        let limit = self.limits().max_paths;
        for (seen, path) in finder.paths().enumerate() {
            if seen == limit {
                return Err(AnalysisError::TooManyPaths(limit));
            }
            if path.is_open_ix(self, &z) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[derive(Debug)]
struct Frame {
    node: NodeIndex,
    neighbors: Vec<(NodeIndex, Step)>,
    next: usize,
}

/// Lazy depth-first path iterator
#[derive(Debug)]
pub struct Paths<'g> {
    dag: &'g CausalDag,
    target: NodeIndex,
    stack: Vec<Frame>,
    steps: Vec<Step>,
    on_path: HashSet<NodeIndex>,
}

impl<'g> Paths<'g> {
    fn new(dag: &'g CausalDag, source: NodeIndex, target: NodeIndex) -> Self {
        let mut on_path = HashSet::new();
        on_path.insert(source);
        Self {
            dag,
            target,
            stack: vec![Frame {
                node: source,
                neighbors: dag.skeleton_neighbors(source),
                next: 0,
            }],
            steps: Vec::new(),
            on_path,
        }
    }
}

impl Iterator for Paths<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        loop {
            let frame = self.stack.last_mut()?;

            let Some(&(next, step)) = frame.neighbors.get(frame.next) else {
                let done = self.stack.pop()?;
                self.on_path.remove(&done.node);
                self.steps.pop();
                continue;
            };
            frame.next += 1;

            if self.on_path.contains(&next) {
                continue;
            }

            if next == self.target {
                let mut ixs: Vec<NodeIndex> = self.stack.iter().map(|f| f.node).collect();
                ixs.push(next);
                let mut steps = self.steps.clone();
                steps.push(step);
                return Some(Path::from_indices(self.dag, ixs, steps));
            }

            self.on_path.insert(next);
            self.steps.push(step);
            self.stack.push(Frame {
                node: next,
                neighbors: self.dag.skeleton_neighbors(next),
                next: 0,
            });
        }
    }
}
