//! Immutable causal DAG
//!
//! A [`CausalDag`] is only produced by [`crate::construction::DagBuilder::build`],
//! which has already rejected cycles, unknown references and conflicting roles.
//! Everything here is a read-only query.

use crate::config::AnalysisLimits;
use crate::error::GraphError;
use crate::paths::Step;
use crate::types::{Node, Role};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet};

/// Directed acyclic graph of causal relationships
#[derive(Debug, Clone)]
pub struct CausalDag {
    graph: DiGraph<Node, ()>,
    index: IndexMap<String, NodeIndex>,
    exposure: Option<NodeIndex>,
    outcome: Option<NodeIndex>,
    limits: AnalysisLimits,
}

impl CausalDag {
    /// Assemble a graph from parts that passed construction validation
    pub(crate) fn from_validated(
        nodes: Vec<Node>,
        edges: &[(usize, usize)],
        limits: AnalysisLimits,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index = IndexMap::with_capacity(nodes.len());
        let mut exposure = None;
        let mut outcome = None;

        for node in nodes {
            let id = node.id.clone();
            let role = node.role;
            let ix = graph.add_node(node);
            match role {
                Role::Exposure => exposure = Some(ix),
                Role::Outcome => outcome = Some(ix),
                Role::Covariate | Role::Unobserved => {}
            }
            index.insert(id, ix);
        }

        for &(cause, effect) in edges {
            graph.add_edge(NodeIndex::new(cause), NodeIndex::new(effect), ());
        }

        Self {
            graph,
            index,
            exposure,
            outcome,
            limits,
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Limits applied to analyses on this graph
    pub fn limits(&self) -> AnalysisLimits {
        self.limits
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.index.values().map(|&ix| &self.graph[ix])
    }

    /// Look up a node by identifier
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    /// Whether a node with this identifier exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes tagged with `role`, in declaration order
    pub fn nodes_with_role(&self, role: Role) -> Vec<&Node> {
        self.nodes().filter(|n| n.role == role).collect()
    }

    /// Designated exposure, if any
    pub fn exposure(&self) -> Option<&str> {
        self.exposure.map(|ix| self.name(ix))
    }

    /// Designated outcome, if any
    pub fn outcome(&self) -> Option<&str> {
        self.outcome.map(|ix| self.name(ix))
    }

    /// All edges as `(cause, effect)` pairs, in declaration order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (self.name(e.source()), self.name(e.target())))
    }

    /// Whether `cause -> effect` is an edge
    pub fn has_edge(&self, cause: &str, effect: &str) -> Result<bool, GraphError> {
        let from = self.ix(cause)?;
        let to = self.ix(effect)?;
        Ok(self.graph.contains_edge(from, to))
    }

    /// Direct causes of `id`, sorted
    pub fn parents(&self, id: &str) -> Result<Vec<&str>, GraphError> {
        self.direct(id, Direction::Incoming)
    }

    /// Direct effects of `id`, sorted
    pub fn children(&self, id: &str) -> Result<Vec<&str>, GraphError> {
        self.direct(id, Direction::Outgoing)
    }

    /// Every node with a directed path into `id`
    pub fn ancestors(&self, id: &str) -> Result<BTreeSet<&str>, GraphError> {
        let ix = self.ix(id)?;
        Ok(self.ancestors_ix(ix).into_iter().map(|a| self.name(a)).collect())
    }

    /// Every node reachable from `id` along directed edges
    pub fn descendants(&self, id: &str) -> Result<BTreeSet<&str>, GraphError> {
        let ix = self.ix(id)?;
        Ok(self.descendants_ix(ix).into_iter().map(|d| self.name(d)).collect())
    }

    /// Nodes ordered so every cause precedes its effects
    pub fn topological_order(&self) -> Result<Vec<&str>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| self.name(ix)).collect()),
            Err(cycle) => Err(GraphError::Cycle {
                path: vec![self.name(cycle.node_id()).to_string()],
            }),
        }
    }

    pub(crate) fn ix(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    pub(crate) fn name(&self, ix: NodeIndex) -> &str {
        &self.graph[ix].id
    }

    pub(crate) fn role(&self, ix: NodeIndex) -> Role {
        self.graph[ix].role
    }

    pub(crate) fn exposure_ix(&self) -> Option<NodeIndex> {
        self.exposure
    }

    pub(crate) fn outcome_ix(&self) -> Option<NodeIndex> {
        self.outcome
    }

    /// Resolve identifiers into a set of indices
    pub(crate) fn resolve<I, S>(&self, ids: I) -> Result<HashSet<NodeIndex>, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| self.ix(id.as_ref())).collect()
    }

    /// Skeleton neighbours of `ix`, sorted by identifier, with the direction
    /// of the connecting edge as seen when stepping away from `ix`
    pub(crate) fn skeleton_neighbors(&self, ix: NodeIndex) -> Vec<(NodeIndex, Step)> {
        let mut out: Vec<_> = self
            .graph
            .neighbors_directed(ix, Direction::Outgoing)
            .map(|n| (n, Step::Forward))
            .chain(
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .map(|n| (n, Step::Backward)),
            )
            .collect();
        out.sort_by(|a, b| self.name(a.0).cmp(self.name(b.0)));
        out
    }

    /// Strict descendants of `ix`
    pub(crate) fn descendants_ix(&self, ix: NodeIndex) -> HashSet<NodeIndex> {
        let mut dfs = Dfs::new(&self.graph, ix);
        let mut out = HashSet::new();
        while let Some(n) = dfs.next(&self.graph) {
            if n != ix {
                out.insert(n);
            }
        }
        out
    }

    /// Strict ancestors of `ix`
    pub(crate) fn ancestors_ix(&self, ix: NodeIndex) -> HashSet<NodeIndex> {
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, ix);
        let mut out = HashSet::new();
        while let Some(n) = dfs.next(reversed) {
            if n != ix {
                out.insert(n);
            }
        }
        out
    }

    fn direct(&self, id: &str, dir: Direction) -> Result<Vec<&str>, GraphError> {
        let ix = self.ix(id)?;
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(ix, dir)
            .map(|n| self.name(n))
            .collect();
        out.sort_unstable();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::construction::DagBuilder;

    fn diamond() -> crate::CausalDag {
        let mut builder = DagBuilder::new();
        builder.formula("b ~ a").unwrap();
        builder.formula("c ~ a").unwrap();
        builder.formula("d ~ b + c").unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_counts_and_lookup() {
        let dag = diamond();
        assert_eq!(dag.node_count(), 4);
        assert_eq!(dag.edge_count(), 4);
        assert!(dag.contains("a"));
        assert!(dag.node("z").is_none());
        assert!(dag.has_edge("a", "b").unwrap());
        assert!(!dag.has_edge("b", "a").unwrap());
    }

    #[test]
    fn test_parents_and_children_sorted() {
        let dag = diamond();
        assert_eq!(dag.parents("d").unwrap(), vec!["b", "c"]);
        assert_eq!(dag.children("a").unwrap(), vec!["b", "c"]);
        assert!(dag.parents("a").unwrap().is_empty());
    }

    #[test]
    fn test_ancestors_and_descendants_exclude_self() {
        let dag = diamond();
        let anc = dag.ancestors("d").unwrap();
        assert_eq!(anc.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        let desc = dag.descendants("b").unwrap();
        assert_eq!(desc.into_iter().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let dag = diamond();
        let order = dag.topological_order().unwrap();
        let pos = |id: &str| order.iter().position(|n| *n == id).unwrap();
        for (cause, effect) in dag.edges() {
            assert!(pos(cause) < pos(effect), "{cause} should precede {effect}");
        }
    }

    #[test]
    fn test_unknown_node_is_reported() {
        let dag = diamond();
        assert!(matches!(
            dag.parents("nope"),
            Err(crate::GraphError::UnknownNode(id)) if id == "nope"
        ));
    }
}
