//! Construction Validator
//!
//! Performs every structural check once, at build time. A [`CausalDag`] that
//! exists is acyclic and fully resolved; queries never re-validate.

use crate::config::AnalysisLimits;
use crate::dag::CausalDag;
use crate::error::GraphError;
use crate::types::{Node, Role};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// Raw declarations collected by the builder
#[derive(Debug)]
pub(crate) struct Declarations {
    pub(crate) nodes: IndexMap<String, Node>,
    pub(crate) edges: IndexSet<(String, String)>,
    pub(crate) exposure: Option<String>,
    pub(crate) outcome: Option<String>,
    pub(crate) unobserved: Vec<String>,
    pub(crate) labels: Vec<(String, String)>,
    pub(crate) coords: Vec<(String, (f64, f64))>,
}

/// Construction-time validator
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstructionValidator {
    limits: AnalysisLimits,
}

impl ConstructionValidator {
    /// Validator with custom limits
    pub(crate) fn with_limits(limits: AnalysisLimits) -> Self {
        Self { limits }
    }

    /// Validate declarations and assemble the graph
    ///
    /// Checks, in order:
    /// 1. Node count against limits
    /// 2. Exposure and outcome are distinct nodes
    /// 3. Exposure and outcome tags reference declared nodes
    /// 4. Unobserved tags reference declared nodes and do not mark an endpoint
    /// 5. Labels and coordinates reference declared nodes
    /// 6. Edge endpoints resolve
    /// 7. Edges form no directed cycle
    pub(crate) fn validate(&self, decl: Declarations) -> Result<CausalDag, GraphError> {
        let Declarations {
            mut nodes,
            edges,
            exposure,
            outcome,
            unobserved,
            labels,
            coords,
        } = decl;

        if nodes.len() > self.limits.max_nodes {
            return Err(GraphError::TooManyNodes {
                count: nodes.len(),
                limit: self.limits.max_nodes,
            });
        }

        if let (Some(x), Some(y)) = (&exposure, &outcome) {
            if x == y {
                return Err(GraphError::ExposureIsOutcome(x.clone()));
            }
        }

        for (id, role) in [(exposure, Role::Exposure), (outcome, Role::Outcome)]
            .into_iter()
            .filter_map(|(id, role)| id.map(|id| (id, role)))
        {
            Self::node_mut(&mut nodes, &id)?.role = role;
        }

        for id in &unobserved {
            let node = Self::node_mut(&mut nodes, id)?;
            if matches!(node.role, Role::Exposure | Role::Outcome) {
                return Err(GraphError::RoleConflict {
                    id: id.clone(),
                    first: node.role.as_str(),
                    second: Role::Unobserved.as_str(),
                });
            }
            node.role = Role::Unobserved;
        }

        for (id, label) in labels {
            Self::node_mut(&mut nodes, &id)?.label = Some(label);
        }
        for (id, xy) in coords {
            Self::node_mut(&mut nodes, &id)?.coords = Some(xy);
        }

        let indexed: Vec<(usize, usize)> = edges
            .iter()
            .map(|(cause, effect)| {
                let from = nodes
                    .get_index_of(cause)
                    .ok_or_else(|| GraphError::UnknownNode(cause.clone()))?;
                let to = nodes
                    .get_index_of(effect)
                    .ok_or_else(|| GraphError::UnknownNode(effect.clone()))?;
                Ok((from, to))
            })
            .collect::<Result<_, GraphError>>()?;

        if let Some(cycle) = find_cycle(nodes.len(), &indexed) {
            let path = cycle
                .into_iter()
                .filter_map(|i| nodes.get_index(i).map(|(id, _)| id.clone()))
                .collect();
            return Err(GraphError::Cycle { path });
        }

        debug!(
            nodes = nodes.len(),
            edges = indexed.len(),
            "validated causal dag"
        );

        Ok(CausalDag::from_validated(
            nodes.into_values().collect(),
            &indexed,
            self.limits,
        ))
    }

    fn node_mut<'a>(
        nodes: &'a mut IndexMap<String, Node>,
        id: &str,
    ) -> Result<&'a mut Node, GraphError> {
        nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }
}

/// Find one directed cycle using DFS
///
/// Returns the cycle as node positions with the first node repeated at the end.
fn find_cycle(node_count: usize, edges: &[(usize, usize)]) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    let mut adjacency = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        adjacency[from].push(to);
    }

    fn dfs(
        node: usize,
        adjacency: &[Vec<usize>],
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        marks[node] = Mark::Visiting;
        stack.push(node);

        for &next in &adjacency[node] {
            match marks[next] {
                Mark::Visiting => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = dfs(next, adjacency, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[node] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; node_count];
    let mut stack = Vec::new();
    for node in 0..node_count {
        if marks[node] == Mark::Unvisited {
            if let Some(cycle) = dfs(node, &adjacency, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
    }
    None
}
