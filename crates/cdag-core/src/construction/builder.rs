//! DAG Builder
//!
//! The only way to obtain a [`CausalDag`]. Declarations accumulate in any
//! order; [`DagBuilder::build`] resolves references, checks roles and rejects
//! cycles in one pass.

use crate::config::AnalysisLimits;
use crate::construction::formula::{parse_formula, parse_formulas};
use crate::construction::validator::{ConstructionValidator, Declarations};
use crate::dag::CausalDag;
use crate::error::GraphError;
use crate::types::{validate_identifier, Node};
use indexmap::{IndexMap, IndexSet};

/// Builder for causal DAGs
///
/// Usage:
/// ```rust
/// use cdag_core::construction::DagBuilder;
///
/// let mut builder = DagBuilder::new();
/// builder.formula("podcast ~ mood + humor + prepared")?;
/// builder.formula("exam ~ mood + prepared")?;
/// builder.exposure("podcast")?;
/// builder.outcome("exam")?;
/// let dag = builder.build()?;
/// assert_eq!(dag.node_count(), 5);
/// # Ok::<(), cdag_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DagBuilder {
    nodes: IndexMap<String, Node>,
    edges: IndexSet<(String, String)>,
    exposure: Option<String>,
    outcome: Option<String>,
    unobserved: Vec<String>,
    labels: Vec<(String, String)>,
    coords: Vec<(String, (f64, f64))>,
    limits: AnalysisLimits,
}

impl DagBuilder {
    /// Create an empty builder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with custom limits
    pub fn with_limits(limits: AnalysisLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Number of nodes declared so far
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges declared so far
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Declare a node with no edges
    pub fn node(&mut self, id: &str) -> Result<&mut Self, GraphError> {
        self.declare(id)?;
        Ok(self)
    }

    /// Declare `cause -> effect`
    pub fn edge(&mut self, cause: &str, effect: &str) -> Result<&mut Self, GraphError> {
        self.declare(cause)?;
        self.declare(effect)?;
        self.edges.insert((cause.to_string(), effect.to_string()));
        Ok(self)
    }

    /// Declare `effect ~ causes`
    pub fn relation<I, S>(&mut self, effect: &str, causes: I) -> Result<&mut Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.declare(effect)?;
        for cause in causes {
            self.edge(cause.as_ref(), effect)?;
        }
        Ok(self)
    }

    /// Declare a relation written as `effect ~ cause1 + cause2`
    pub fn formula(&mut self, formula: &str) -> Result<&mut Self, GraphError> {
        let rel = parse_formula(formula)?;
        self.relation(&rel.effect, &rel.causes)
    }

    /// Declare every relation in a newline- or `;`-separated block
    pub fn formulas(&mut self, block: &str) -> Result<&mut Self, GraphError> {
        for rel in parse_formulas(block)? {
            self.relation(&rel.effect, &rel.causes)?;
        }
        Ok(self)
    }

    /// Tag the exposure node
    pub fn exposure(&mut self, id: &str) -> Result<&mut Self, GraphError> {
        Self::set_role(&mut self.exposure, "exposure", id)?;
        Ok(self)
    }

    /// Tag the outcome node
    pub fn outcome(&mut self, id: &str) -> Result<&mut Self, GraphError> {
        Self::set_role(&mut self.outcome, "outcome", id)?;
        Ok(self)
    }

    /// Tag a node as unobserved
    pub fn unobserved(&mut self, id: &str) -> &mut Self {
        self.unobserved.push(id.to_string());
        self
    }

    /// Attach a display label
    pub fn label(&mut self, id: &str, label: &str) -> &mut Self {
        self.labels.push((id.to_string(), label.to_string()));
        self
    }

    /// Attach display coordinates
    pub fn coords(&mut self, id: &str, x: f64, y: f64) -> &mut Self {
        self.coords.push((id.to_string(), (x, y)));
        self
    }

    /// Validate all declarations and produce an immutable graph
    ///
    /// Fails with [`GraphError::Cycle`] if the edges contain a directed cycle
    /// and with [`GraphError::UnknownNode`] if a tag names an undeclared node.
    pub fn build(self) -> Result<CausalDag, GraphError> {
        let validator = ConstructionValidator::with_limits(self.limits);
        validator.validate(Declarations {
            nodes: self.nodes,
            edges: self.edges,
            exposure: self.exposure,
            outcome: self.outcome,
            unobserved: self.unobserved,
            labels: self.labels,
            coords: self.coords,
        })
    }

    fn declare(&mut self, id: &str) -> Result<(), GraphError> {
        if !self.nodes.contains_key(id) {
            validate_identifier(id)?;
            self.nodes.insert(id.to_string(), Node::new(id));
        }
        Ok(())
    }

    fn set_role(
        slot: &mut Option<String>,
        role: &'static str,
        id: &str,
    ) -> Result<(), GraphError> {
        match slot {
            Some(existing) if existing != id => Err(GraphError::DuplicateRole {
                role,
                existing: existing.clone(),
                requested: id.to_string(),
            }),
            _ => {
                *slot = Some(id.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_declares_nodes_and_edges() {
        let mut builder = DagBuilder::new();
        builder.relation("exam", ["mood", "prepared"]).unwrap();

        assert_eq!(builder.node_count(), 3);
        assert_eq!(builder.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut builder = DagBuilder::new();
        builder.edge("a", "b").unwrap();
        builder.formula("b ~ a").unwrap();

        assert_eq!(builder.edge_count(), 1);
        let dag = builder.build().unwrap();
        assert_eq!(dag.edge_count(), 1);
    }

    #[test]
    fn test_rejects_bad_identifier() {
        let mut builder = DagBuilder::new();
        assert!(matches!(
            builder.edge("a b", "c"),
            Err(GraphError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_rejects_second_exposure() {
        let mut builder = DagBuilder::new();
        builder.formula("y ~ x + z").unwrap();
        builder.exposure("x").unwrap();
        builder.exposure("x").unwrap();

        assert!(matches!(
            builder.exposure("z"),
            Err(GraphError::DuplicateRole { role: "exposure", .. })
        ));
    }

    #[test]
    fn test_formula_errors_surface_as_graph_errors() {
        let mut builder = DagBuilder::new();
        assert!(matches!(
            builder.formula("y = x"),
            Err(GraphError::Formula(_))
        ));
    }

    #[test]
    fn test_labels_and_coords_land_on_nodes() {
        let mut builder = DagBuilder::new();
        builder.formula("y ~ x").unwrap();
        builder.label("x", "Treatment").coords("x", 1.0, 2.0);

        let dag = builder.build().unwrap();
        let x = dag.node("x").unwrap();
        assert_eq!(x.label.as_deref(), Some("Treatment"));
        assert_eq!(x.coords, Some((1.0, 2.0)));
    }
}
