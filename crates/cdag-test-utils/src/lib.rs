//! Testing utilities for the cdag workspace
//!
//! Canonical graphs used across tests and benches, plus a proptest strategy
//! for random DAGs.

#![allow(missing_docs)]

use cdag_core::construction::DagBuilder;
use cdag_core::CausalDag;
use proptest::prelude::*;

fn build(formulas: &str, exposure: &str, outcome: &str) -> CausalDag {
    let mut builder = DagBuilder::new();
    builder.formulas(formulas).unwrap();
    builder.exposure(exposure).unwrap();
    builder.outcome(outcome).unwrap();
    builder.build().unwrap()
}

/// `x <- q -> y`
pub fn fork() -> CausalDag {
    build("x ~ q; y ~ q", "x", "y")
}

/// `x -> q -> y`
pub fn chain() -> CausalDag {
    build("q ~ x; y ~ q", "x", "y")
}

/// `x -> q <- y`
pub fn collider() -> CausalDag {
    build("q ~ x + y", "x", "y")
}

/// Podcast/exam example: mood and preparedness confound, humor only drives listening
pub fn podcast() -> CausalDag {
    build(
        "podcast ~ mood + humor + prepared\nexam ~ mood + prepared",
        "podcast",
        "exam",
    )
}

/// Podcast/exam example with the direct causal edge
pub fn podcast_with_effect() -> CausalDag {
    build(
        "podcast ~ mood + humor + prepared\nexam ~ mood + prepared + podcast",
        "podcast",
        "exam",
    )
}

/// M-bias: `x <- a -> m <- b -> y` plus `x -> y`
pub fn m_bias() -> CausalDag {
    build("x ~ a; m ~ a + b; y ~ b + x", "x", "y")
}

/// Confounding through an unmeasured `u`
pub fn unobserved_confounder() -> CausalDag {
    let mut builder = DagBuilder::new();
    builder.formulas("x ~ u; y ~ u + x").unwrap();
    builder.exposure("x").unwrap();
    builder.outcome("y").unwrap();
    builder.unobserved("u");
    builder.build().unwrap()
}

/// Layered graph with `width` confounders per layer and `depth` layers
pub fn layered(width: usize, depth: usize) -> CausalDag {
    let mut builder = DagBuilder::new();
    for layer in 0..depth {
        for i in 0..width {
            let node = format!("c{layer}_{i}");
            builder.edge(&node, "x").unwrap();
            builder.edge(&node, "y").unwrap();
            if layer > 0 {
                builder.edge(&format!("c{}_{i}", layer - 1), &node).unwrap();
            }
        }
    }
    builder.edge("x", "y").unwrap();
    builder.exposure("x").unwrap();
    builder.outcome("y").unwrap();
    builder.build().unwrap()
}

/// Random DAG over `n0..nN`; edges only run from lower to higher index
///
/// Exposure and outcome are any pair `ni`, `nj` with `i < j`, so the exposure
/// may have parents and backdoor paths occur.
pub fn arb_dag(max_nodes: usize) -> impl Strategy<Value = CausalDag> {
    arb_parts(max_nodes, 0.0).prop_map(|parts| parts.build())
}

/// As [`arb_dag`], with some non-endpoint nodes tagged unobserved
pub fn arb_latent_dag(max_nodes: usize) -> impl Strategy<Value = CausalDag> {
    arb_parts(max_nodes, 0.2).prop_map(|parts| parts.build())
}

#[derive(Debug, Clone)]
struct RandomParts {
    n: usize,
    edges: Vec<bool>,
    exposure: usize,
    outcome: usize,
    latent: Vec<bool>,
}

impl RandomParts {
    fn build(self) -> CausalDag {
        let mut builder = DagBuilder::new();
        for i in 0..self.n {
            builder.node(&format!("n{i}")).unwrap();
        }
        let mut k = 0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if self.edges[k] {
                    builder.edge(&format!("n{i}"), &format!("n{j}")).unwrap();
                }
                k += 1;
            }
        }
        builder.exposure(&format!("n{}", self.exposure)).unwrap();
        builder.outcome(&format!("n{}", self.outcome)).unwrap();
        for (i, hidden) in self.latent.iter().enumerate() {
            if *hidden && i != self.exposure && i != self.outcome {
                builder.unobserved(&format!("n{i}"));
            }
        }
        builder.build().unwrap()
    }
}

fn arb_parts(max_nodes: usize, latent: f64) -> impl Strategy<Value = RandomParts> {
    (2..=max_nodes).prop_flat_map(move |n| {
        (
            proptest::collection::vec(any::<bool>(), n * (n - 1) / 2),
            0..n,
            0..n - 1,
            proptest::collection::vec(proptest::bool::weighted(latent), n),
        )
            .prop_map(move |(edges, a, b, latent)| {
                let b = if b >= a { b + 1 } else { b };
                RandomParts {
                    n,
                    edges,
                    exposure: a.min(b),
                    outcome: a.max(b),
                    latent,
                }
            })
    })
}
