//! Construction Phase
//!
//! Declarations go in, an immutable [`crate::CausalDag`] comes out.
//!
//! 1. **Declare** (builder, formula): nodes, `effect ~ causes` relations,
//!    roles, display labels and coordinates
//! 2. **Validate** (validator): resolve references, check roles, reject cycles
//!
//! Nothing downstream of `build()` re-checks structure.

pub mod builder;
pub mod formula;
pub(crate) mod validator;

pub use builder::DagBuilder;
pub use formula::{parse_formula, parse_formulas, Relation};
