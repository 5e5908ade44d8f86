//! cdag-core
//!
//! Causal directed acyclic graphs: construction, junction classification,
//! path enumeration and adjustment-set identification.
//!
//! # Two phases
//!
//! 1. **Construction**: declare relations (`effect ~ cause + cause`), tag the
//!    exposure and outcome, build an immutable [`CausalDag`]. Cycles and
//!    unknown references are rejected here.
//! 2. **Analysis**: read-only queries on the built graph. Enumerate paths with
//!    [`PathFinder`], test them against a conditioning set, and compute
//!    minimal adjustment sets with [`AdjustmentSetSolver`].
//!
//! # Quick Start
//!
//! ```rust
//! use cdag_core::prelude::*;
//!
//! let mut builder = DagBuilder::new();
//! builder.formula("podcast ~ mood + humor + prepared")?;
//! builder.formula("exam ~ mood + prepared")?;
//! builder.exposure("podcast")?;
//! builder.outcome("exam")?;
//! let dag = builder.build()?;
//!
//! let finder = PathFinder::for_designated(&dag)?;
//! assert_eq!(finder.open_paths(UNCONDITIONED)?.len(), 2);
//!
//! let sets = AdjustmentSetSolver::for_designated(&dag)?.find_adjustment_sets()?;
//! assert_eq!(sets[0].to_string(), "{mood, prepared}");
//! # Ok::<(), cdag_core::CausalError>(())
//! ```

pub mod adjustment;
pub mod config;
pub mod construction;
pub mod dag;
pub mod error;
pub mod file;
pub mod junction;
pub mod paths;
pub mod types;

pub use adjustment::{
    find_adjustment_sets, AdjustmentCheck, AdjustmentSet, AdjustmentSetSolver, AdjustmentWarning,
    WarningKind,
};
pub use config::AnalysisLimits;
pub use dag::CausalDag;
pub use error::{AnalysisError, CausalError, FileError, FormulaError, GraphError, Result};
pub use junction::{classify, Junction};
pub use paths::{find_paths, Path, PathFinder, Paths, Step, UNCONDITIONED};
pub use types::{Node, Role};

/// Common imports
pub mod prelude {
    pub use crate::adjustment::{AdjustmentSet, AdjustmentSetSolver, WarningKind};
    pub use crate::construction::DagBuilder;
    pub use crate::dag::CausalDag;
    pub use crate::error::{AnalysisError, CausalError, GraphError};
    pub use crate::file::DagFile;
    pub use crate::junction::Junction;
    pub use crate::paths::{Path, PathFinder, UNCONDITIONED};
    pub use crate::types::Role;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
