//! Error types for cdag-core
//!
//! Errors are split by phase:
//! - [`GraphError`]: construction failures (cycles, unknown nodes, bad roles)
//! - [`AnalysisError`]: path search and adjustment failures on a built graph
//! - [`FileError`]: loading a declaration file
//!
//! [`CausalError`] wraps all three for callers that do not care which phase failed.

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T, E = CausalError> = std::result::Result<T, E>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum CausalError {
    /// Graph construction failed
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),

    /// Analysis of a built graph failed
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// Declaration file could not be loaded
    #[error("file error: {0}")]
    File(#[from] FileError),
}

impl CausalError {
    /// Construction and file errors abort; analysis errors are reported to the caller.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Graph(_) | Self::File(_) => true,
            Self::Analysis(e) => e.is_fatal(),
        }
    }
}

/// Graph construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The declared edges contain a directed cycle
    #[error("cycle detected: {}", path.join(" -> "))]
    Cycle {
        /// One offending cycle, first node repeated at the end
        path: Vec<String>,
    },

    /// A reference to a node that was never declared
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// Identifier is empty or contains characters outside `[A-Za-z0-9_.]`
    #[error("invalid node identifier '{0}'")]
    InvalidIdentifier(String),

    /// More than one node tagged with the same exclusive role
    #[error("{role} already set to '{existing}', cannot also tag '{requested}'")]
    DuplicateRole {
        /// Role name ("exposure" or "outcome")
        role: &'static str,
        /// Node already holding the role
        existing: String,
        /// Node that was refused
        requested: String,
    },

    /// Exposure and outcome name the same node
    #[error("node '{0}' cannot be both exposure and outcome")]
    ExposureIsOutcome(String),

    /// Exposure or outcome also tagged unobserved
    #[error("node '{id}' cannot be both {first} and {second}")]
    RoleConflict {
        /// Node identifier
        id: String,
        /// Role already held
        first: &'static str,
        /// Role requested
        second: &'static str,
    },

    /// Graph exceeds the configured node limit
    #[error("graph has {count} nodes, limit is {limit}")]
    TooManyNodes {
        /// Nodes declared
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// Formula string could not be parsed
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// Formula parsing errors for `effect ~ cause1 + cause2`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// No `~` separator
    #[error("formula '{0}' is missing '~'")]
    MissingTilde(String),

    /// More than one `~`
    #[error("formula '{0}' has more than one '~'")]
    MultipleTildes(String),

    /// Left-hand side is empty or has more than one term
    #[error("formula '{0}' must have exactly one effect on the left of '~'")]
    BadEffect(String),

    /// A `+` with nothing on one side
    #[error("formula '{0}' has an empty cause term")]
    EmptyTerm(String),
}

/// Errors raised while analysing a built graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Node lookup failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The graph has no designated exposure or outcome
    #[error("graph has no designated {0}")]
    MissingRole(&'static str),

    /// Exposure and outcome passed to a query are the same node
    #[error("exposure and outcome are both '{0}'")]
    SameEndpoints(String),

    /// Triple classification on nodes that are not adjacent
    #[error("'{middle}' is not adjacent to both '{left}' and '{right}'")]
    NotAdjacent {
        /// First outer node
        left: String,
        /// Middle node
        middle: String,
        /// Second outer node
        right: String,
    },

    /// No observable node subset closes every backdoor path
    #[error("no valid adjustment set for the effect of '{exposure}' on '{outcome}'")]
    NoValidAdjustmentSet {
        /// Exposure node
        exposure: String,
        /// Outcome node
        outcome: String,
    },

    /// Candidate pool is too large to enumerate
    #[error("{count} adjustment candidates exceed the limit of {limit}")]
    TooManyCandidates {
        /// Candidates found
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// Path enumeration hit the configured cap
    #[error("more than {0} paths between exposure and outcome")]
    TooManyPaths(usize),
}

impl AnalysisError {
    /// `NoValidAdjustmentSet` is an answer, not a failure of the query
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoValidAdjustmentSet { .. })
    }
}

/// Declaration file errors
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// Reading the file failed
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or shape error
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension is neither `.toml` nor `.json`
    #[error("unsupported file extension for {0}")]
    UnsupportedFormat(PathBuf),
}
