//! Error types for graph resolution and node application.
//!
//! Engine errors are categorized so the executor can tell transient
//! failures, which are retried with backoff, from permanent ones, which
//! fail the node immediately.

use crate::graph::LogicalId;
use std::fmt;
use thiserror::Error;

/// Structural errors in a resource graph.
///
/// These indicate a defect in whatever built the graph, never a problem with
/// user input, and abort the whole operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two nodes were declared with the same logical id
    #[error("duplicate resource id: {0}")]
    DuplicateNode(LogicalId),

    /// A node declares an edge to a node that is not in the graph
    #[error("resource {node} depends on unknown resource {dependency}")]
    UnknownDependency {
        node: LogicalId,
        dependency: LogicalId,
    },

    /// The dependency edges contain a cycle
    #[error("dependency cycle detected among: {}", join_ids(.nodes))]
    Cycle {
        /// Nodes that could not be ordered
        nodes: Vec<LogicalId>,
    },
}

fn join_ids(ids: &[LogicalId]) -> String {
    ids.iter()
        .map(LogicalId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Categories of engine errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Throttling, timeouts, eventual consistency (retryable)
    Transient,
    /// The target system rejected the request as conflicting
    Conflict,
    /// A prerequisite resource is not present
    MissingDependency,
    /// The change would mutate a resource that may only be created once
    Immutable,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transient => "Transient provider failure",
            Self::Conflict => "Conflicting resource",
            Self::MissingDependency => "Missing prerequisite",
            Self::Immutable => "Immutable resource",
            Self::Other => "Unexpected error",
        }
    }
}

/// Errors reported by an [`ApplyEngine`](crate::ApplyEngine) for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Throttling, timeout or other temporary failure
    #[error("transient provider error: {message}")]
    Transient { message: String },

    /// The provider rejected the request
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// A dependency has no physical identifier yet
    #[error("dependency {dependency} is not present")]
    MissingDependency { dependency: LogicalId },

    /// The resource can only be created, not updated in place
    #[error("{id} cannot be modified after creation; destroy it first")]
    Immutable { id: LogicalId },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transient { .. } => ErrorCategory::Transient,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::MissingDependency { .. } => ErrorCategory::MissingDependency,
            Self::Immutable { .. } => ErrorCategory::Immutable,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

/// Which direction the executor was converging in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Apply,
    Destroy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Apply => write!(f, "apply"),
            Operation::Destroy => write!(f, "destroy"),
        }
    }
}

/// An engine failure attributed to the node that caused it.
///
/// Already-applied nodes are left in place; the operator reruns once the
/// cause is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to {operation} {node_id}: {source}")]
pub struct ApplyError {
    pub node_id: LogicalId,
    pub operation: Operation,
    #[source]
    pub source: ProviderError,
}
