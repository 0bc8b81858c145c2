//! # Declarative
//!
//! A framework for declarative resource graphs.
//!
//! This crate provides the core abstractions for declaring a set of resources
//! with explicit dependencies, resolving a deterministic application order,
//! and converging an external system to match the declaration one node at a
//! time.
//!
//! ## Core Concepts
//!
//! - **ResourceGraph**: Typed nodes, each with a stable logical id and the ids it depends on
//! - **Resolver**: Topological ordering with insertion-order tie-breaking
//! - **ExecutionPlan**: A graph paired with its resolved order
//! - **ApplyEngine**: The external system that actually creates and destroys resources
//! - **Executor**: Applies a plan sequentially, retrying transient engine failures
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecutionPlan, ExecuteOptions, Node, NoProgress, ResourceGraph};
//!
//! let graph = ResourceGraph::from_nodes([
//!     Node::new("Bucket", bucket),
//!     Node::new("Policy", policy).depends_on("Bucket"),
//! ])?;
//!
//! let plan = ExecutionPlan::new(graph)?;
//! let report = declarative::apply(&plan, &mut engine, &ExecuteOptions::default(), &mut NoProgress);
//! report.into_result()?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`ApplyEngine`]: Creates, inspects and destroys individual nodes
//! - [`ProgressCallback`]: Receives progress updates
//!
//! This allows the crate to be used without hard dependencies on a specific
//! provider API or UI framework.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod graph;
pub mod planner;
pub mod resolver;
pub mod resource;
pub mod retry;
pub mod types;

// Re-export main types at crate root
pub use context::{Applied, ApplyEngine, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, PlanAction, ResourceDiff, compute_diffs, compute_teardown_diffs};
pub use error::{ApplyError, ErrorCategory, GraphError, Operation, ProviderError};
pub use executor::{ExecuteReport, NodeOutcome, apply, destroy};
pub use graph::{LogicalId, Node, ResourceGraph};
pub use planner::ExecutionPlan;
pub use resolver::{resolve, teardown_order};
pub use resource::Resource;
pub use retry::{LogCallback, RetryCallback, with_retry};
pub use types::{
    AppliedSet, ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState, RetryConfig,
};
