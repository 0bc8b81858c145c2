//! Apply engine and progress traits
//!
//! These traits allow the declarative crate to be used without depending
//! on a specific provider API or terminal UI.

use crate::error::ProviderError;
use crate::graph::{LogicalId, Node};
use crate::types::{AppliedSet, ApplyResult, ResourceState};

/// Outcome of a successful engine apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// What the engine did
    pub result: ApplyResult,
    /// Identifier of the resource in the target system
    pub physical_id: String,
}

impl Applied {
    pub fn new(result: ApplyResult, physical_id: impl Into<String>) -> Self {
        Self {
            result,
            physical_id: physical_id.into(),
        }
    }
}

/// The external system that creates, inspects and destroys resources.
///
/// Implementations must be idempotent per node: applying a node whose
/// resource already exists with identical parameters returns
/// [`ApplyResult::NoChange`] and the existing physical id.
pub trait ApplyEngine<T> {
    /// Detect the state of a node's resource relative to its declaration
    ///
    /// Returns [`ResourceState::Absent`] if it does not exist,
    /// [`ResourceState::Modified`] if it exists with different parameters
    /// and [`ResourceState::in_sync`] otherwise.
    fn current_state(&self, node: &Node<T>) -> Result<ResourceState, ProviderError>;

    /// Create or update a node's resource
    ///
    /// `applied` holds the physical ids of every dependency of `node`.
    fn apply(&mut self, node: &Node<T>, applied: &AppliedSet) -> Result<Applied, ProviderError>;

    /// Delete a node's resource
    fn destroy(&mut self, node: &Node<T>) -> Result<ApplyResult, ProviderError>;
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called when starting to process a single node
    fn on_resource_start(&mut self, id: &LogicalId, description: &str);

    /// Called when a node completes, fails or is skipped
    fn on_resource_complete(&mut self, id: &LogicalId, result: &ApplyResult);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_resource_start(&mut self, _id: &LogicalId, _description: &str) {}
    fn on_resource_complete(&mut self, _id: &LogicalId, _result: &ApplyResult) {}
}
