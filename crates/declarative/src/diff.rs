//! Diff computation for planned nodes

use crate::context::ApplyEngine;
use crate::error::{ApplyError, Operation};
use crate::graph::{LogicalId, Node};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::ResourceState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the executor will do with a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanAction {
    Create,
    Update,
    Delete,
    NoChange,
}

impl PlanAction {
    /// Single-character marker used in plan listings
    pub fn symbol(&self) -> char {
        match self {
            Self::Create => '+',
            Self::Update => '~',
            Self::Delete => '-',
            Self::NoChange => '=',
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::NoChange => write!(f, "no change"),
        }
    }
}

/// A diff between current and desired state of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Logical id of the node
    pub resource_id: LogicalId,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    fn new<T: Resource>(node: &Node<T>, current: ResourceState, desired: ResourceState) -> Self {
        Self {
            resource_id: node.id().clone(),
            resource_type: node.resource().resource_type().to_string(),
            description: node.resource().description(),
            current,
            desired,
        }
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Present { .. } | ResourceState::Modified { .. }, ResourceState::Absent)
        )
    }

    /// Check if this diff represents a modification
    pub fn is_modification(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Modified { .. }, ResourceState::Present { .. })
        )
    }

    /// The action the executor will take for this node
    pub fn action(&self) -> PlanAction {
        if self.is_addition() {
            PlanAction::Create
        } else if self.is_removal() {
            PlanAction::Delete
        } else if self.is_modification() || self.current != self.desired {
            PlanAction::Update
        } else {
            PlanAction::NoChange
        }
    }
}

/// Compute the apply diff of every node, in application order
///
/// Nodes that are already in sync are included with [`PlanAction::NoChange`]
/// so callers can render the complete ordered plan.
pub fn compute_diffs<T, E>(
    plan: &ExecutionPlan<T>,
    engine: &E,
) -> Result<Vec<ResourceDiff>, ApplyError>
where
    T: Resource,
    E: ApplyEngine<T>,
{
    plan.nodes_in_order()
        .map(|node| {
            let current = current_state(engine, node, Operation::Apply)?;
            Ok(ResourceDiff::new(node, current, ResourceState::in_sync()))
        })
        .collect()
}

/// Compute the teardown diff of every node that still exists, in destruction order
pub fn compute_teardown_diffs<T, E>(
    plan: &ExecutionPlan<T>,
    engine: &E,
) -> Result<Vec<ResourceDiff>, ApplyError>
where
    T: Resource,
    E: ApplyEngine<T>,
{
    let mut diffs = Vec::new();
    for node in plan.nodes_in_teardown_order() {
        let current = current_state(engine, node, Operation::Destroy)?;
        if !current.is_absent() {
            diffs.push(ResourceDiff::new(node, current, ResourceState::Absent));
        }
    }
    Ok(diffs)
}

fn current_state<T, E: ApplyEngine<T>>(
    engine: &E,
    node: &Node<T>,
    operation: Operation,
) -> Result<ResourceState, ApplyError> {
    engine.current_state(node).map_err(|source| ApplyError {
        node_id: node.id().clone(),
        operation,
        source,
    })
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
    /// Number of resources to modify
    pub modifications: usize,
    /// Number of resources already in sync
    pub unchanged: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action() {
                PlanAction::Create => summary.additions += 1,
                PlanAction::Delete => summary.removals += 1,
                PlanAction::Update => summary.modifications += 1,
                PlanAction::NoChange => summary.unchanged += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
