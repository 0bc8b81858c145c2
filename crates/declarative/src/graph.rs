//! Resource graph - typed nodes with explicit dependency edges
//!
//! Nodes keep the order in which they were inserted. The resolver relies on
//! that order to break ties, so two graphs built from the same input always
//! resolve to the same sequence.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Stable logical identifier of a node within a graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LogicalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single resource declaration plus the ids it must be applied after
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node<T> {
    id: LogicalId,
    depends_on: Vec<LogicalId>,
    resource: T,
}

impl<T> Node<T> {
    /// Create a node with no dependencies
    pub fn new(id: impl Into<LogicalId>, resource: T) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            resource,
        }
    }

    /// Declare a dependency edge. Repeated edges are collapsed.
    pub fn depends_on(mut self, dependency: impl Into<LogicalId>) -> Self {
        let dependency = dependency.into();
        if !self.depends_on.contains(&dependency) {
            self.depends_on.push(dependency);
        }
        self
    }

    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    pub fn dependencies(&self) -> &[LogicalId] {
        &self.depends_on
    }

    pub fn resource(&self) -> &T {
        &self.resource
    }

    /// Whether this node declares an edge to `id`
    pub fn has_dependency(&self, id: &LogicalId) -> bool {
        self.depends_on.contains(id)
    }
}

/// An insertion-ordered set of nodes
///
/// Once constructed the graph is not mutated; it is consumed by the resolver
/// and the executor as an immutable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGraph<T> {
    nodes: Vec<Node<T>>,
}

impl<T> ResourceGraph<T> {
    /// Build a graph from nodes in insertion order
    ///
    /// Fails if two nodes share a logical id. Dangling edges are reported by
    /// the resolver, which sees the whole graph at once.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node<T>>) -> Result<Self, GraphError> {
        let nodes: Vec<Node<T>> = nodes.into_iter().collect();

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id()) {
                return Err(GraphError::DuplicateNode(node.id().clone()));
            }
        }

        Ok(Self { nodes })
    }

    /// Look up a node by logical id
    pub fn get(&self, id: &LogicalId) -> Option<&Node<T>> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.get(id).is_some()
    }

    /// Insertion index of a node
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    /// Logical ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &LogicalId> {
        self.nodes.iter().map(Node::id)
    }

    /// Nodes that declare a direct edge to `id`
    pub fn dependents<'a>(&'a self, id: &'a LogicalId) -> impl Iterator<Item = &'a Node<T>> + 'a {
        self.nodes.iter().filter(move |n| n.has_dependency(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T> Default for ResourceGraph<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}
