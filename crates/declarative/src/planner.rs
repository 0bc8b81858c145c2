//! Execution planner - pairs a graph with its resolved order

use crate::error::GraphError;
use crate::graph::{LogicalId, Node, ResourceGraph};
use crate::resolver::{resolve, teardown_order};

/// A resource graph together with the order its nodes must be applied in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan<T> {
    graph: ResourceGraph<T>,
    order: Vec<LogicalId>,
}

impl<T> ExecutionPlan<T> {
    /// Resolve the graph into a plan
    ///
    /// Fails if the graph has a cycle or a dangling edge.
    pub fn new(graph: ResourceGraph<T>) -> Result<Self, GraphError> {
        let order = resolve(&graph)?;
        Ok(Self { graph, order })
    }

    pub fn graph(&self) -> &ResourceGraph<T> {
        &self.graph
    }

    /// Logical ids in application order
    pub fn order(&self) -> &[LogicalId] {
        &self.order
    }

    /// Logical ids in destruction order
    pub fn teardown_order(&self) -> Vec<LogicalId> {
        teardown_order(&self.order)
    }

    /// Nodes in application order
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &Node<T>> {
        self.order.iter().filter_map(|id| self.graph.get(id))
    }

    /// Nodes in destruction order
    pub fn nodes_in_teardown_order(&self) -> impl Iterator<Item = &Node<T>> {
        self.order.iter().rev().filter_map(|id| self.graph.get(id))
    }

    /// Position of a node in the application order
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.order.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_orders_nodes() {
        let graph = ResourceGraph::from_nodes([
            Node::new("client", "c").depends_on("pool"),
            Node::new("pool", "p"),
        ])
        .unwrap();

        let plan = ExecutionPlan::new(graph).unwrap();
        let resources: Vec<&str> = plan.nodes_in_order().map(|n| *n.resource()).collect();
        assert_eq!(resources, vec!["p", "c"]);

        let teardown: Vec<&str> = plan
            .nodes_in_teardown_order()
            .map(|n| *n.resource())
            .collect();
        assert_eq!(teardown, vec!["c", "p"]);
        assert_eq!(plan.position(&LogicalId::from("client")), Some(1));
    }

    #[test]
    fn test_plan_rejects_cycle() {
        let graph = ResourceGraph::from_nodes([
            Node::new("a", ()).depends_on("b"),
            Node::new("b", ()).depends_on("a"),
        ])
        .unwrap();

        assert!(ExecutionPlan::new(graph).is_err());
    }
}
