//! Dependency resolver - deterministic topological ordering
//!
//! Kahn's algorithm over the graph's insertion order. Among the nodes whose
//! dependencies are all resolved, the one inserted first is emitted next, so
//! the same graph always yields the same order.

use crate::error::GraphError;
use crate::graph::{LogicalId, ResourceGraph};
use std::collections::{BTreeSet, HashMap};

/// Compute the application order of a graph.
///
/// Every node appears after all of the nodes it depends on.
pub fn resolve<T>(graph: &ResourceGraph<T>) -> Result<Vec<LogicalId>, GraphError> {
    let nodes = graph.nodes();
    let index: HashMap<&LogicalId, usize> =
        nodes.iter().enumerate().map(|(i, n)| (n.id(), i)).collect();

    let mut pending = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        for dependency in node.dependencies() {
            let Some(&d) = index.get(dependency) else {
                return Err(GraphError::UnknownDependency {
                    node: node.id().clone(),
                    dependency: dependency.clone(),
                });
            };
            pending[i] += 1;
            dependents[d].push(i);
        }
    }

    // Ordered by insertion index
    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_first() {
        order.push(nodes[i].id().clone());
        for &j in &dependents[i] {
            pending[j] -= 1;
            if pending[j] == 0 {
                ready.insert(j);
            }
        }
    }

    if order.len() != nodes.len() {
        let unresolved: Vec<LogicalId> = nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| pending[*i] > 0)
            .map(|(_, n)| n.id().clone())
            .collect();
        log::error!("Resource graph contains a cycle: {:?}", unresolved);
        return Err(GraphError::Cycle { nodes: unresolved });
    }

    log::debug!("Resolved order: {:?}", order);
    Ok(order)
}

/// Order in which nodes must be destroyed: the exact reverse of `order`
pub fn teardown_order(order: &[LogicalId]) -> Vec<LogicalId> {
    order.iter().rev().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn ids(order: &[LogicalId]) -> Vec<&str> {
        order.iter().map(LogicalId::as_str).collect()
    }

    #[test]
    fn test_resolve_respects_dependencies() {
        let graph = ResourceGraph::from_nodes([
            Node::new("branding", ()).depends_on("domain").depends_on("client"),
            Node::new("client", ()).depends_on("pool"),
            Node::new("domain", ()).depends_on("pool"),
            Node::new("pool", ()),
        ])
        .unwrap();

        let order = resolve(&graph).unwrap();
        assert_eq!(ids(&order), vec!["pool", "client", "domain", "branding"]);
    }

    #[test]
    fn test_resolve_ties_follow_insertion_order() {
        let graph = ResourceGraph::from_nodes([
            Node::new("pool", ()),
            Node::new("user", ()).depends_on("pool"),
            Node::new("client", ()).depends_on("pool"),
            Node::new("domain", ()).depends_on("pool"),
        ])
        .unwrap();

        let order = resolve(&graph).unwrap();
        assert_eq!(ids(&order), vec!["pool", "user", "client", "domain"]);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let build = || {
            ResourceGraph::from_nodes([
                Node::new("c", ()).depends_on("a"),
                Node::new("a", ()),
                Node::new("b", ()),
                Node::new("d", ()).depends_on("b").depends_on("c"),
            ])
            .unwrap()
        };

        assert_eq!(resolve(&build()).unwrap(), resolve(&build()).unwrap());
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let graph = ResourceGraph::from_nodes([
            Node::new("root", ()),
            Node::new("a", ()).depends_on("b"),
            Node::new("b", ()).depends_on("a"),
        ])
        .unwrap();

        let err = resolve(&graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                nodes: vec![LogicalId::from("a"), LogicalId::from("b")]
            }
        );
    }

    #[test]
    fn test_resolve_detects_self_dependency() {
        let graph = ResourceGraph::from_nodes([Node::new("a", ()).depends_on("a")]).unwrap();
        assert!(matches!(resolve(&graph), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn test_resolve_rejects_unknown_dependency() {
        let graph =
            ResourceGraph::from_nodes([Node::new("client", ()).depends_on("GoogleProvider")])
                .unwrap();

        let err = resolve(&graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownDependency {
                node: LogicalId::from("client"),
                dependency: LogicalId::from("GoogleProvider"),
            }
        );
    }

    #[test]
    fn test_resolve_empty_graph() {
        let graph: ResourceGraph<()> = ResourceGraph::default();
        assert!(resolve(&graph).unwrap().is_empty());
    }

    #[test]
    fn test_teardown_order_is_reverse() {
        let order = vec![
            LogicalId::from("pool"),
            LogicalId::from("client"),
            LogicalId::from("branding"),
        ];
        assert_eq!(
            ids(&teardown_order(&order)),
            vec!["branding", "client", "pool"]
        );
    }
}
