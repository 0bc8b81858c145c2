//! Execution engine - applies a plan one node at a time in resolved order
//!
//! A node is only handed to the engine once every one of its dependencies
//! has been applied in this run. When a node fails, everything that depends
//! on it (directly or transitively) is skipped, while unrelated nodes keep
//! going. Nodes that were applied are never rolled back.

use crate::context::{ApplyEngine, ProgressCallback};
use crate::error::{ApplyError, Operation, ProviderError};
use crate::graph::{LogicalId, Node};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::retry::{LogCallback, with_retry};
use crate::types::{AppliedSet, ApplyResult, ExecuteOptions, ExecuteSummary};
use std::collections::HashSet;

/// Result of processing one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    pub id: LogicalId,
    pub result: ApplyResult,
}

/// Everything that happened during an apply or destroy run
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    /// Per-node outcomes, in the order nodes were processed
    pub outcomes: Vec<NodeOutcome>,
    /// Aggregate counts
    pub summary: ExecuteSummary,
    /// Physical ids of nodes applied in this run
    pub applied: AppliedSet,
    /// Engine failures, in the order they happened
    pub failures: Vec<ApplyError>,
}

impl ExecuteReport {
    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Outcome recorded for a node, if it was processed
    pub fn outcome(&self, id: &LogicalId) -> Option<&ApplyResult> {
        self.outcomes.iter().find(|o| &o.id == id).map(|o| &o.result)
    }

    /// Convert the first failure into an error
    pub fn into_result(mut self) -> Result<Self, ApplyError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(self.failures.remove(0))
        }
    }

    fn record(&mut self, id: LogicalId, result: ApplyResult) {
        self.summary.add_result(&result);
        self.outcomes.push(NodeOutcome { id, result });
    }
}

/// Apply every node of the plan in resolved order
///
/// # Arguments
/// * `plan` - The resolved plan to apply
/// * `engine` - Engine that performs the actual changes
/// * `opts` - Execution options (dry_run, retry policy)
/// * `progress` - Progress callback
pub fn apply<T, E, P>(
    plan: &ExecutionPlan<T>,
    engine: &mut E,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> ExecuteReport
where
    T: Resource,
    E: ApplyEngine<T>,
    P: ProgressCallback,
{
    let mut report = ExecuteReport::default();
    log::info!("Applying {} resources", plan.total_resources());

    for node in plan.nodes_in_order() {
        progress.on_resource_start(node.id(), &node.resource().description());

        let result = if opts.dry_run {
            ApplyResult::Skipped {
                reason: "Dry run".into(),
            }
        } else if let Some(missing) = first_unapplied_dependency(node, &report.applied) {
            log::warn!("Skipping {}: dependency {} was not applied", node.id(), missing);
            ApplyResult::Skipped {
                reason: format!("dependency {missing} was not applied"),
            }
        } else {
            let attempt = with_retry(&opts.retry, Some(&LogCallback(node.id())), || {
                engine.apply(node, &report.applied)
            });

            match attempt {
                Ok(applied) => {
                    log::debug!("{} -> {} ({:?})", node.id(), applied.physical_id, applied.result);
                    report
                        .applied
                        .insert(node.id().clone(), applied.physical_id);
                    applied.result
                }
                Err(source) => fail(&mut report, node, Operation::Apply, source),
            }
        };

        progress.on_resource_complete(node.id(), &result);
        report.record(node.id().clone(), result);
    }

    report
}

/// Destroy every node of the plan in reverse resolved order
///
/// A node is skipped if any node depending on it could not be destroyed,
/// so a resource is never removed while something still references it.
pub fn destroy<T, E, P>(
    plan: &ExecutionPlan<T>,
    engine: &mut E,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> ExecuteReport
where
    T: Resource,
    E: ApplyEngine<T>,
    P: ProgressCallback,
{
    let mut report = ExecuteReport::default();
    let mut blocked: HashSet<LogicalId> = HashSet::new();
    log::info!("Destroying {} resources", plan.total_resources());

    for node in plan.nodes_in_teardown_order() {
        progress.on_resource_start(node.id(), &node.resource().description());

        let blocker = plan
            .graph()
            .dependents(node.id())
            .find(|dependent| blocked.contains(dependent.id()))
            .map(|dependent| dependent.id().clone());

        let result = if opts.dry_run {
            ApplyResult::Skipped {
                reason: "Dry run".into(),
            }
        } else if let Some(dependent) = blocker {
            log::warn!("Keeping {}: dependent {} still exists", node.id(), dependent);
            blocked.insert(node.id().clone());
            ApplyResult::Skipped {
                reason: format!("dependent {dependent} was not destroyed"),
            }
        } else {
            let attempt = with_retry(&opts.retry, Some(&LogCallback(node.id())), || {
                engine.destroy(node)
            });

            match attempt {
                Ok(result) => result,
                Err(source) => {
                    blocked.insert(node.id().clone());
                    fail(&mut report, node, Operation::Destroy, source)
                }
            }
        };

        progress.on_resource_complete(node.id(), &result);
        report.record(node.id().clone(), result);
    }

    report
}

fn first_unapplied_dependency<'a, T>(
    node: &'a Node<T>,
    applied: &AppliedSet,
) -> Option<&'a LogicalId> {
    node.dependencies().iter().find(|dep| !applied.contains(dep))
}

fn fail<T>(
    report: &mut ExecuteReport,
    node: &Node<T>,
    operation: Operation,
    source: ProviderError,
) -> ApplyResult {
    log::error!("Failed to {} {}: {}", operation, node.id(), source);
    let error = source.to_string();
    report.failures.push(ApplyError {
        node_id: node.id().clone(),
        operation,
        source,
    });
    ApplyResult::Failed { error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Applied, NoProgress};
    use crate::graph::ResourceGraph;
    use crate::types::{ResourceState, RetryConfig};
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    #[derive(Debug)]
    struct TestResource;

    impl Resource for TestResource {
        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn description(&self) -> String {
            "Test resource".into()
        }
    }

    /// In-memory engine with scripted failures
    #[derive(Default)]
    struct MockEngine {
        existing: HashMap<LogicalId, String>,
        failures: HashMap<LogicalId, VecDeque<ProviderError>>,
        calls: Vec<LogicalId>,
    }

    impl MockEngine {
        fn fail_with(mut self, id: &str, errors: Vec<ProviderError>) -> Self {
            self.failures.insert(LogicalId::from(id), errors.into());
            self
        }

        fn next_failure(&mut self, id: &LogicalId) -> Option<ProviderError> {
            self.failures.get_mut(id).and_then(VecDeque::pop_front)
        }
    }

    impl ApplyEngine<TestResource> for MockEngine {
        fn current_state(
            &self,
            node: &Node<TestResource>,
        ) -> Result<ResourceState, ProviderError> {
            if self.existing.contains_key(node.id()) {
                Ok(ResourceState::in_sync())
            } else {
                Ok(ResourceState::Absent)
            }
        }

        fn apply(
            &mut self,
            node: &Node<TestResource>,
            applied: &AppliedSet,
        ) -> Result<Applied, ProviderError> {
            self.calls.push(node.id().clone());
            for dep in node.dependencies() {
                if !applied.contains(dep) {
                    return Err(ProviderError::MissingDependency {
                        dependency: dep.clone(),
                    });
                }
            }
            if let Some(err) = self.next_failure(node.id()) {
                return Err(err);
            }
            let physical = format!("phys-{}", node.id());
            let result = if self.existing.contains_key(node.id()) {
                ApplyResult::NoChange
            } else {
                ApplyResult::Created
            };
            self.existing.insert(node.id().clone(), physical.clone());
            Ok(Applied::new(result, physical))
        }

        fn destroy(&mut self, node: &Node<TestResource>) -> Result<ApplyResult, ProviderError> {
            self.calls.push(node.id().clone());
            if let Some(err) = self.next_failure(node.id()) {
                return Err(err);
            }
            match self.existing.remove(node.id()) {
                Some(_) => Ok(ApplyResult::Removed),
                None => Ok(ApplyResult::NoChange),
            }
        }
    }

    fn plan() -> ExecutionPlan<TestResource> {
        let graph = ResourceGraph::from_nodes([
            Node::new("pool", TestResource),
            Node::new("client", TestResource).depends_on("pool"),
            Node::new("domain", TestResource).depends_on("pool"),
            Node::new("branding", TestResource)
                .depends_on("domain")
                .depends_on("client"),
            Node::new("admin", TestResource).depends_on("pool"),
        ])
        .unwrap();
        ExecutionPlan::new(graph).unwrap()
    }

    fn opts() -> ExecuteOptions {
        ExecuteOptions {
            retry: RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                backoff_factor: 1.0,
                max_delay: Duration::from_millis(5),
            },
            ..Default::default()
        }
    }

    fn ids(calls: &[LogicalId]) -> Vec<&str> {
        calls.iter().map(LogicalId::as_str).collect()
    }

    #[test]
    fn test_apply_in_resolved_order() {
        let plan = plan();
        let mut engine = MockEngine::default();

        let report = apply(&plan, &mut engine, &opts(), &mut NoProgress);

        assert!(report.is_success());
        assert_eq!(report.summary.created, 5);
        assert_eq!(
            ids(&engine.calls),
            vec!["pool", "client", "domain", "branding", "admin"]
        );
        assert_eq!(report.applied.get(&LogicalId::from("pool")), Some("phys-pool"));
    }

    #[test]
    fn test_reapply_is_no_change() {
        let plan = plan();
        let mut engine = MockEngine::default();

        apply(&plan, &mut engine, &opts(), &mut NoProgress);
        let report = apply(&plan, &mut engine, &opts(), &mut NoProgress);

        assert_eq!(report.summary.no_change, 5);
        assert_eq!(report.summary.total_changes(), 0);
    }

    #[test]
    fn test_failure_halts_dependents_only() {
        let plan = plan();
        let mut engine = MockEngine::default().fail_with(
            "client",
            vec![ProviderError::Conflict {
                message: "name taken".into(),
            }],
        );

        let report = apply(&plan, &mut engine, &opts(), &mut NoProgress);

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node_id, LogicalId::from("client"));
        assert!(matches!(
            report.outcome(&LogicalId::from("branding")),
            Some(ApplyResult::Skipped { .. })
        ));
        // Independent nodes still apply and earlier nodes stay in place
        assert_eq!(
            report.outcome(&LogicalId::from("admin")),
            Some(&ApplyResult::Created)
        );
        assert!(engine.existing.contains_key(&LogicalId::from("pool")));
        // The engine never saw the blocked node
        assert!(!engine.calls.contains(&LogicalId::from("branding")));
    }

    #[test]
    fn test_transient_failure_is_retried() {
        let plan = plan();
        let transient = ProviderError::Transient {
            message: "throttled".into(),
        };
        let mut engine =
            MockEngine::default().fail_with("domain", vec![transient.clone(), transient]);

        let report = apply(&plan, &mut engine, &opts(), &mut NoProgress);

        assert!(report.is_success());
        let domain_calls = engine
            .calls
            .iter()
            .filter(|c| c.as_str() == "domain")
            .count();
        assert_eq!(domain_calls, 3);
    }

    #[test]
    fn test_into_result_returns_first_failure() {
        let plan = plan();
        let mut engine =
            MockEngine::default().fail_with("pool", vec![ProviderError::Other("denied".into())]);

        let err = apply(&plan, &mut engine, &opts(), &mut NoProgress)
            .into_result()
            .unwrap_err();

        assert_eq!(err.node_id, LogicalId::from("pool"));
        assert_eq!(err.operation, Operation::Apply);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let plan = plan();
        let mut engine = MockEngine::default();
        let opts = ExecuteOptions {
            dry_run: true,
            ..opts()
        };

        let report = apply(&plan, &mut engine, &opts, &mut NoProgress);

        assert!(engine.calls.is_empty());
        assert_eq!(report.summary.skipped, 5);
    }

    #[test]
    fn test_destroy_in_reverse_order() {
        let plan = plan();
        let mut engine = MockEngine::default();
        apply(&plan, &mut engine, &opts(), &mut NoProgress);
        engine.calls.clear();

        let report = destroy(&plan, &mut engine, &opts(), &mut NoProgress);

        assert!(report.is_success());
        assert_eq!(report.summary.removed, 5);
        assert_eq!(
            ids(&engine.calls),
            vec!["admin", "branding", "domain", "client", "pool"]
        );
    }

    #[test]
    fn test_destroy_keeps_prerequisites_of_failed_node() {
        let plan = plan();
        let mut engine = MockEngine::default();
        apply(&plan, &mut engine, &opts(), &mut NoProgress);
        let mut engine = engine.fail_with("client", vec![ProviderError::Other("in use".into())]);
        engine.calls.clear();

        let report = destroy(&plan, &mut engine, &opts(), &mut NoProgress);

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.outcome(&LogicalId::from("pool")),
            Some(ApplyResult::Skipped { .. })
        ));
        assert!(engine.existing.contains_key(&LogicalId::from("pool")));
        assert!(!engine.existing.contains_key(&LogicalId::from("domain")));
    }
}
