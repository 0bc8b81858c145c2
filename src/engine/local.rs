//! Local state engine
//!
//! Provisions the stack against a TOML state file instead of a live
//! provider. Physical ids are derived from the stack coordinates so
//! reapplying the same configuration always hands out the same ids, and the
//! file is saved after every node so an interrupted run resumes cleanly.

use anyhow::{Context, Result};
use authgraph::{AuthResource, DeploymentContext};
use declarative::{
    Applied, AppliedSet, ApplyEngine, ApplyResult, LogicalId, Node, ProviderError, Resource,
    ResourceGraph, ResourceState,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::StackState;

const MIXED_ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const LOWER_ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Engine backed by `{state_dir}/{stack}.toml`
#[derive(Debug)]
pub struct LocalEngine {
    path: PathBuf,
    state: StackState,
}

impl LocalEngine {
    /// Open (or start) the state of a stack
    pub fn open(state_dir: &Path, stack: &str, context: &DeploymentContext) -> Result<Self> {
        let path = StackState::file_path(state_dir, stack)?;
        let state =
            StackState::load_or_new(&path, stack, context.account_id(), context.region())?;
        Ok(Self { path, state })
    }

    pub fn state(&self) -> &StackState {
        &self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded resources the graph no longer declares
    pub fn orphans(&self, graph: &ResourceGraph<AuthResource>) -> Vec<LogicalId> {
        self.state
            .resources
            .keys()
            .filter(|id| !graph.contains(id))
            .cloned()
            .collect()
    }

    /// Drop recorded resources the graph no longer declares
    pub fn prune(&mut self, graph: &ResourceGraph<AuthResource>) -> Result<Vec<LogicalId>> {
        let orphans = self.orphans(graph);
        if orphans.is_empty() {
            return Ok(orphans);
        }

        for id in &orphans {
            if let Some(record) = self.state.remove(id) {
                log::info!("Removed undeclared {} ({})", id, record.physical_id);
            }
        }
        self.state.touch(&self.path)?;
        Ok(orphans)
    }

    /// Delete the state file once nothing is recorded in it
    pub fn remove_if_empty(&self) -> Result<bool> {
        if !self.state.is_empty() || !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove state file: {}", self.path.display()))?;
        log::debug!("Removed empty state file {}", self.path.display());
        Ok(true)
    }

    fn persist(&mut self) -> Result<(), ProviderError> {
        self.state
            .touch(&self.path)
            .map_err(|e| ProviderError::Other(format!("failed to save state: {e:#}")))
    }

    fn physical_id(&self, node: &Node<AuthResource>) -> String {
        let seed = blake3::hash(
            format!(
                "{}/{}/{}/{}",
                self.state.account_id,
                self.state.region,
                self.state.stack,
                node.id()
            )
            .as_bytes(),
        );

        match node.resource() {
            AuthResource::UserPool(_) => {
                format!(
                    "{}_{}",
                    self.state.region,
                    encode(&seed, MIXED_ALPHANUMERIC, 9)
                )
            }
            AuthResource::UserPoolClient(_) => encode(&seed, LOWER_ALPHANUMERIC, 26),
            AuthResource::GoogleProvider(provider) => provider.kind.provider_name().to_string(),
            AuthResource::UserPoolDomain(domain) => domain.prefix.clone(),
            AuthResource::ManagedLoginBranding(_) => uuid_shaped(&seed),
            AuthResource::AdminUser(user) => user.username.clone(),
        }
    }
}

impl ApplyEngine<AuthResource> for LocalEngine {
    fn current_state(&self, node: &Node<AuthResource>) -> Result<ResourceState, ProviderError> {
        let record = match self.state.get(node.id()) {
            Some(record) => record,
            None => return Ok(ResourceState::Absent),
        };

        let desired = fingerprint(node.resource())?;
        if record.fingerprint == desired {
            Ok(ResourceState::in_sync())
        } else {
            Ok(ResourceState::Modified {
                from: short(&record.fingerprint).to_string(),
                to: short(&desired).to_string(),
            })
        }
    }

    fn apply(
        &mut self,
        node: &Node<AuthResource>,
        applied: &AppliedSet,
    ) -> Result<Applied, ProviderError> {
        if let Some(missing) = node.dependencies().iter().find(|dep| !applied.contains(dep)) {
            return Err(ProviderError::MissingDependency {
                dependency: missing.clone(),
            });
        }

        let id = node.id();
        let fingerprint = fingerprint(node.resource())?;
        let previous = self.state.get(id).cloned();
        let existing = previous
            .as_ref()
            .map(|record| (record.fingerprint.clone(), record.physical_id.clone()));

        let (result, physical_id) = match existing {
            None => {
                let physical_id = self.physical_id(node);
                self.state.record_created(
                    id,
                    node.resource().resource_type(),
                    &physical_id,
                    &fingerprint,
                );
                (ApplyResult::Created, physical_id)
            }
            Some((recorded, physical_id)) if recorded == fingerprint => {
                return Ok(Applied::new(ApplyResult::NoChange, physical_id));
            }
            Some(_) if matches!(node.resource(), AuthResource::UserPool(_)) => {
                return Err(ProviderError::Immutable { id: id.clone() });
            }
            Some((_, physical_id)) => {
                self.state.record_updated(id, &fingerprint);
                (ApplyResult::Modified, physical_id)
            }
        };

        if let Err(e) = self.persist() {
            self.state.restore(id, previous);
            return Err(e);
        }
        log::debug!("{:?} {} as {}", result, id, physical_id);
        Ok(Applied::new(result, physical_id))
    }

    fn destroy(&mut self, node: &Node<AuthResource>) -> Result<ApplyResult, ProviderError> {
        let Some(record) = self.state.remove(node.id()) else {
            return Ok(ApplyResult::NoChange);
        };

        if let Err(e) = self.persist() {
            self.state.restore(node.id(), Some(record));
            return Err(e);
        }
        log::debug!("Removed {} ({})", node.id(), record.physical_id);
        Ok(ApplyResult::Removed)
    }
}

/// BLAKE3 hash of a resource's declared parameters
fn fingerprint(resource: &AuthResource) -> Result<String, ProviderError> {
    let bytes = serde_json::to_vec(resource)
        .map_err(|e| ProviderError::Other(format!("failed to serialize resource: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn encode(seed: &blake3::Hash, alphabet: &[u8], len: usize) -> String {
    seed.as_bytes()
        .iter()
        .take(len)
        .map(|byte| char::from(alphabet[usize::from(*byte) % alphabet.len()]))
        .collect()
}

fn uuid_shaped(seed: &blake3::Hash) -> String {
    let hex = seed.to_hex();
    let hex = hex.as_str();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgraph::RawConfig;
    use authgraph::resources::{
        ADMIN_USER, IdentityDirectory, MANAGED_LOGIN_BRANDING, USER_POOL, USER_POOL_CLIENT,
        USER_POOL_DOMAIN,
    };
    use declarative::{ExecuteOptions, ExecutionPlan, NoProgress};
    use tempfile::TempDir;

    fn context() -> DeploymentContext {
        DeploymentContext::new("111111111111", "us-east-1").unwrap()
    }

    fn raw(admin: Option<&str>) -> RawConfig {
        RawConfig {
            stack_name_base: Some("demo".into()),
            admin_user_email: admin.map(str::to_string),
            ..Default::default()
        }
    }

    fn plan(raw: RawConfig, callbacks: &[String]) -> ExecutionPlan<AuthResource> {
        authgraph::plan(raw, &context(), Some(callbacks)).unwrap()
    }

    fn engine(dir: &TempDir) -> LocalEngine {
        LocalEngine::open(dir.path(), "demo", &context()).unwrap()
    }

    fn run(
        plan: &ExecutionPlan<AuthResource>,
        engine: &mut LocalEngine,
    ) -> declarative::ExecuteReport {
        declarative::apply(plan, engine, &ExecuteOptions::default(), &mut NoProgress)
    }

    fn id(s: &str) -> LogicalId {
        LogicalId::from(s)
    }

    #[test]
    fn test_apply_creates_and_persists() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(Some("a@b.com")), &[]);
        let mut engine = engine(&dir);

        let report = run(&plan, &mut engine);
        assert!(report.is_success());
        assert_eq!(report.summary.created, 5);
        assert!(engine.path().exists());

        let pool_id = report.applied.get(&id(USER_POOL)).unwrap();
        assert!(pool_id.starts_with("us-east-1_"));
        assert_eq!(pool_id.len(), "us-east-1_".len() + 9);

        let client_id = report.applied.get(&id(USER_POOL_CLIENT)).unwrap();
        assert_eq!(client_id.len(), 26);
        assert!(
            client_id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );

        assert_eq!(
            report.applied.get(&id(USER_POOL_DOMAIN)),
            Some("demo-111111111111-us-east-1")
        );
        assert_eq!(report.applied.get(&id(ADMIN_USER)), Some("a@b.com"));

        let branding = report.applied.get(&id(MANAGED_LOGIN_BRANDING)).unwrap();
        let groups: Vec<usize> = branding.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);

        let reopened = LocalEngine::open(dir.path(), "demo", &context()).unwrap();
        assert_eq!(reopened.state(), engine.state());
    }

    #[test]
    fn test_reapply_is_no_change_with_same_ids() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(Some("a@b.com")), &[]);

        let first = run(&plan, &mut engine(&dir));
        let second = run(&plan, &mut engine(&dir));

        assert!(second.is_success());
        assert_eq!(second.summary.no_change, 5);
        assert_eq!(second.summary.total_changes(), 0);
        assert_eq!(first.applied, second.applied);
    }

    #[test]
    fn test_changed_client_is_modified_in_place() {
        let dir = TempDir::new().unwrap();
        let first = run(&plan(raw(None), &[]), &mut engine(&dir));

        let callbacks = vec!["https://app.example.com".to_string()];
        let changed = plan(raw(None), &callbacks);
        let mut engine = engine(&dir);

        assert!(matches!(
            engine
                .current_state(changed.graph().get(&id(USER_POOL_CLIENT)).unwrap())
                .unwrap(),
            ResourceState::Modified { .. }
        ));

        let second = run(&changed, &mut engine);
        assert_eq!(second.outcome(&id(USER_POOL_CLIENT)), Some(&ApplyResult::Modified));
        assert_eq!(second.outcome(&id(USER_POOL)), Some(&ApplyResult::NoChange));
        assert_eq!(
            first.applied.get(&id(USER_POOL_CLIENT)),
            second.applied.get(&id(USER_POOL_CLIENT))
        );
    }

    #[test]
    fn test_user_pool_is_immutable() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(None), &[]);
        let mut engine = engine(&dir);
        let applied = run(&plan, &mut engine).applied;

        let renamed = Node::new(
            USER_POOL,
            AuthResource::UserPool(IdentityDirectory::for_stack("other")),
        );
        let err = engine.apply(&renamed, &applied).unwrap_err();

        assert_eq!(err, ProviderError::Immutable { id: id(USER_POOL) });
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_dependency_is_refused() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(None), &[]);
        let mut engine = engine(&dir);

        let client = plan.graph().get(&id(USER_POOL_CLIENT)).unwrap();
        let err = engine.apply(client, &AppliedSet::new()).unwrap_err();

        assert_eq!(
            err,
            ProviderError::MissingDependency {
                dependency: id(USER_POOL)
            }
        );
        assert!(engine.state().is_empty());
    }

    #[test]
    fn test_destroy_removes_everything() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(Some("a@b.com")), &[]);
        let mut engine = engine(&dir);
        run(&plan, &mut engine);

        let report = declarative::destroy(
            &plan,
            &mut engine,
            &ExecuteOptions::default(),
            &mut NoProgress,
        );

        assert!(report.is_success());
        assert_eq!(report.summary.removed, 5);
        assert_eq!(
            report.outcomes.first().map(|o| o.id.as_str()),
            Some(ADMIN_USER)
        );
        assert_eq!(report.outcomes.last().map(|o| o.id.as_str()), Some(USER_POOL));
        assert!(engine.state().is_empty());

        assert!(engine.remove_if_empty().unwrap());
        assert!(!engine.path().exists());
    }

    #[test]
    fn test_destroy_absent_is_no_change() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(None), &[]);
        let mut engine = engine(&dir);

        let pool = plan.graph().get(&id(USER_POOL)).unwrap();
        assert_eq!(engine.destroy(pool).unwrap(), ApplyResult::NoChange);
        assert!(!engine.remove_if_empty().unwrap());
    }

    #[test]
    fn test_failed_save_leaves_no_record() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(None), &[]);
        let mut engine = engine(&dir);
        let pool = plan.graph().get(&id(USER_POOL)).unwrap();

        // A directory where the state file belongs makes every save fail
        fs::create_dir_all(engine.path()).unwrap();

        let err = engine.apply(pool, &AppliedSet::new()).unwrap_err();
        assert!(matches!(err, ProviderError::Other(_)));
        assert!(engine.state().get(&id(USER_POOL)).is_none());
    }

    #[test]
    fn test_failed_save_keeps_destroyed_record() {
        let dir = TempDir::new().unwrap();
        let plan = plan(raw(None), &[]);
        let mut engine = engine(&dir);
        run(&plan, &mut engine);
        let before = engine.state().get(&id(USER_POOL)).cloned();

        fs::remove_file(engine.path()).unwrap();
        fs::create_dir_all(engine.path()).unwrap();

        let pool = plan.graph().get(&id(USER_POOL)).unwrap();
        assert!(engine.destroy(pool).is_err());
        assert_eq!(engine.state().get(&id(USER_POOL)).cloned(), before);
    }

    #[test]
    fn test_short_fingerprint_handles_any_text() {
        assert_eq!(short("0123456789abcdef"), "0123456789ab");
        assert_eq!(short("abc"), "abc");
        // Byte 12 falls inside a two-byte character
        assert_eq!(short("aéééééééé"), "aéééééééé");
    }

    #[test]
    fn test_orphans_are_pruned() {
        let dir = TempDir::new().unwrap();
        run(&plan(raw(Some("a@b.com")), &[]), &mut engine(&dir));

        let without_admin = plan(raw(None), &[]);
        let mut engine = engine(&dir);
        assert_eq!(engine.orphans(without_admin.graph()), vec![id(ADMIN_USER)]);

        let pruned = engine.prune(without_admin.graph()).unwrap();
        assert_eq!(pruned, vec![id(ADMIN_USER)]);
        assert!(engine.orphans(without_admin.graph()).is_empty());
        assert!(engine.state().get(&id(ADMIN_USER)).is_none());
    }
}
