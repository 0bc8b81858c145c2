use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{AppliedSet, LogicalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

/// Everything recorded about one provisioned stack
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StackState {
    /// Naming prefix the stack was applied with
    pub stack: String,

    /// Account the stack lives in
    pub account_id: String,

    /// Region the stack lives in
    pub region: String,

    /// Provisioned resources keyed by logical id
    #[serde(default)]
    pub resources: BTreeMap<LogicalId, ResourceRecord>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

/// A single provisioned resource
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub resource_type: String,

    /// Identifier handed out when the resource was created
    pub physical_id: String,

    /// BLAKE3 hash of the declared parameters
    pub fingerprint: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// StackState Implementation
// ============================================================================

impl StackState {
    pub fn new(stack: &str, account_id: &str, region: &str) -> Self {
        Self {
            stack: stack.to_string(),
            account_id: account_id.to_string(),
            region: region.to_string(),
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// State file for a stack inside `state_dir`
    ///
    /// Refuses names that would resolve outside `state_dir`.
    pub fn file_path(state_dir: &Path, stack: &str) -> Result<PathBuf> {
        if stack.is_empty() || stack.contains(['/', '\\']) || stack.contains("..") {
            anyhow::bail!("Stack name '{stack}' cannot be used as a state file name");
        }
        Ok(state_dir.join(format!("{stack}.toml")))
    }

    /// Load state from disk, or return a fresh state if the file doesn't exist
    pub fn load_or_new(path: &Path, stack: &str, account_id: &str, region: &str) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::new(stack, account_id, region));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: StackState = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if state.account_id != account_id || state.region != region {
            anyhow::bail!(
                "State file {} belongs to {}/{}, not {}/{}",
                path.display(),
                state.account_id,
                state.region,
                account_id,
                region
            );
        }

        log::debug!(
            "Loaded state from {} ({} resources)",
            path.display(),
            state.resources.len()
        );
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    // ========================================================================
    // Resource Helpers
    // ========================================================================

    pub fn get(&self, id: &LogicalId) -> Option<&ResourceRecord> {
        self.resources.get(id)
    }

    /// Record a newly created resource
    pub fn record_created(
        &mut self,
        id: &LogicalId,
        resource_type: &str,
        physical_id: &str,
        fingerprint: &str,
    ) {
        let now = Utc::now();
        self.resources.insert(
            id.clone(),
            ResourceRecord {
                resource_type: resource_type.to_string(),
                physical_id: physical_id.to_string(),
                fingerprint: fingerprint.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    /// Put back a record exactly as it was before a failed save
    pub fn restore(&mut self, id: &LogicalId, previous: Option<ResourceRecord>) {
        match previous {
            Some(record) => {
                self.resources.insert(id.clone(), record);
            }
            None => {
                self.resources.remove(id);
            }
        }
    }

    /// Record new parameters for an existing resource
    pub fn record_updated(&mut self, id: &LogicalId, fingerprint: &str) {
        if let Some(record) = self.resources.get_mut(id) {
            record.fingerprint = fingerprint.to_string();
            record.updated_at = Utc::now();
        }
    }

    pub fn remove(&mut self, id: &LogicalId) -> Option<ResourceRecord> {
        self.resources.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Physical ids of every recorded resource
    pub fn applied_set(&self) -> AppliedSet {
        self.resources
            .iter()
            .map(|(id, record)| (id.clone(), record.physical_id.clone()))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
