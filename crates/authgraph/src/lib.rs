//! # Authgraph
//!
//! Describes the authentication backbone of an application as a resource
//! graph: a user pool, an OAuth client, an optional Google federation link,
//! a hosted login domain with branding, and an optional bootstrap admin.
//!
//! ## Pipeline
//!
//! 1. [`RawConfig::validate`] checks the configuration
//! 2. [`build_graph`] turns it into typed nodes with explicit edges
//! 3. [`declarative::ExecutionPlan`] resolves the application order
//! 4. An external [`declarative::ApplyEngine`] applies the nodes
//! 5. [`export`] collects the identifiers downstream stacks consume
//!
//! ```ignore
//! let context = DeploymentContext::new("111111111111", "us-east-1")?;
//! let plan = authgraph::plan(raw_config, &context, None)?;
//! let report = declarative::apply(&plan, &mut engine, &Default::default(), &mut NoProgress);
//! let outputs = authgraph::export(plan.graph(), &report.applied)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod exporter;
pub mod resources;

pub use builder::{DEFAULT_CALLBACK_URLS, build_graph, domain_prefix, effective_callback_urls};
pub use config::{DeploymentContext, GoogleOAuth, RawConfig, RawGoogleOAuth, ValidatedConfig};
pub use error::{ConfigError, Error, ExportError, Result};
pub use exporter::{DomainOutput, StackOutputs, admin_confirmation, export};
pub use resources::AuthResource;

use declarative::ExecutionPlan;

/// Validate, build and resolve in one step
///
/// Fails fast on invalid configuration before any node is built. A
/// non-empty `callback_override` is held to the same rules as `callbackUrls`.
pub fn plan(
    raw: RawConfig,
    context: &DeploymentContext,
    callback_override: Option<&[String]>,
) -> Result<ExecutionPlan<AuthResource>> {
    let config = raw.validate()?;
    let callback_override = match callback_override {
        Some(urls) if !urls.is_empty() => {
            Some(crate::config::validate_callback_urls(urls.to_vec())?)
        }
        _ => None,
    };
    let graph = build_graph(&config, context, callback_override.as_deref())?;
    let plan = ExecutionPlan::new(graph)?;
    log::info!(
        "Planned {} resources for stack '{}'",
        plan.total_resources(),
        config.stack_name_base()
    );
    Ok(plan)
}
