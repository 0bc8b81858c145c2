//! Output exporter - the stable contract consumed by downstream stacks

use crate::error::ExportError;
use crate::resources::{ADMIN_USER, AuthResource, USER_POOL, USER_POOL_CLIENT, USER_POOL_DOMAIN};
use declarative::{AppliedSet, LogicalId, ResourceGraph};
use serde::{Deserialize, Serialize};

/// Identifiers exported once provisioning completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutputs {
    #[serde(rename = "userPoolId")]
    pub user_pool_id: String,

    #[serde(rename = "userPoolClientId")]
    pub user_pool_client_id: String,

    #[serde(rename = "userPoolDomain")]
    pub user_pool_domain: DomainOutput,

    /// Present only when an admin user was applied
    #[serde(
        rename = "AdminUserCreated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_user_created: Option<String>,
}

/// Hosted login domain: prefix plus fully qualified name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOutput {
    #[serde(rename = "domainPrefix")]
    pub prefix: String,
    #[serde(rename = "domainName")]
    pub domain_name: String,
}

/// Confirmation line reported for the bootstrap administrator
pub fn admin_confirmation(email: &str) -> String {
    format!("Admin user created: {email}")
}

/// Collect exported values from the applied nodes of a graph
pub fn export(
    graph: &ResourceGraph<AuthResource>,
    applied: &AppliedSet,
) -> Result<StackOutputs, ExportError> {
    let required = |id: &str| {
        let id = LogicalId::from(id);
        applied
            .get(&id)
            .map(str::to_string)
            .ok_or(ExportError::MissingOutput(id))
    };

    let user_pool_id = required(USER_POOL)?;
    let user_pool_client_id = required(USER_POOL_CLIENT)?;
    let prefix = required(USER_POOL_DOMAIN)?;

    let domain_name = match graph.get(&LogicalId::from(USER_POOL_DOMAIN)).map(|n| n.resource()) {
        Some(AuthResource::UserPoolDomain(domain)) => domain.domain_name(),
        _ => return Err(ExportError::MissingOutput(LogicalId::from(USER_POOL_DOMAIN))),
    };

    let admin_id = LogicalId::from(ADMIN_USER);
    let admin_user_created = match graph.get(&admin_id).map(|n| n.resource()) {
        Some(AuthResource::AdminUser(user)) if applied.contains(&admin_id) => {
            Some(admin_confirmation(&user.email))
        }
        _ => None,
    };

    Ok(StackOutputs {
        user_pool_id,
        user_pool_client_id,
        user_pool_domain: DomainOutput {
            prefix,
            domain_name,
        },
        admin_user_created,
    })
}
