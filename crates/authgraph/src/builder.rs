//! Resource graph builder
//!
//! A pure function from validated configuration and deployment context to a
//! resource graph. Optional resources are decided up front as `Option`s; the
//! edges of every node are fixed when the node is created.

use crate::config::{DeploymentContext, ValidatedConfig};
use crate::resources::{
    ADMIN_USER, AdminUser, AuthResource, Branding, Domain, FederatedProvider, GOOGLE_PROVIDER,
    IdentityDirectory, MANAGED_LOGIN_BRANDING, ManagedLoginVersion, OAuthClient, USER_POOL,
    USER_POOL_CLIENT, USER_POOL_DOMAIN,
};
use declarative::{GraphError, Node, ResourceGraph};

/// Callback/logout URLs used when none are configured
pub const DEFAULT_CALLBACK_URLS: [&str; 2] = ["http://localhost:3000", "https://localhost:3000"];

/// Pick the callback URLs for the OAuth client
///
/// A non-empty override wins, then the configured list, then the local
/// development defaults.
pub fn effective_callback_urls(
    config: &ValidatedConfig,
    callback_override: Option<&[String]>,
) -> Vec<String> {
    callback_override
        .filter(|urls| !urls.is_empty())
        .or_else(|| config.callback_urls())
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| DEFAULT_CALLBACK_URLS.iter().map(ToString::to_string).collect())
}

/// `lowercase(stack_name_base)-account-region`
pub fn domain_prefix(stack_name_base: &str, context: &DeploymentContext) -> String {
    format!(
        "{}-{}-{}",
        stack_name_base.to_lowercase(),
        context.account_id(),
        context.region()
    )
}

/// Build the resource graph for a stack
///
/// Calling this twice with the same input yields equal graphs.
pub fn build_graph(
    config: &ValidatedConfig,
    context: &DeploymentContext,
    callback_override: Option<&[String]>,
) -> Result<ResourceGraph<AuthResource>, GraphError> {
    let stack = config.stack_name_base();

    let user_pool = Node::new(
        USER_POOL,
        AuthResource::UserPool(IdentityDirectory::for_stack(stack)),
    );

    let google_provider = config.google_oauth().map(|google| {
        Node::new(
            GOOGLE_PROVIDER,
            AuthResource::GoogleProvider(FederatedProvider::google(
                &google.client_id,
                &google.client_secret,
            )),
        )
        .depends_on(USER_POOL)
    });

    let client = OAuthClient::new(
        stack,
        google_provider.is_some(),
        effective_callback_urls(config, callback_override),
    );
    let mut client_node =
        Node::new(USER_POOL_CLIENT, AuthResource::UserPoolClient(client)).depends_on(USER_POOL);
    if let Some(provider) = &google_provider {
        client_node = client_node.depends_on(provider.id().clone());
    }

    let domain = Node::new(
        USER_POOL_DOMAIN,
        AuthResource::UserPoolDomain(Domain {
            prefix: domain_prefix(stack, context),
            region: context.region().to_string(),
            managed_login_version: ManagedLoginVersion::NewerManagedLogin,
        }),
    )
    .depends_on(USER_POOL);

    let branding = Node::new(
        MANAGED_LOGIN_BRANDING,
        AuthResource::ManagedLoginBranding(Branding {
            use_provider_defaults: true,
        }),
    )
    .depends_on(USER_POOL_DOMAIN)
    .depends_on(USER_POOL_CLIENT);

    let admin_user = config.admin_user_email().map(|email| {
        Node::new(ADMIN_USER, AuthResource::AdminUser(AdminUser::new(email))).depends_on(USER_POOL)
    });

    let nodes = [
        Some(user_pool),
        google_provider,
        Some(client_node),
        Some(domain),
        Some(branding),
        admin_user,
    ];

    let graph = ResourceGraph::from_nodes(nodes.into_iter().flatten())?;
    log::debug!("Built resource graph for '{}' with {} nodes", stack, graph.len());
    Ok(graph)
}
