//! Resource declarations for the authentication stack
//!
//! Each struct is a pure description of one provider resource. They are
//! wrapped in [`AuthResource`] so the resolver sees a uniformly typed graph.

use declarative::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical id of the identity directory
pub const USER_POOL: &str = "UserPool";
/// Logical id of the Google federation link
pub const GOOGLE_PROVIDER: &str = "GoogleProvider";
/// Logical id of the OAuth client
pub const USER_POOL_CLIENT: &str = "UserPoolClient";
/// Logical id of the hosted login domain
pub const USER_POOL_DOMAIN: &str = "UserPoolDomain";
/// Logical id of the hosted login branding
pub const MANAGED_LOGIN_BRANDING: &str = "ManagedLoginBranding";
/// Logical id of the bootstrap administrator
pub const ADMIN_USER: &str = "AdminUser";

/// Scopes requested from Google and granted by the OAuth client
pub const OAUTH_SCOPES: [OAuthScope; 3] = [OAuthScope::OpenId, OAuthScope::Email, OAuthScope::Profile];

// ============================================================================
// Identity Directory
// ============================================================================

/// The managed store of user identities and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDirectory {
    pub name: String,
    pub self_sign_up_enabled: bool,
    pub sign_in_aliases: Vec<SignInAlias>,
    pub auto_verify: Vec<SignInAlias>,
    pub standard_attributes: Vec<StandardAttribute>,
    pub password_policy: PasswordPolicy,
    pub account_recovery: AccountRecovery,
    pub removal_policy: RemovalPolicy,
    pub user_invitation: InvitationMessage,
}

impl IdentityDirectory {
    pub fn for_stack(stack_name_base: &str) -> Self {
        Self {
            name: format!("{stack_name_base}-user-pool"),
            self_sign_up_enabled: false,
            sign_in_aliases: vec![SignInAlias::Email],
            auto_verify: vec![SignInAlias::Email],
            standard_attributes: vec![StandardAttribute {
                name: "email".to_string(),
                required: true,
                mutable: true,
            }],
            password_policy: PasswordPolicy::default(),
            account_recovery: AccountRecovery::EmailOnly,
            removal_policy: RemovalPolicy::Destroy,
            user_invitation: InvitationMessage::for_stack(stack_name_base),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInAlias {
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardAttribute {
    pub name: String,
    pub required: bool,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: u8,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_digits: bool,
    pub require_symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_digits: true,
            require_symbols: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRecovery {
    EmailOnly,
}

/// What happens to the resource when the stack is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalPolicy {
    Destroy,
}

/// Email sent to users created by an administrator
///
/// `{username}` and `{####}` are substituted by the provider at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationMessage {
    pub email_subject: String,
    pub email_body: String,
}

impl InvitationMessage {
    pub fn for_stack(stack_name_base: &str) -> Self {
        let email_body = format!(
            "<p>Hello {{username}},</p>\n\
             <p>Welcome to {stack_name_base}! Your username is <strong>{{username}}</strong> \
             and your temporary password is: <strong>{{####}}</strong></p>\n\
             <p>Please use this temporary password to log in and set your permanent password.</p>\n\
             <p>The CloudFront URL to your application is stored as an output in the \
             \"{stack_name_base}\" stack, and will be printed to your terminal once the \
             deployment process completes.</p>\n\
             <p>Thanks,</p>\n\
             <p>Fullstack AgentCore Solution Template Team</p>"
        );

        Self {
            email_subject: format!("Welcome to {stack_name_base}!"),
            email_body,
        }
    }
}

// ============================================================================
// Federation
// ============================================================================

/// Kind of sign-in provider an OAuth client accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityProviderKind {
    /// The directory's own username/password provider
    #[serde(rename = "COGNITO")]
    Native,
    #[serde(rename = "Google")]
    Google,
}

impl IdentityProviderKind {
    /// Provider name as the directory knows it
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Native => "COGNITO",
            Self::Google => "Google",
        }
    }
}

/// A third-party identity source linked to the directory
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedProvider {
    pub kind: IdentityProviderKind,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<OAuthScope>,
    pub attribute_mapping: AttributeMapping,
}

impl FederatedProvider {
    pub fn google(client_id: &str, client_secret: &str) -> Self {
        Self {
            kind: IdentityProviderKind::Google,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scopes: OAUTH_SCOPES.to_vec(),
            attribute_mapping: AttributeMapping::google(),
        }
    }
}

impl fmt::Debug for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedProvider")
            .field("kind", &self.kind)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("attribute_mapping", &self.attribute_mapping)
            .finish()
    }
}

/// Directory attribute ← provider claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapping {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

impl AttributeMapping {
    fn google() -> Self {
        Self {
            email: "email".to_string(),
            given_name: "given_name".to_string(),
            family_name: "family_name".to_string(),
        }
    }
}

// ============================================================================
// OAuth Client
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthScope {
    #[serde(rename = "openid")]
    OpenId,
    Email,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthFlow {
    AuthorizationCodeGrant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlows {
    pub user_password: bool,
    pub user_srp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    pub flows: Vec<OAuthFlow>,
    pub scopes: Vec<OAuthScope>,
    pub callback_urls: Vec<String>,
    pub logout_urls: Vec<String>,
}

/// The application registration that exchanges codes for tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClient {
    pub name: String,
    pub generate_secret: bool,
    pub supported_identity_providers: Vec<IdentityProviderKind>,
    pub auth_flows: AuthFlows,
    pub oauth: OAuthSettings,
    pub prevent_user_existence_errors: bool,
}

impl OAuthClient {
    /// Native provider first, federated provider appended when linked
    pub fn new(stack_name_base: &str, federated: bool, callback_urls: Vec<String>) -> Self {
        let mut supported_identity_providers = vec![IdentityProviderKind::Native];
        if federated {
            supported_identity_providers.push(IdentityProviderKind::Google);
        }

        Self {
            name: format!("{stack_name_base}-client"),
            generate_secret: false,
            supported_identity_providers,
            auth_flows: AuthFlows {
                user_password: true,
                user_srp: true,
            },
            oauth: OAuthSettings {
                flows: vec![OAuthFlow::AuthorizationCodeGrant],
                scopes: OAUTH_SCOPES.to_vec(),
                logout_urls: callback_urls.clone(),
                callback_urls,
            },
            prevent_user_existence_errors: true,
        }
    }
}

// ============================================================================
// Domain & Branding
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagedLoginVersion {
    NewerManagedLogin,
}

/// Hosted endpoint prefix for the login UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub prefix: String,
    pub region: String,
    pub managed_login_version: ManagedLoginVersion,
}

impl Domain {
    /// Fully qualified hosted login domain
    pub fn domain_name(&self) -> String {
        format!("{}.auth.{}.amazoncognito.com", self.prefix, self.region)
    }
}

/// Visual customization of the hosted login UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub use_provider_defaults: bool,
}

// ============================================================================
// Admin User
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMedium {
    Email,
}

/// Bootstrap administrator; credentials are emailed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
    pub email: String,
    pub desired_delivery_mediums: Vec<DeliveryMedium>,
}

impl AdminUser {
    pub fn new(email: &str) -> Self {
        Self {
            username: email.to_string(),
            email: email.to_string(),
            desired_delivery_mediums: vec![DeliveryMedium::Email],
        }
    }
}

// ============================================================================
// Node payload
// ============================================================================

/// Every resource kind the stack can contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties", rename_all = "snake_case")]
pub enum AuthResource {
    UserPool(IdentityDirectory),
    GoogleProvider(FederatedProvider),
    UserPoolClient(OAuthClient),
    UserPoolDomain(Domain),
    ManagedLoginBranding(Branding),
    AdminUser(AdminUser),
}

impl Resource for AuthResource {
    fn resource_type(&self) -> &'static str {
        match self {
            Self::UserPool(_) => "user_pool",
            Self::GoogleProvider(_) => "user_pool_identity_provider",
            Self::UserPoolClient(_) => "user_pool_client",
            Self::UserPoolDomain(_) => "user_pool_domain",
            Self::ManagedLoginBranding(_) => "managed_login_branding",
            Self::AdminUser(_) => "user_pool_user",
        }
    }

    fn description(&self) -> String {
        match self {
            Self::UserPool(pool) => format!("User pool {}", pool.name),
            Self::GoogleProvider(_) => "Google identity provider".to_string(),
            Self::UserPoolClient(client) => {
                let providers: Vec<&str> = client
                    .supported_identity_providers
                    .iter()
                    .map(IdentityProviderKind::provider_name)
                    .collect();
                format!("OAuth client {} [{}]", client.name, providers.join(", "))
            }
            Self::UserPoolDomain(domain) => format!("Domain {}", domain.domain_name()),
            Self::ManagedLoginBranding(_) => "Managed login branding (default style)".to_string(),
            Self::AdminUser(user) => format!("Admin user {}", user.email),
        }
    }
}
