//! Configuration validation
//!
//! [`RawConfig`] is what a config file deserializes into; every field is
//! optional so that missing values surface as [`ConfigError`]s instead of
//! parse failures. [`RawConfig::validate`] turns it into a [`ValidatedConfig`]
//! the graph builder can rely on.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Unvalidated configuration, as loaded from a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConfig {
    /// Naming prefix for all resources
    #[serde(default)]
    pub stack_name_base: Option<String>,

    /// Email of the bootstrap administrator
    #[serde(default)]
    pub admin_user_email: Option<String>,

    /// Google federation credentials
    #[serde(default)]
    pub google_oauth: Option<RawGoogleOAuth>,

    /// Callback and logout URLs for the OAuth client
    #[serde(default, rename = "callbackUrls", alias = "callback_urls")]
    pub callback_urls: Option<Vec<String>>,
}

/// Unvalidated Google federation credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGoogleOAuth {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl fmt::Debug for RawGoogleOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawGoogleOAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Google federation credentials, both halves present
#[derive(Clone, PartialEq, Eq)]
pub struct GoogleOAuth {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for GoogleOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    stack_name_base: String,
    admin_user_email: Option<String>,
    google_oauth: Option<GoogleOAuth>,
    callback_urls: Option<Vec<String>>,
}

impl ValidatedConfig {
    pub fn stack_name_base(&self) -> &str {
        &self.stack_name_base
    }

    pub fn admin_user_email(&self) -> Option<&str> {
        self.admin_user_email.as_deref()
    }

    pub fn google_oauth(&self) -> Option<&GoogleOAuth> {
        self.google_oauth.as_ref()
    }

    /// Callback URLs from the config file, if any were given
    pub fn callback_urls(&self) -> Option<&[String]> {
        self.callback_urls.as_deref()
    }
}

impl RawConfig {
    /// Check required fields and internally consistent optional groups
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let stack_name_base = validate_stack_name(self.stack_name_base)?;

        let admin_user_email = self
            .admin_user_email
            .map(validate_email)
            .transpose()?;

        let google_oauth = self.google_oauth.map(validate_federation).transpose()?;

        let callback_urls = self
            .callback_urls
            .map(validate_callback_urls)
            .transpose()?;

        log::debug!(
            "Validated config for stack '{}' (federation: {}, admin: {})",
            stack_name_base,
            google_oauth.is_some(),
            admin_user_email.is_some()
        );

        Ok(ValidatedConfig {
            stack_name_base,
            admin_user_email,
            google_oauth,
            callback_urls,
        })
    }
}

/// The name also names the local state file, so it must stay one path component
fn validate_stack_name(name: Option<String>) -> Result<String, ConfigError> {
    let name = name
        .filter(|name| !name.trim().is_empty())
        .ok_or(ConfigError::MissingStackName)?;

    if name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidStackName {
            name,
            reason: "must not contain path separators",
        });
    }
    if name.contains("..") {
        return Err(ConfigError::InvalidStackName {
            name,
            reason: "must not contain '..'",
        });
    }
    Ok(name)
}

/// The address is used verbatim as the admin username and in the outputs
fn validate_email(email: String) -> Result<String, ConfigError> {
    if email.trim() != email {
        return Err(ConfigError::InvalidAdminEmail(email));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ConfigError::InvalidAdminEmail(email)),
    }
}

/// Partial credentials are rejected rather than dropped
fn validate_federation(raw: RawGoogleOAuth) -> Result<GoogleOAuth, ConfigError> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let client_id = present(raw.client_id)
        .ok_or(ConfigError::IncompleteFederation { missing: "client_id" })?;
    let client_secret = present(raw.client_secret).ok_or(ConfigError::IncompleteFederation {
        missing: "client_secret",
    })?;

    Ok(GoogleOAuth {
        client_id,
        client_secret,
    })
}

pub(crate) fn validate_callback_urls(urls: Vec<String>) -> Result<Vec<String>, ConfigError> {
    if urls.is_empty() {
        return Err(ConfigError::EmptyCallbackUrls);
    }

    for raw in &urls {
        let invalid = |reason: String| ConfigError::InvalidCallbackUrl {
            url: raw.clone(),
            reason,
        };

        let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
    }

    Ok(urls)
}

/// Account and region the stack is deployed into
///
/// Passed explicitly to the graph builder; never read from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    account_id: String,
    region: String,
}

impl DeploymentContext {
    pub fn new(
        account_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let account_id = account_id.into().trim().to_string();
        let region = region.into().trim().to_string();

        if account_id.is_empty() {
            return Err(ConfigError::MissingDeploymentContext("account id"));
        }
        if region.is_empty() {
            return Err(ConfigError::MissingDeploymentContext("region"));
        }

        Ok(Self { account_id, region })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}
