//! Identity provider (Keycloak) configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Keycloak admin API configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the realm's admin API (".../admin/realms/{realm}")
    #[serde(default)]
    pub admin_url: String,

    /// Token endpoint for the client-credentials grant
    #[serde(default)]
    pub token_url: String,

    /// Admin client id
    #[serde(default)]
    pub admin_client_id: String,

    /// Admin client secret
    #[serde(default)]
    pub admin_client_secret: String,
}

impl AuthConfig {
    /// Validate auth configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.admin_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH ADMIN URL"));
        }
        if self.token_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH TOKEN URL"));
        }
        if self.admin_client_id.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH ADMIN CLIENT ID"));
        }
        Ok(())
    }
}
