//! Keycloak adapter for the identity provider port.
//!
//! Creates user accounts through the Keycloak admin REST API:
//!
//! 1. Acquire an admin access token via the client-credentials grant
//! 2. POST the user representation to the realm's `users` endpoint
//! 3. Read the new account's identity id from the `Location` header
//!
//! A 409 from the users endpoint means the email is already registered and
//! maps to `EmailTaken`; other failures map to `IdentityProviderError`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::{Email, FirstName, LastName};
use crate::ports::IdentityProvider;

/// Keycloak implementation of [`IdentityProvider`].
pub struct KeycloakIdentityProvider {
    client: reqwest::Client,
    config: AuthConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRepresentation<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    username: &'a str,
    enabled: bool,
    email_verified: bool,
    credentials: Vec<Credential<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Credential<'a> {
    #[serde(rename = "type")]
    credential_type: &'static str,
    value: &'a str,
    temporary: bool,
}

#[derive(Debug, Deserialize)]
struct AdminToken {
    access_token: String,
}

impl KeycloakIdentityProvider {
    /// Creates a provider from the auth configuration.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn provider_err(message: impl Into<String>) -> DomainError {
        DomainError::new(ErrorCode::IdentityProviderError, message)
    }

    async fn admin_token(&self) -> Result<String, DomainError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.admin_client_id.as_str()),
                ("client_secret", self.config.admin_client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::provider_err(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::provider_err(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let token: AdminToken = response
            .json()
            .await
            .map_err(|e| Self::provider_err(format!("Token response was malformed: {}", e)))?;

        Ok(token.access_token)
    }

    /// The identity id is the last segment of the `Location` header
    /// (`.../users/{id}`).
    fn identity_id_from_location(location: &str) -> Result<String, DomainError> {
        location
            .rsplit_once("users/")
            .map(|(_, id)| id.to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Self::provider_err("Location header is missing the user id"))
    }
}

#[async_trait]
impl IdentityProvider for KeycloakIdentityProvider {
    async fn register(
        &self,
        email: &Email,
        first_name: &FirstName,
        last_name: &LastName,
        password: &str,
    ) -> Result<String, DomainError> {
        let token = self.admin_token().await?;

        let representation = UserRepresentation {
            email: email.as_str(),
            first_name: first_name.as_str(),
            last_name: last_name.as_str(),
            username: email.as_str(),
            enabled: true,
            email_verified: false,
            credentials: vec![Credential {
                credential_type: "password",
                value: password,
                temporary: false,
            }],
        };

        let response = self
            .client
            .post(format!("{}/users", self.config.admin_url.trim_end_matches('/')))
            .bearer_auth(token)
            .json(&representation)
            .send()
            .await
            .map_err(|e| Self::provider_err(format!("User creation request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                "The email is already registered",
            )
            .with_detail("email", email.as_str()));
        }

        if !response.status().is_success() {
            return Err(Self::provider_err(format!(
                "Users endpoint returned {}",
                response.status()
            )));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Self::provider_err("Location header is missing"))?;

        Self::identity_id_from_location(location)
    }
}
