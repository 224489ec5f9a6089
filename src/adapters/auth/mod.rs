//! Identity provider adapters.

mod keycloak;
mod mock;

pub use keycloak::KeycloakIdentityProvider;
pub use mock::MockIdentityProvider;
