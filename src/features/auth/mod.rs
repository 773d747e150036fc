//! Bearer-token authentication against a Keycloak realm.
//!
//! Tokens are RS256 access tokens issued by Keycloak; signing keys are fetched
//! from the realm's JWKS endpoint and cached. The validated identity is
//! exposed to handlers as [`model::AuthenticatedUser`].

mod jwks;
mod validator;

pub mod guards;
pub mod model;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
