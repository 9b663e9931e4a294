//! Authentication
//!
//! Callers arrive with JWTs minted by the platform's auth service; this
//! module validates them and hands handlers a [`CurrentUser`] plus the raw
//! bearer token for forwarding:
//! - [`JwtService`] - token validation and (test/dev) generation
//! - [`CurrentUser`] - verified caller identity and role flag
//! - [`require_auth`] / [`require_admin`] - middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
