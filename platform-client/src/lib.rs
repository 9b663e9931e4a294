//! HTTP clients for the remote platform services
//!
//! The credit server does not own licenses, sales or users; those live in
//! separate platform services. This crate is the transport layer for talking
//! to them:
//!
//! - [`LicenseClient`] - license lookups, status flips, sale probes
//! - [`UserClient`] - user existence checks and activity logging
//!
//! Every call forwards the caller's bearer token; the clients hold no
//! credentials of their own. Upstream failures keep the remote status code
//! and body verbatim so callers can surface them unchanged.

mod config;
mod error;
mod http;
mod licenses;
mod users;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use licenses::LicenseClient;
pub use users::UserClient;
