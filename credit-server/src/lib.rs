//! Salesman credit service
//!
//! Tracks per-salesman credit extensions against externally-priced licenses:
//! a local ledger of credit records, a monetary limit per salesman, and a
//! remote License service whose status flag is kept in step with the ledger.
//! The interesting part is the credit engine: limit enforcement at issue
//! time plus compensation when one leg of the ledger/remote write fails.
//!
//! # Module structure
//!
//! ```text
//! credit-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT validation, admin gate
//! ├── credit/        # the issuance/compensation engine
//! ├── cloud/         # platform adapters over platform-client
//! ├── audit/         # buffered remote activity log
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod cloud;
pub mod core;
pub mod credit;
pub mod db;
pub mod utils;

// Re-export public types
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::credit::{CallerToken, CreditEngine, CreditError, Outcome};
pub use crate::utils::{AppError, AppResult};

// Security logging macro - forwards structured fields to tracing
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
