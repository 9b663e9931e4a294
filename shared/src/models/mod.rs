//! Domain models
//!
//! Locally-owned entities (salesman, credit) and read-only projections of
//! records owned by the remote platform services (license, user).

pub mod credit;
pub mod license;
pub mod salesman;

pub use credit::{Credit, CreditCreate};
pub use license::{LicenseStatus, PlatformUser, RemoteLicense};
pub use salesman::{Salesman, SalesmanCreate, SalesmanUpdate, SuspensionState};
