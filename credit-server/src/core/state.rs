//! Server state — shared handles for all services

use std::sync::Arc;

use platform_client::{ClientConfig, LicenseClient, UserClient};
use sqlx::SqlitePool;

use crate::audit::AuditService;
use crate::auth::JwtService;
use crate::cloud::{PlatformLicenseDirectory, PlatformSalesLookup};
use crate::core::Config;
use crate::credit::{CreditEngine, SqliteLedger};
use crate::db::DbService;
use crate::utils::AppError;

/// Server state — cheap to clone, every field is a shared handle.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite connection pool |
/// | jwt_service | token validation |
/// | engine | the credit issuance/compensation engine |
/// | users | User directory client (registration checks) |
/// | audit | buffered activity log |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub engine: Arc<CreditEngine>,
    pub users: UserClient,
    pub audit: Arc<AuditService>,
}

impl ServerState {
    /// Initialize all services.
    ///
    /// Order: working directory, database, platform clients, audit worker,
    /// then the engine wired with its collaborators.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("credit.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        let licenses = LicenseClient::new(
            &ClientConfig::new(&config.license_service_url)
                .with_timeout(config.request_timeout_secs),
        )
        .map_err(|e| AppError::internal(format!("Failed to build license client: {e}")))?;

        let users = UserClient::new(
            &ClientConfig::new(&config.user_service_url).with_timeout(config.request_timeout_secs),
        )
        .map_err(|e| AppError::internal(format!("Failed to build user client: {e}")))?;

        let audit = AuditService::spawn(users.clone(), config.audit_buffer);

        let engine = Arc::new(CreditEngine::new(
            Arc::new(SqliteLedger::new(db.pool.clone())),
            Arc::new(PlatformLicenseDirectory::new(licenses.clone())),
            Arc::new(PlatformSalesLookup::new(licenses)),
            audit.clone(),
        ));

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service,
            engine,
            users,
            audit,
        })
    }

    /// Get the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
