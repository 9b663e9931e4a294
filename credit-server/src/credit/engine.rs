//! Credit issuance and revocation engine
//!
//! Orchestrates the two-leg write behind every credit: a local ledger row and
//! a status flag on the remote License service. The ledger insert/delete is
//! the durability point; once it lands, a remote failure degrades the result
//! instead of rolling the ledger back, because the remote service offers no
//! transaction to join.
//!
//! Issuance serialises per salesman with an advisory in-process lock, held
//! through the remote flip, so two concurrent issues cannot both pass the
//! limit check against the same stale exposure. Cross-process deployments
//! still race; that window is accepted and documented rather than hidden.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::models::{Credit, CreditCreate, LicenseStatus};
use tokio::sync::Mutex;

use crate::audit::{AuditAction, AuditSink};
use crate::credit::exposure::ExposureAggregator;
use crate::credit::ledger::CreditLedger;
use crate::credit::outcome::{CreditError, Outcome, RemoteSyncWarning};
use crate::credit::remote::{CallerToken, LicenseDirectory, SalesLookup};
use crate::db::repository::RepoError;

/// The credit issuance and compensation engine
///
/// Stateless between calls apart from the advisory lock table; all storage
/// and transport is injected, so tests drive it with deterministic fakes.
pub struct CreditEngine {
    ledger: Arc<dyn CreditLedger>,
    licenses: Arc<dyn LicenseDirectory>,
    sales: Arc<dyn SalesLookup>,
    audit: Arc<dyn AuditSink>,
    /// Per-salesman locks serialising the check-then-commit window of
    /// `issue_credit` within this process
    salesman_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl CreditEngine {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        licenses: Arc<dyn LicenseDirectory>,
        sales: Arc<dyn SalesLookup>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            ledger,
            licenses,
            sales,
            audit,
            salesman_locks: DashMap::new(),
        }
    }

    fn salesman_lock(&self, salesman_id: i64) -> Arc<Mutex<()>> {
        self.salesman_locks
            .entry(salesman_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Grant a salesman credit for a license.
    ///
    /// Every step up to the insert is an abort point with no side effects.
    /// After the insert the credit exists no matter what the remote does.
    pub async fn issue_credit(
        &self,
        salesman_id: i64,
        license_id: i64,
        token: &CallerToken,
    ) -> Result<Outcome<Credit>, CreditError> {
        // Serialise per salesman. The lock spans the remote flip as well as
        // the check-then-commit window: exposure re-prices ledger entries by
        // their remote status, so releasing before the flip would let a
        // concurrent issue read the stale flag and overshoot the limit.
        let lock = self.salesman_lock(salesman_id);
        let _guard = lock.lock().await;

        // 1. Salesman must exist
        let salesman = self
            .ledger
            .find_salesman(salesman_id)
            .await
            .map_err(CreditError::Ledger)?
            .ok_or(CreditError::SalesmanNotFound(salesman_id))?;

        // 2. One credit per license. Checked early for a clean error; the
        //    unique index stays the authoritative guard under races.
        if self
            .ledger
            .find_credit_by_license(license_id)
            .await
            .map_err(CreditError::Ledger)?
            .is_some()
        {
            return Err(CreditError::AlreadyCredited(license_id));
        }

        // 3. Eligibility: a license is credited once, from `available` only
        let license = self.licenses.fetch_license(license_id, token).await?;
        if license.status != LicenseStatus::Available {
            return Err(CreditError::NotEligible {
                license_id,
                status: license.status,
            });
        }

        // 4. Outstanding exposure. Aborts on any remote fetch failure;
        //    never proceed on an unknown exposure.
        let exposure = ExposureAggregator::new(self.ledger.as_ref(), self.licenses.as_ref())
            .compute(salesman_id, token)
            .await?;

        // 5. Limit invariant, checked at the commit instant
        if exposure + license.price > salesman.credit_limit {
            return Err(CreditError::LimitExceeded {
                credit_limit: salesman.credit_limit,
                exposure,
                price: license.price,
            });
        }

        // 6. Local commit (the durability point)
        let credit = match self
            .ledger
            .insert_credit(CreditCreate {
                salesman_id,
                license_id,
            })
            .await
        {
            Ok(credit) => credit,
            // A racing insert can still lose to the unique index.
            Err(RepoError::Duplicate(_)) => return Err(CreditError::AlreadyCredited(license_id)),
            Err(e) => return Err(CreditError::Ledger(e)),
        };

        // 7. Remote flip. The row stays either way: a credit whose remote
        //    flag never flipped is a recoverable inconsistency, a silently
        //    rolled-back credit is not.
        let outcome = match self
            .licenses
            .set_status(license_id, LicenseStatus::OnCredit, token)
            .await
        {
            Ok(()) => Outcome::Clean(credit),
            Err(fault) => {
                tracing::warn!(
                    license_id,
                    error = %fault,
                    "credit committed but remote status flip failed"
                );
                Outcome::Degraded {
                    value: credit,
                    warning: RemoteSyncWarning::new(license_id, LicenseStatus::OnCredit, fault),
                }
            }
        };

        // 8. Audit, fire-and-forget
        self.audit.record(
            token,
            AuditAction::Post,
            format!("Added new credit record to salesman <{salesman_id}>"),
        );

        Ok(outcome)
    }

    /// Remove a credit, releasing the license when it was never sold.
    ///
    /// The sale probe runs before any compensation: revoking a credit on a
    /// meanwhile-sold license must not reset it to `available`, or the same
    /// license could be sold twice.
    pub async fn revoke_credit(
        &self,
        credit_id: i64,
        token: &CallerToken,
    ) -> Result<Outcome<Credit>, CreditError> {
        // 1. Credit must exist
        let credit = self
            .ledger
            .find_credit(credit_id)
            .await
            .map_err(CreditError::Ledger)?
            .ok_or(CreditError::CreditNotFound(credit_id))?;

        // 2. Local delete; unconditional once the caller layer authorised it
        match self.ledger.delete_credit(credit_id).await {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => return Err(CreditError::CreditNotFound(credit_id)),
            Err(e) => return Err(CreditError::Ledger(e)),
        }

        // 3. Probe, then compensate
        let outcome = match self.sales.has_sale_for(credit.license_id, token).await {
            // Sold in the meantime: the remote status is correctly `sold`,
            // nothing to compensate.
            Ok(true) => Outcome::Clean(credit),
            // Never sold: release the license back to inventory.
            Ok(false) => {
                match self
                    .licenses
                    .set_status(credit.license_id, LicenseStatus::Available, token)
                    .await
                {
                    Ok(()) => Outcome::Clean(credit),
                    Err(fault) => {
                        tracing::warn!(
                            license_id = credit.license_id,
                            error = %fault,
                            "credit deleted but license release failed"
                        );
                        let warning = RemoteSyncWarning::new(
                            credit.license_id,
                            LicenseStatus::Available,
                            fault,
                        );
                        Outcome::Degraded {
                            value: credit,
                            warning,
                        }
                    }
                }
            }
            // Unknown sale state: compensating blind could double-sell, so
            // leave the remote untouched and surface the staleness.
            Err(fault) => {
                tracing::warn!(
                    license_id = credit.license_id,
                    error = %fault,
                    "credit deleted but sale probe failed, remote status left as-is"
                );
                let warning =
                    RemoteSyncWarning::new(credit.license_id, LicenseStatus::Available, fault);
                Outcome::Degraded {
                    value: credit,
                    warning,
                }
            }
        };

        // 4. Audit, fire-and-forget
        self.audit.record(
            token,
            AuditAction::Delete,
            format!("Deleted credit record <{credit_id}>"),
        );

        Ok(outcome)
    }

    /// Outstanding on-credit exposure for a salesman.
    ///
    /// An unknown salesman is an error; a known one with no ledger entries
    /// reports zero.
    pub async fn exposure(
        &self,
        salesman_id: i64,
        token: &CallerToken,
    ) -> Result<Decimal, CreditError> {
        self.ledger
            .find_salesman(salesman_id)
            .await
            .map_err(CreditError::Ledger)?
            .ok_or(CreditError::SalesmanNotFound(salesman_id))?;

        ExposureAggregator::new(self.ledger.as_ref(), self.licenses.as_ref())
            .compute(salesman_id, token)
            .await
    }
}
