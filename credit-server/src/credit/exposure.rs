//! Outstanding-exposure aggregation

use rust_decimal::Decimal;
use shared::models::LicenseStatus;

use crate::credit::ledger::CreditLedger;
use crate::credit::outcome::CreditError;
use crate::credit::remote::{CallerToken, LicenseDirectory};

/// Sums the remote prices of a salesman's currently on-credit licenses.
///
/// Every ledger entry is re-priced against the license directory at call
/// time. Any fetch failure aborts the whole computation: a partial sum could
/// undercount exposure and silently let a limit breach through.
pub struct ExposureAggregator<'a> {
    ledger: &'a dyn CreditLedger,
    licenses: &'a dyn LicenseDirectory,
}

impl<'a> ExposureAggregator<'a> {
    pub fn new(ledger: &'a dyn CreditLedger, licenses: &'a dyn LicenseDirectory) -> Self {
        Self { ledger, licenses }
    }

    /// Total on-credit exposure for a salesman. Zero for an empty ledger.
    pub async fn compute(
        &self,
        salesman_id: i64,
        token: &CallerToken,
    ) -> Result<Decimal, CreditError> {
        let entries = self
            .ledger
            .credits_for_salesman(salesman_id)
            .await
            .map_err(CreditError::Ledger)?;

        let mut total = Decimal::ZERO;
        for entry in &entries {
            let license = self.licenses.fetch_license(entry.license_id, token).await?;
            // Only licenses still flagged on_credit count; a sold license is
            // settled through the sales ledger, not the credit limit.
            if license.status == LicenseStatus::OnCredit {
                total += license.price;
            }
        }
        Ok(total)
    }
}
