//! Credit engine behaviour
//!
//! Drives the issuance/compensation engine against deterministic fakes:
//! limit enforcement, eligibility, uniqueness, partial-success surfacing and
//! the revoke/compensate symmetry.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use common::{FakeDirectory, FakeSales, MemoryLedger, RecordingAudit, harness, salesman, token};
use credit_server::audit::AuditAction;
use credit_server::credit::{CreditEngine, CreditError, CreditLedger, Outcome};
use credit_server::db::repository::RepoError;
use shared::models::{Credit, CreditCreate, LicenseStatus, Salesman};

#[tokio::test]
async fn issue_commits_ledger_and_flips_remote() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(1000.00), LicenseStatus::Available);

    let outcome = h.engine.issue_credit(1, 101, &token()).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.value().license_id, 101);
    assert!(h.ledger.has_credit_for_license(101));
    assert_eq!(h.directory.status_of(101), Some(LicenseStatus::OnCredit));
    assert_eq!(
        h.directory.set_status_calls(),
        vec![(101, LicenseStatus::OnCredit)]
    );
}

#[tokio::test]
async fn limit_is_a_hard_ceiling() {
    // Limit 1000.00, first license takes the full limit, the second is one
    // cent over.
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(1000.00), LicenseStatus::Available);
    h.directory
        .add_license(102, dec!(0.01), LicenseStatus::Available);

    let first = h.engine.issue_credit(1, 101, &token()).await.unwrap();
    assert!(first.is_clean());
    assert_eq!(h.engine.exposure(1, &token()).await.unwrap(), dec!(1000.00));

    let second = h.engine.issue_credit(1, 102, &token()).await;
    match second {
        Err(CreditError::LimitExceeded {
            credit_limit,
            exposure,
            price,
        }) => {
            assert_eq!(credit_limit, dec!(1000.00));
            assert_eq!(exposure, dec!(1000.00));
            assert_eq!(price, dec!(0.01));
        }
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
    assert!(!h.ledger.has_credit_for_license(102));
}

#[tokio::test]
async fn exposure_exactly_at_limit_is_allowed() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(100.00)));
    h.directory
        .add_license(201, dec!(60.00), LicenseStatus::Available);
    h.directory
        .add_license(202, dec!(40.00), LicenseStatus::Available);

    assert!(h.engine.issue_credit(1, 201, &token()).await.is_ok());
    let outcome = h.engine.issue_credit(1, 202, &token()).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(h.engine.exposure(1, &token()).await.unwrap(), dec!(100.00));
}

#[tokio::test]
async fn unknown_salesman_aborts_before_any_side_effect() {
    let h = harness();
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let result = h.engine.issue_credit(99, 101, &token()).await;

    assert!(matches!(result, Err(CreditError::SalesmanNotFound(99))));
    assert_eq!(h.ledger.credit_count(), 0);
    assert!(h.directory.set_status_calls().is_empty());
}

#[tokio::test]
async fn already_credited_license_is_a_conflict() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.ledger.add_salesman(salesman(2, 20, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(50.00), LicenseStatus::Available);

    h.engine.issue_credit(1, 101, &token()).await.unwrap();
    // Someone else asking for the same license is refused outright.
    let result = h.engine.issue_credit(2, 101, &token()).await;

    assert!(matches!(result, Err(CreditError::AlreadyCredited(101))));
    assert_eq!(h.ledger.credit_count(), 1);
}

#[tokio::test]
async fn sold_or_on_credit_license_is_not_eligible() {
    for status in [LicenseStatus::Sold, LicenseStatus::OnCredit] {
        let h = harness();
        h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
        h.directory.add_license(101, dec!(50.00), status);

        let result = h.engine.issue_credit(1, 101, &token()).await;

        match result {
            Err(CreditError::NotEligible {
                license_id,
                status: reported,
            }) => {
                assert_eq!(license_id, 101);
                assert_eq!(reported, status);
            }
            other => panic!("expected NotEligible, got {other:?}"),
        }
        assert_eq!(h.ledger.credit_count(), 0);
        assert!(h.directory.set_status_calls().is_empty());
    }
}

#[tokio::test]
async fn upstream_code_and_message_survive_verbatim() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    // License 404s on the remote side.

    let result = h.engine.issue_credit(1, 404, &token()).await;

    match result {
        Err(CreditError::Upstream(fault)) => {
            assert_eq!(fault.code, Some(404));
            assert_eq!(fault.message, "license 404 does not exist");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn exposure_aggregation_aborts_on_fetch_failure() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(100.00), LicenseStatus::Available);
    h.directory
        .add_license(102, dec!(100.00), LicenseStatus::Available);

    h.engine.issue_credit(1, 101, &token()).await.unwrap();
    // The existing entry's re-pricing now times out.
    h.directory.fail_fetch(101);

    let exposure = h.engine.exposure(1, &token()).await;
    assert!(matches!(exposure, Err(CreditError::Upstream(_))));

    // The enclosing issue fails the same way and writes nothing.
    let result = h.engine.issue_credit(1, 102, &token()).await;
    assert!(matches!(result, Err(CreditError::Upstream(_))));
    assert!(!h.ledger.has_credit_for_license(102));
}

#[tokio::test]
async fn exposure_is_zero_without_ledger_entries() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(500.00)));

    assert_eq!(h.engine.exposure(1, &token()).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn exposure_ignores_entries_no_longer_on_credit() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(300.00), LicenseStatus::Available);
    h.directory
        .add_license(102, dec!(200.00), LicenseStatus::Available);

    h.engine.issue_credit(1, 101, &token()).await.unwrap();
    h.engine.issue_credit(1, 102, &token()).await.unwrap();

    // License 101 gets sold out from under the ledger; only 102 still counts.
    h.directory
        .add_license(101, dec!(300.00), LicenseStatus::Sold);

    assert_eq!(h.engine.exposure(1, &token()).await.unwrap(), dec!(200.00));
}

#[tokio::test]
async fn failed_remote_flip_degrades_instead_of_rolling_back() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);
    h.directory.fail_set_status();

    let outcome = h.engine.issue_credit(1, 101, &token()).await.unwrap();

    match outcome {
        Outcome::Degraded { value, warning } => {
            assert_eq!(value.license_id, 101);
            assert_eq!(warning.license_id, 101);
            assert_eq!(warning.intended_status, LicenseStatus::OnCredit);
            assert_eq!(warning.upstream_code, Some(503));
        }
        Outcome::Clean(_) => panic!("flip failure must surface as Degraded"),
    }
    // The ledger row survives the remote failure.
    assert!(h.ledger.has_credit_for_license(101));
}

#[tokio::test]
async fn revoke_releases_an_unsold_license() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let credit = h
        .engine
        .issue_credit(1, 101, &token())
        .await
        .unwrap()
        .into_parts()
        .0;
    let outcome = h.engine.revoke_credit(credit.id, &token()).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(h.ledger.credit_count(), 0);
    assert_eq!(h.directory.status_of(101), Some(LicenseStatus::Available));
}

#[tokio::test]
async fn revoke_leaves_a_sold_license_alone() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let credit = h
        .engine
        .issue_credit(1, 101, &token())
        .await
        .unwrap()
        .into_parts()
        .0;

    // Sold while on credit; the remote flag is now `sold` and must stay so.
    h.directory.add_license(101, dec!(10.00), LicenseStatus::Sold);
    h.sales.mark_sold(101);

    let outcome = h.engine.revoke_credit(credit.id, &token()).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(h.ledger.credit_count(), 0);
    assert_eq!(h.directory.status_of(101), Some(LicenseStatus::Sold));
    // Only the issue-time flip ever touched the remote status.
    assert_eq!(
        h.directory.set_status_calls(),
        vec![(101, LicenseStatus::OnCredit)]
    );
}

#[tokio::test]
async fn revoke_of_missing_credit_is_not_found() {
    let h = harness();
    let result = h.engine.revoke_credit(12345, &token()).await;
    assert!(matches!(result, Err(CreditError::CreditNotFound(12345))));
}

#[tokio::test]
async fn failed_compensation_still_reports_the_deletion() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let credit = h
        .engine
        .issue_credit(1, 101, &token())
        .await
        .unwrap()
        .into_parts()
        .0;
    h.directory.fail_set_status();

    let outcome = h.engine.revoke_credit(credit.id, &token()).await.unwrap();

    match outcome {
        Outcome::Degraded { warning, .. } => {
            assert_eq!(warning.license_id, 101);
            assert_eq!(warning.intended_status, LicenseStatus::Available);
        }
        Outcome::Clean(_) => panic!("failed release must surface as Degraded"),
    }
    assert_eq!(h.ledger.credit_count(), 0);
}

#[tokio::test]
async fn failed_sale_probe_skips_compensation() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let credit = h
        .engine
        .issue_credit(1, 101, &token())
        .await
        .unwrap()
        .into_parts()
        .0;
    h.sales.fail_probe();

    let outcome = h.engine.revoke_credit(credit.id, &token()).await.unwrap();

    assert!(!outcome.is_clean());
    assert_eq!(h.ledger.credit_count(), 0);
    // Compensating blind could double-sell; the status flip never ran.
    assert_eq!(
        h.directory.set_status_calls(),
        vec![(101, LicenseStatus::OnCredit)]
    );
}

#[tokio::test]
async fn issue_and_revoke_are_audited() {
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(10.00), LicenseStatus::Available);

    let credit = h
        .engine
        .issue_credit(1, 101, &token())
        .await
        .unwrap()
        .into_parts()
        .0;
    h.engine.revoke_credit(credit.id, &token()).await.unwrap();

    let actions: Vec<AuditAction> = h.audit.entries().iter().map(|(a, _)| *a).collect();
    assert_eq!(actions, vec![AuditAction::Post, AuditAction::Delete]);
}

#[tokio::test]
async fn concurrent_issues_for_one_salesman_cannot_jointly_overshoot() {
    // Two issues of 600.00 against a 1000.00 limit: the advisory per-salesman
    // lock serialises the check-then-commit window, so exactly one wins.
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(600.00), LicenseStatus::Available);
    h.directory
        .add_license(102, dec!(600.00), LicenseStatus::Available);

    let first = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.issue_credit(1, 101, &token()).await })
    };
    let second = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.issue_credit(1, 102, &token()).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let limit_rejections = results
        .iter()
        .filter(|r| matches!(r, Err(CreditError::LimitExceeded { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(limit_rejections, 1);
    assert_eq!(h.ledger.credit_count(), 1);
}

#[tokio::test]
async fn racing_issues_for_one_license_produce_exactly_one_credit() {
    // Different salesmen, same license: whichever loses (at the pre-check
    // or at the unique index) must see a conflict, never a storage error.
    let h = harness();
    h.ledger.add_salesman(salesman(1, 10, dec!(1000.00)));
    h.ledger.add_salesman(salesman(2, 20, dec!(1000.00)));
    h.directory
        .add_license(101, dec!(100.00), LicenseStatus::Available);

    let first = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.issue_credit(1, 101, &token()).await })
    };
    let second = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.issue_credit(2, 101, &token()).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    // The loser either trips the pre-check / unique index (already credited)
    // or fetches the license after the winner's flip (no longer eligible).
    // Both are conflicts; neither may surface as a storage error.
    let conflicts = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(CreditError::AlreadyCredited(101))
                    | Err(CreditError::NotEligible {
                        license_id: 101,
                        ..
                    })
            )
        })
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(h.ledger.credit_count(), 1);
}

/// Ledger wrapper whose license pre-check always misses, forcing the insert
/// to collide with the unique index the way a true race would.
struct BlindPrecheckLedger(Arc<MemoryLedger>);

#[async_trait]
impl CreditLedger for BlindPrecheckLedger {
    async fn find_salesman(&self, salesman_id: i64) -> Result<Option<Salesman>, RepoError> {
        self.0.find_salesman(salesman_id).await
    }

    async fn find_credit(&self, credit_id: i64) -> Result<Option<Credit>, RepoError> {
        self.0.find_credit(credit_id).await
    }

    async fn find_credit_by_license(&self, _license_id: i64) -> Result<Option<Credit>, RepoError> {
        Ok(None)
    }

    async fn credits_for_salesman(&self, salesman_id: i64) -> Result<Vec<Credit>, RepoError> {
        self.0.credits_for_salesman(salesman_id).await
    }

    async fn insert_credit(&self, data: CreditCreate) -> Result<Credit, RepoError> {
        self.0.insert_credit(data).await
    }

    async fn delete_credit(&self, credit_id: i64) -> Result<(), RepoError> {
        self.0.delete_credit(credit_id).await
    }
}

#[tokio::test]
async fn unique_index_violation_surfaces_as_conflict() {
    let inner = MemoryLedger::new();
    inner.add_salesman(salesman(1, 10, dec!(1000.00)));
    inner.add_salesman(salesman(2, 20, dec!(1000.00)));

    let directory = FakeDirectory::new();
    directory.add_license(101, dec!(100.00), LicenseStatus::Available);

    let engine = CreditEngine::new(
        Arc::new(BlindPrecheckLedger(inner.clone())),
        directory.clone(),
        FakeSales::new(),
        RecordingAudit::new(),
    );

    engine.issue_credit(1, 101, &token()).await.unwrap();
    // Replay the interleaving where the loser fetched the license before the
    // winner's flip landed: the remote still says available, the pre-check
    // sees nothing, so the insert lands on the unique index.
    directory.add_license(101, dec!(100.00), LicenseStatus::Available);
    let result = engine.issue_credit(2, 101, &token()).await;

    assert!(matches!(result, Err(CreditError::AlreadyCredited(101))));
    assert_eq!(inner.credit_count(), 1);
}
