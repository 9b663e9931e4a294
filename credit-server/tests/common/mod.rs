//! Shared test doubles for the credit engine
//!
//! Deterministic in-memory stand-ins for the ledger, the License service and
//! the sales ledger, plus a recording audit sink.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use credit_server::audit::{AuditAction, AuditSink};
use credit_server::credit::{
    CallerToken, CreditEngine, CreditLedger, LicenseDirectory, SalesLookup, UpstreamError,
};
use credit_server::db::repository::RepoError;
use shared::models::{Credit, CreditCreate, LicenseStatus, RemoteLicense, Salesman, SuspensionState};

pub fn token() -> CallerToken {
    CallerToken::new("test-token")
}

pub fn salesman(id: i64, user_id: i64, credit_limit: Decimal) -> Salesman {
    Salesman {
        id,
        user_id,
        credit_limit,
        suspension: SuspensionState::Active,
        created_at: 0,
        updated_at: 0,
    }
}

/// In-memory ledger honouring the storage contract, including the unique
/// license index.
#[derive(Default)]
pub struct MemoryLedger {
    salesmen: Mutex<HashMap<i64, Salesman>>,
    credits: Mutex<Vec<Credit>>,
    next_id: AtomicI64,
}

impl MemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn add_salesman(&self, s: Salesman) {
        self.salesmen.lock().unwrap().insert(s.id, s);
    }

    pub fn credit_count(&self) -> usize {
        self.credits.lock().unwrap().len()
    }

    pub fn has_credit_for_license(&self, license_id: i64) -> bool {
        self.credits
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.license_id == license_id)
    }
}

#[async_trait]
impl CreditLedger for MemoryLedger {
    async fn find_salesman(&self, salesman_id: i64) -> Result<Option<Salesman>, RepoError> {
        Ok(self.salesmen.lock().unwrap().get(&salesman_id).cloned())
    }

    async fn find_credit(&self, credit_id: i64) -> Result<Option<Credit>, RepoError> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == credit_id)
            .cloned())
    }

    async fn find_credit_by_license(&self, license_id: i64) -> Result<Option<Credit>, RepoError> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.license_id == license_id)
            .cloned())
    }

    async fn credits_for_salesman(&self, salesman_id: i64) -> Result<Vec<Credit>, RepoError> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.salesman_id == salesman_id)
            .cloned()
            .collect())
    }

    async fn insert_credit(&self, data: CreditCreate) -> Result<Credit, RepoError> {
        let mut credits = self.credits.lock().unwrap();
        if credits.iter().any(|c| c.license_id == data.license_id) {
            return Err(RepoError::Duplicate(format!(
                "credit for license {}",
                data.license_id
            )));
        }
        let credit = Credit {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            salesman_id: data.salesman_id,
            license_id: data.license_id,
            created_at: shared::util::now_millis(),
            updated_at: shared::util::now_millis(),
        };
        credits.push(credit.clone());
        Ok(credit)
    }

    async fn delete_credit(&self, credit_id: i64) -> Result<(), RepoError> {
        let mut credits = self.credits.lock().unwrap();
        let before = credits.len();
        credits.retain(|c| c.id != credit_id);
        if credits.len() == before {
            return Err(RepoError::NotFound(format!("Credit {credit_id} not found")));
        }
        Ok(())
    }
}

/// Scriptable license directory
#[derive(Default)]
pub struct FakeDirectory {
    licenses: Mutex<HashMap<i64, RemoteLicense>>,
    fetch_faults: Mutex<HashSet<i64>>,
    fail_set_status: AtomicBool,
    set_status_calls: Mutex<Vec<(i64, LicenseStatus)>>,
}

impl FakeDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_license(&self, id: i64, price: Decimal, status: LicenseStatus) {
        self.licenses
            .lock()
            .unwrap()
            .insert(id, RemoteLicense { id, price, status });
    }

    /// Make fetches of this license time out
    pub fn fail_fetch(&self, id: i64) {
        self.fetch_faults.lock().unwrap().insert(id);
    }

    /// Make every status flip fail
    pub fn fail_set_status(&self) {
        self.fail_set_status.store(true, Ordering::SeqCst);
    }

    pub fn status_of(&self, id: i64) -> Option<LicenseStatus> {
        self.licenses.lock().unwrap().get(&id).map(|l| l.status)
    }

    pub fn set_status_calls(&self) -> Vec<(i64, LicenseStatus)> {
        self.set_status_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseDirectory for FakeDirectory {
    async fn fetch_license(
        &self,
        license_id: i64,
        _token: &CallerToken,
    ) -> Result<RemoteLicense, UpstreamError> {
        if self.fetch_faults.lock().unwrap().contains(&license_id) {
            return Err(UpstreamError {
                code: None,
                message: "connection timed out".to_string(),
            });
        }
        self.licenses
            .lock()
            .unwrap()
            .get(&license_id)
            .cloned()
            .ok_or_else(|| UpstreamError {
                code: Some(404),
                message: format!("license {license_id} does not exist"),
            })
    }

    async fn set_status(
        &self,
        license_id: i64,
        status: LicenseStatus,
        _token: &CallerToken,
    ) -> Result<(), UpstreamError> {
        self.set_status_calls
            .lock()
            .unwrap()
            .push((license_id, status));
        if self.fail_set_status.load(Ordering::SeqCst) {
            return Err(UpstreamError {
                code: Some(503),
                message: "license service unavailable".to_string(),
            });
        }
        if let Some(license) = self.licenses.lock().unwrap().get_mut(&license_id) {
            license.status = status;
        }
        Ok(())
    }
}

/// Scriptable sales ledger probe
#[derive(Default)]
pub struct FakeSales {
    sold: Mutex<HashSet<i64>>,
    fail: AtomicBool,
}

impl FakeSales {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mark_sold(&self, license_id: i64) {
        self.sold.lock().unwrap().insert(license_id);
    }

    pub fn fail_probe(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SalesLookup for FakeSales {
    async fn has_sale_for(
        &self,
        license_id: i64,
        _token: &CallerToken,
    ) -> Result<bool, UpstreamError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(UpstreamError {
                code: None,
                message: "sales lookup timed out".to_string(),
            });
        }
        Ok(self.sold.lock().unwrap().contains(&license_id))
    }
}

/// Audit sink that remembers every record
#[derive(Default)]
pub struct RecordingAudit {
    entries: Mutex<Vec<(AuditAction, String)>>,
}

impl RecordingAudit {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<(AuditAction, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, _token: &CallerToken, action: AuditAction, description: String) {
        self.entries.lock().unwrap().push((action, description));
    }
}

/// Everything wired together around an in-memory ledger
pub struct TestHarness {
    pub ledger: Arc<MemoryLedger>,
    pub directory: Arc<FakeDirectory>,
    pub sales: Arc<FakeSales>,
    pub audit: Arc<RecordingAudit>,
    pub engine: Arc<CreditEngine>,
}

pub fn harness() -> TestHarness {
    let ledger = MemoryLedger::new();
    let directory = FakeDirectory::new();
    let sales = FakeSales::new();
    let audit = RecordingAudit::new();
    let engine = Arc::new(CreditEngine::new(
        ledger.clone(),
        directory.clone(),
        sales.clone(),
        audit.clone(),
    ));
    TestHarness {
        ledger,
        directory,
        sales,
        audit,
        engine,
    }
}
