//! Buffered remote activity log

use std::sync::Arc;

use platform_client::UserClient;
use tokio::sync::mpsc;

use super::{AuditAction, AuditSink};
use crate::credit::CallerToken;

struct ActivityEntry {
    token: String,
    action: AuditAction,
    description: String,
}

/// Activity log backed by the User service.
///
/// `record` only enqueues; a background worker owns the HTTP calls. A full
/// buffer drops the entry (with a warning) rather than blocking the request
/// path, and upstream failures are logged and forgotten.
pub struct AuditService {
    tx: mpsc::Sender<ActivityEntry>,
}

impl AuditService {
    /// Spawn the background worker and return the sink handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(users: UserClient, buffer: usize) -> Arc<Self> {
        let (tx, mut rx) = mpsc::channel::<ActivityEntry>(buffer);

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = users
                    .record_activity(entry.action.as_str(), &entry.description, &entry.token)
                    .await
                {
                    tracing::warn!(error = %e, "failed to push activity record");
                }
            }
        });

        Arc::new(Self { tx })
    }
}

impl AuditSink for AuditService {
    fn record(&self, token: &CallerToken, action: AuditAction, description: String) {
        let entry = ActivityEntry {
            token: token.as_str().to_string(),
            action,
            description,
        };
        if self.tx.try_send(entry).is_err() {
            tracing::warn!("activity log buffer full, dropping record");
        }
    }
}
