//! User directory API
//!
//! Existence checks when registering salesmen, and the remote activity log
//! every API operation reports into.

use crate::{ClientConfig, ClientResult, HttpClient};
use serde::Serialize;
use shared::models::PlatformUser;

/// Client for the remote User directory service
#[derive(Debug, Clone)]
pub struct UserClient {
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct ActivityRecord<'a> {
    method: &'a str,
    description: &'a str,
}

impl UserClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Fetch a platform user by id
    ///
    /// `GET /api/user/{id}`
    pub async fn fetch_user(&self, user_id: i64, token: &str) -> ClientResult<PlatformUser> {
        self.http.get(&format!("api/user/{user_id}"), token).await
    }

    /// Append an entry to the caller's activity log
    ///
    /// `POST /api/user/logs`
    pub async fn record_activity(
        &self,
        method: &str,
        description: &str,
        token: &str,
    ) -> ClientResult<()> {
        self.http
            .post_json(
                "api/user/logs",
                &ActivityRecord {
                    method,
                    description,
                },
                token,
            )
            .await
    }
}
