//! Identity federation
//!
//! Exchanges a username/password for short-lived cloud credentials.

mod cognito;

pub use cognito::{classify_error, CognitoIdentityProvider};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporary access keys scoped to the identity pool role
#[derive(Clone, Serialize, Deserialize)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl TemporaryCredentials {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.map(|exp| exp <= now).unwrap_or(false)
    }
}

impl std::fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Credential exchange trait
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and return temporary credentials
    async fn credentials(&self, username: &str, password: &str) -> Result<TemporaryCredentials>;
}
