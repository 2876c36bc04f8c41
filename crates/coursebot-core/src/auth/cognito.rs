//! Cognito user pool + identity pool credential exchange
//!
//! `InitiateAuth` (user pool) yields an ID token, which the identity pool
//! trades for an identity id and then for temporary access keys.

use super::{IdentityProvider, TemporaryCredentials};
use crate::config::AwsConfig;
use crate::error::{AuthError, CourseBotError, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const IDP_TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const IDENTITY_TARGET_PREFIX: &str = "AWSCognitoIdentityService";

/// Identity provider backed by Cognito's public JSON APIs
pub struct CognitoIdentityProvider {
    http_client: reqwest::Client,
    region: String,
    user_pool_id: String,
    app_client_id: String,
    identity_pool_id: String,
    idp_endpoint: String,
    identity_endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    credentials: CredentialsPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsPayload {
    access_key_id: String,
    secret_key: String,
    session_token: String,
    #[serde(default)]
    expiration: Option<f64>,
}

impl CognitoIdentityProvider {
    /// Create provider for the configured pools
    pub fn new(aws: &AwsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            region: aws.region.clone(),
            user_pool_id: aws.user_pool_id.clone(),
            app_client_id: aws.app_client_id.clone(),
            identity_pool_id: aws.identity_pool_id.clone(),
            idp_endpoint: format!("https://cognito-idp.{}.amazonaws.com/", aws.region),
            identity_endpoint: format!("https://cognito-identity.{}.amazonaws.com/", aws.region),
        })
    }

    /// Point both APIs at alternative endpoints (local stacks, tests)
    pub fn with_endpoints(mut self, idp: impl Into<String>, identity: impl Into<String>) -> Self {
        self.idp_endpoint = idp.into();
        self.identity_endpoint = identity.into();
        self
    }

    fn logins(&self, id_token: &str) -> HashMap<String, String> {
        let mut logins = HashMap::new();
        logins.insert(
            format!(
                "cognito-idp.{}.amazonaws.com/{}",
                self.region, self.user_pool_id
            ),
            id_token.to_string(),
        );
        logins
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        target: &str,
        body: &Value,
    ) -> std::result::Result<T, AuthError> {
        let response = self
            .http_client
            .post(endpoint)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", target)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| AuthError::Unexpected(format!("malformed {} response: {}", target, e)))
    }

    async fn exchange(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<TemporaryCredentials, AuthError> {
        let auth: InitiateAuthResponse = self
            .call(
                &self.idp_endpoint,
                &format!("{}.InitiateAuth", IDP_TARGET_PREFIX),
                &json!({
                    "AuthFlow": "USER_PASSWORD_AUTH",
                    "ClientId": self.app_client_id,
                    "AuthParameters": { "USERNAME": username, "PASSWORD": password },
                }),
            )
            .await?;

        let id_token = match (auth.authentication_result, auth.challenge_name) {
            (Some(result), _) => result.id_token,
            (None, Some(challenge)) => {
                return Err(AuthError::Unexpected(format!(
                    "user pool requested challenge {} instead of issuing tokens",
                    challenge
                )))
            }
            (None, None) => {
                return Err(AuthError::Unexpected(
                    "user pool returned no authentication result".to_string(),
                ))
            }
        };
        tracing::debug!("Obtained user pool ID token");

        let logins = self.logins(&id_token);
        let identity: GetIdResponse = self
            .call(
                &self.identity_endpoint,
                &format!("{}.GetId", IDENTITY_TARGET_PREFIX),
                &json!({ "IdentityPoolId": self.identity_pool_id, "Logins": &logins }),
            )
            .await?;
        tracing::debug!("Resolved federated identity {}", identity.identity_id);

        let creds: GetCredentialsResponse = self
            .call(
                &self.identity_endpoint,
                &format!("{}.GetCredentialsForIdentity", IDENTITY_TARGET_PREFIX),
                &json!({ "IdentityId": identity.identity_id, "Logins": &logins }),
            )
            .await?;

        let payload = creds.credentials;
        Ok(TemporaryCredentials {
            access_key_id: payload.access_key_id,
            secret_key: payload.secret_key,
            session_token: payload.session_token,
            expiration: payload
                .expiration
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single()),
        })
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn credentials(&self, username: &str, password: &str) -> Result<TemporaryCredentials> {
        match self.exchange(username, password).await {
            Ok(creds) => {
                tracing::info!("Obtained temporary credentials for {}", username);
                Ok(creds)
            }
            Err(e) => {
                tracing::error!("{}", e);
                Err(CourseBotError::Auth(e))
            }
        }
    }
}

/// Map a Cognito error response onto the auth failure kinds
pub fn classify_error(status: u16, body: &str) -> AuthError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error_type = parsed["__type"]
        .as_str()
        .map(|t| t.rsplit('#').next().unwrap_or(t))
        .unwrap_or_default();

    match error_type {
        "NotAuthorizedException" => AuthError::InvalidCredentials,
        "UserNotFoundException" => AuthError::UserNotFound,
        _ => {
            let message = parsed["message"]
                .as_str()
                .or_else(|| parsed["Message"].as_str())
                .unwrap_or(body);
            if error_type.is_empty() {
                AuthError::Unexpected(format!("HTTP {}: {}", status, message))
            } else {
                AuthError::Unexpected(format!("{}: {}", error_type, message))
            }
        }
    }
}
