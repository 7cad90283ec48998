use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    CheckLimitResponse, CurrentSubscriptionResponse, CurrentUserResponse, LimitType, UsageResponse,
};

pub const CURRENT_SUBSCRIPTION_PATH: &str = "/api/subscriptions/current";
pub const USAGE_PATH: &str = "/api/subscriptions/usage";
pub const CHECK_LIMIT_PATH: &str = "/api/subscriptions/check-limit";
pub const CURRENT_USER_PATH: &str = "/api/auth/me";

/// Backend endpoints consumed by the portal widgets.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn current_subscription(&self) -> Result<CurrentSubscriptionResponse, ApiError>;
    async fn usage(&self) -> Result<UsageResponse, ApiError>;
    async fn check_limit(&self, limit_type: LimitType) -> Result<CheckLimitResponse, ApiError>;
    async fn current_user(&self) -> Result<CurrentUserResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let client = Self::new(config.api_base_url.clone());
        match &config.auth_token {
            Some(token) => client.with_auth_token(token.clone()),
            None => client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the JSON body. The status code is not checked:
    /// the backend reports application errors as JSON bodies on 4xx/5xx.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        debug!(path, %status, "Backend responded");

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn current_subscription(&self) -> Result<CurrentSubscriptionResponse, ApiError> {
        self.get_json(CURRENT_SUBSCRIPTION_PATH).await
    }

    async fn usage(&self) -> Result<UsageResponse, ApiError> {
        self.get_json(USAGE_PATH).await
    }

    async fn check_limit(&self, limit_type: LimitType) -> Result<CheckLimitResponse, ApiError> {
        self.get_json(&format!("{}/{}", CHECK_LIMIT_PATH, limit_type.as_str()))
            .await
    }

    async fn current_user(&self) -> Result<CurrentUserResponse, ApiError> {
        self.get_json(CURRENT_USER_PATH).await
    }
}
