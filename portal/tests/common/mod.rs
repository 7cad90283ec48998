#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    ApiError, BackendApi, CheckLimitResponse, CurrentSubscriptionResponse, CurrentUserResponse,
    LimitType, UsageResponse,
};

/// Scripted backend. A `None` reply makes the call fail like a malformed response.
#[derive(Default)]
pub struct FakeBackend {
    pub subscription: Mutex<Option<Value>>,
    pub usage: Mutex<Option<Value>>,
    pub check_limit: Mutex<Option<Value>>,
    pub current_user: Mutex<Option<Value>>,
    pub subscription_calls: AtomicUsize,
    pub usage_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    pub checked: Mutex<Vec<LimitType>>,
}

impl FakeBackend {
    /// Active pro_monthly plan, some usage, every check allowed.
    pub fn pro_monthly() -> Self {
        let backend = Self::default();
        backend.set_subscription(Some(json!({
            "success": true,
            "subscription": {
                "plan_name": "pro_monthly",
                "status": "active",
                "limits": {
                    "backtests": 50,
                    "signal_bots": 5,
                    "auto_bots": 2,
                    "operations_per_day": 100,
                    "indicators": -1,
                    "strategies": 20
                }
            }
        })));
        backend.set_usage(Some(json!({
            "success": true,
            "usage": { "backtests": 3, "signal_bots": 1, "auto_bots": 0, "strategies": 4 }
        })));
        backend.set_check_limit(Some(json!({ "success": true, "allowed": true, "limit": 50, "current": 3 })));
        backend.set_current_user(Some(json!({ "success": true, "user": { "role": "user" } })));
        backend
    }

    pub fn set_subscription(&self, reply: Option<Value>) {
        *self.subscription.lock().unwrap() = reply;
    }

    pub fn set_usage(&self, reply: Option<Value>) {
        *self.usage.lock().unwrap() = reply;
    }

    pub fn set_check_limit(&self, reply: Option<Value>) {
        *self.check_limit.lock().unwrap() = reply;
    }

    pub fn set_current_user(&self, reply: Option<Value>) {
        *self.current_user.lock().unwrap() = reply;
    }

    pub fn usage_calls(&self) -> usize {
        self.usage_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_calls.load(Ordering::SeqCst)
    }
}

fn reply<T: serde::de::DeserializeOwned>(path: &str, value: &Mutex<Option<Value>>) -> Result<T, ApiError> {
    let body = value
        .lock()
        .unwrap()
        .clone()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<html>502 Bad Gateway</html>".to_string());
    serde_json::from_str(&body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn current_subscription(&self) -> Result<CurrentSubscriptionResponse, ApiError> {
        self.subscription_calls.fetch_add(1, Ordering::SeqCst);
        reply("/api/subscriptions/current", &self.subscription)
    }

    async fn usage(&self) -> Result<UsageResponse, ApiError> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        reply("/api/subscriptions/usage", &self.usage)
    }

    async fn check_limit(&self, limit_type: LimitType) -> Result<CheckLimitResponse, ApiError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.checked.lock().unwrap().push(limit_type);
        reply("/api/subscriptions/check-limit", &self.check_limit)
    }

    async fn current_user(&self) -> Result<CurrentUserResponse, ApiError> {
        reply("/api/auth/me", &self.current_user)
    }
}
