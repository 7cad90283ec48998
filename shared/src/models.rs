use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit value meaning "no ceiling".
pub const UNLIMITED: i64 = -1;

/// Plan identifier used when the user has no active subscription.
pub const NO_PLAN: &str = "none";

pub const NO_PLAN_LABEL: &str = "Sin Plan";

pub const ACTIVE_STATUS: &str = "active";
pub const INACTIVE_STATUS: &str = "inactive";

/// Gated action categories accepted by the check-limit endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitType {
    Backtest,
    SignalBot,
    AutoBot,
    Strategy,
}

impl LimitType {
    pub const ALL: [LimitType; 4] = [
        LimitType::Backtest,
        LimitType::SignalBot,
        LimitType::AutoBot,
        LimitType::Strategy,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "backtest" => Some(Self::Backtest),
            "signal_bot" => Some(Self::SignalBot),
            "auto_bot" => Some(Self::AutoBot),
            "strategy" => Some(Self::Strategy),
            _ => None,
        }
    }

    /// Wire name, also the last path segment of the check-limit endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backtest => "backtest",
            Self::SignalBot => "signal_bot",
            Self::AutoBot => "auto_bot",
            Self::Strategy => "strategy",
        }
    }

    /// Label shown to the user in the limit-reached modal.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Backtest => "Backtests",
            Self::SignalBot => "Signal Bots",
            Self::AutoBot => "Auto Trading Bots",
            Self::Strategy => "Estrategias",
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    #[serde(default)]
    pub backtests: i64,
    #[serde(default)]
    pub signal_bots: i64,
    #[serde(default)]
    pub auto_bots: i64,
    #[serde(default)]
    pub operations_per_day: i64,
    #[serde(default)]
    pub indicators: i64,
    #[serde(default)]
    pub strategies: i64,
}

impl PlanLimits {
    pub fn get(&self, limit_type: LimitType) -> i64 {
        match limit_type {
            LimitType::Backtest => self.backtests,
            LimitType::SignalBot => self.signal_bots,
            LimitType::AutoBot => self.auto_bots,
            LimitType::Strategy => self.strategies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_name: String,
    pub status: String,
    #[serde(default)]
    pub limits: PlanLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl Plan {
    /// Restricted plan substituted when the backend reports no active subscription.
    pub fn none() -> Self {
        Self {
            plan_name: NO_PLAN.to_string(),
            status: INACTIVE_STATUS.to_string(),
            limits: PlanLimits::default(),
            display_name: None,
            start_date: None,
            end_date: None,
            days_remaining: None,
            payment_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    pub fn is_none(&self) -> bool {
        self.plan_name == NO_PLAN
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub backtests: i64,
    #[serde(default)]
    pub signal_bots: i64,
    #[serde(default)]
    pub auto_bots: i64,
    #[serde(default)]
    pub operations_today: i64,
    #[serde(default)]
    pub strategies: i64,
}

impl Usage {
    pub fn get(&self, limit_type: LimitType) -> i64 {
        match limit_type {
            LimitType::Backtest => self.backtests,
            LimitType::SignalBot => self.signal_bots,
            LimitType::AutoBot => self.auto_bots,
            LimitType::Strategy => self.strategies,
        }
    }
}

/// Outcome of a single limit check. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitCheckResult {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
}

impl LimitCheckResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            ..Default::default()
        }
    }

    pub fn denied(reason: impl Into<String>, limit: Option<i64>, current: Option<i64>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            limit,
            current,
        }
    }
}

/// Display label for a plan identifier. Unknown identifiers are returned as-is.
pub fn plan_display_name(plan_name: &str) -> String {
    match plan_name {
        "free_trial" => "Free Trial".to_string(),
        "pro_monthly" => "Pro Monthly".to_string(),
        "pro_annual" => "Pro Annual".to_string(),
        other => other.to_string(),
    }
}

// Wire envelopes returned by the backend

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentSubscriptionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub subscription: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<PlanLimits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckLimitResponse {
    /// Error bodies carry no `allowed` field; they decode as a denial.
    #[serde(default)]
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub current: Option<i64>,
    #[serde(default)]
    pub remaining: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub subscription_tier: Option<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<CurrentUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_without_limits_decodes() {
        let body = json!({
            "success": true,
            "subscription": {
                "plan_name": "pro_monthly",
                "display_name": "Pro Mensual",
                "start_date": "2025-01-01T00:00:00",
                "end_date": "2025-02-01T00:00:00",
                "days_remaining": 12,
                "status": "active",
                "payment_id": "pay_123"
            }
        });
        let response: CurrentSubscriptionResponse = serde_json::from_value(body).unwrap();
        let plan = response.subscription.unwrap();

        assert_eq!(plan.plan_name, "pro_monthly");
        assert!(plan.is_active());
        assert_eq!(plan.limits, PlanLimits::default());
        assert_eq!(plan.days_remaining, Some(12));
    }

    #[test]
    fn test_error_body_is_a_denial() {
        let response: CheckLimitResponse =
            serde_json::from_value(json!({ "success": false, "error": "No autenticado" })).unwrap();
        assert!(!response.allowed);
        assert!(response.limit.is_none());
    }

    #[test]
    fn test_none_plan_is_zeroed_and_inactive() {
        let plan = Plan::none();
        assert!(plan.is_none());
        assert!(!plan.is_active());
        assert_eq!(plan.status, "inactive");
        for limit_type in LimitType::ALL {
            assert_eq!(plan.limits.get(limit_type), 0);
        }
    }

    #[test]
    fn test_limit_type_names() {
        for limit_type in LimitType::ALL {
            assert_eq!(LimitType::from_str(limit_type.as_str()), Some(limit_type));
        }
        assert_eq!(LimitType::from_str("SIGNAL_BOT"), Some(LimitType::SignalBot));
        assert_eq!(LimitType::from_str("indicator"), None);
        assert_eq!(LimitType::AutoBot.display_name(), "Auto Trading Bots");
        assert_eq!(
            serde_json::to_value(LimitType::SignalBot).unwrap(),
            json!("signal_bot")
        );
    }

    #[test]
    fn test_plan_display_name() {
        assert_eq!(plan_display_name("free_trial"), "Free Trial");
        assert_eq!(plan_display_name("pro_monthly"), "Pro Monthly");
        assert_eq!(plan_display_name("pro_annual"), "Pro Annual");
        assert_eq!(plan_display_name("enterprise"), "enterprise");
    }

    #[test]
    fn test_admin_role() {
        let user: CurrentUser = serde_json::from_value(json!({ "id": 7, "role": "admin" })).unwrap();
        assert!(user.is_admin());
        assert!(!CurrentUser::default().is_admin());
    }
}
