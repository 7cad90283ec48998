//! Usage gatekeeper: holds the user's plan and usage and guards actions behind
//! the backend's limit check.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use askama::Template;
use shared::config::DEFAULT_SUBSCRIPTIONS_ROUTE;
use shared::{
    plan_display_name, ApiError, BackendApi, LimitCheckResult, LimitReachedModalTemplate,
    LimitType, Plan, PlanLimits, Usage, LIMIT_MODAL_CSS, MODAL_STYLE_MARKER, NO_PLAN_LABEL,
    UNLIMITED,
};
use tracing::{debug, error, info, warn};

use crate::dom::{Document, Element, StyleSheet};

pub const MODAL_CLASS: &str = "subscription-limit-modal";
pub const LIMIT_CHECK_FAILED_REASON: &str =
    "Error verificando límites. Por favor, recarga la página.";

#[derive(Debug, Default)]
struct ManagerState {
    plan: Option<Plan>,
    usage: Option<Usage>,
    /// Limits reported alongside usage. The current-subscription payload may
    /// omit them.
    usage_limits: Option<PlanLimits>,
    initialized: bool,
}

impl ManagerState {
    fn fill_plan_limits(&mut self) {
        let (Some(plan), Some(limits)) = (self.plan.as_mut(), self.usage_limits.as_ref()) else {
            return;
        };
        if !plan.is_none() && plan.limits == PlanLimits::default() {
            plan.limits = limits.clone();
        }
    }
}

pub struct SubscriptionManager {
    api: Arc<dyn BackendApi>,
    document: Document,
    subscriptions_route: String,
    state: Mutex<ManagerState>,
}

impl SubscriptionManager {
    pub fn new(api: Arc<dyn BackendApi>, document: Document) -> Self {
        Self {
            api,
            document,
            subscriptions_route: DEFAULT_SUBSCRIPTIONS_ROUTE.to_string(),
            state: Mutex::new(ManagerState::default()),
        }
    }

    pub fn with_subscriptions_route(mut self, route: impl Into<String>) -> Self {
        self.subscriptions_route = route.into();
        self
    }

    // Never held across an await.
    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads plan and usage concurrently. Fails as a whole if either request fails.
    pub async fn initialize(&self) -> bool {
        match tokio::try_join!(self.load_current_plan(), self.load_usage()) {
            Ok((plan, _)) => {
                self.state().initialized = true;
                info!("✅ Subscription manager initialized: plan={} status={}", plan.plan_name, plan.status);
                true
            }
            Err(e) => {
                error!(error = %e, "Error initializing subscription manager");
                false
            }
        }
    }

    pub async fn load_current_plan(&self) -> Result<Plan, ApiError> {
        let response = self.api.current_subscription().await.map_err(|e| {
            error!(error = %e, "Error loading current plan");
            e
        })?;

        let plan = match response.subscription {
            Some(plan) if response.success => plan,
            _ => {
                if let Some(reason) = response.error.as_deref() {
                    warn!(reason, "Backend did not return a subscription");
                }
                debug!("No active subscription, using restricted plan");
                Plan::none()
            }
        };

        let mut state = self.state();
        state.plan = Some(plan);
        state.fill_plan_limits();
        Ok(state.plan.clone().unwrap_or_else(Plan::none))
    }

    pub async fn load_usage(&self) -> Result<Usage, ApiError> {
        let response = self.api.usage().await.map_err(|e| {
            error!(error = %e, "Error loading usage");
            e
        })?;

        let usage = if response.success {
            if let Some(limits) = response.limits {
                let mut state = self.state();
                state.usage_limits = Some(limits);
                state.fill_plan_limits();
            }
            response.usage.unwrap_or_default()
        } else {
            if let Some(reason) = response.error.as_deref() {
                warn!(reason, "Backend did not return usage");
            }
            Usage::default()
        };

        self.state().usage = Some(usage.clone());
        Ok(usage)
    }

    /// Asks the backend whether one more action of `limit_type` is allowed.
    /// Any failure is reported as a denial.
    pub async fn check_limit(&self, limit_type: LimitType) -> LimitCheckResult {
        debug!(%limit_type, "Checking limit");

        match self.api.check_limit(limit_type).await {
            Ok(response) if response.allowed => {
                debug!(%limit_type, "Action allowed");
                LimitCheckResult::allowed()
            }
            Ok(response) => {
                info!(
                    %limit_type,
                    limit = ?response.limit,
                    current = ?response.current,
                    "Limit reached"
                );
                let reason = response
                    .reason
                    .unwrap_or_else(|| format!("Has alcanzado el límite de {}", limit_type));
                LimitCheckResult::denied(reason, response.limit, response.current)
            }
            Err(e) => {
                error!("❌ Error checking limit for {}: {}", limit_type, e);
                LimitCheckResult::denied(LIMIT_CHECK_FAILED_REASON, None, None)
            }
        }
    }

    /// Appends a dismissible "limit reached" overlay to the document and
    /// returns its element id. The modal stylesheet is injected at most once.
    pub fn show_limit_reached_modal(
        &self,
        limit_type: LimitType,
        info: &LimitCheckResult,
    ) -> Result<String, askama::Error> {
        let modal_id = self.document.next_id(MODAL_CLASS);
        let content_id = format!("{}-content", modal_id);
        let upgrade_id = format!("{}-upgrade", modal_id);
        let close_id = format!("{}-close", modal_id);

        let html = LimitReachedModalTemplate::new(
            modal_id.clone(),
            limit_type,
            info,
            self.subscriptions_route.clone(),
        )
        .render()?;

        if !self.document.has_stylesheet(MODAL_STYLE_MARKER) {
            self.document
                .add_stylesheet(StyleSheet::tagged(MODAL_STYLE_MARKER, LIMIT_MODAL_CSS));
        }

        self.document
            .append_element(Element::new(modal_id.clone()).with_class(MODAL_CLASS).with_html(html));
        self.document
            .append_element(Element::new(content_id.clone()).with_parent(modal_id.clone()));
        self.document.append_element(
            Element::new(upgrade_id.clone())
                .with_class("btn-upgrade")
                .with_parent(content_id.clone()),
        );
        self.document.append_element(
            Element::new(close_id.clone())
                .with_class("btn-cancel")
                .with_parent(content_id),
        );

        let listener_slot = Arc::new(OnceLock::new());
        let slot = Arc::clone(&listener_slot);
        let route = self.subscriptions_route.clone();
        let id = modal_id.clone();
        let listener = self.document.add_click_listener(move |doc, event| {
            if event.target == upgrade_id {
                doc.navigate(route.clone());
            } else if event.target == id || event.target == close_id {
                doc.remove_element(&id);
                if let Some(listener) = slot.get() {
                    doc.remove_click_listener(*listener);
                }
            }
        });
        let _ = listener_slot.set(listener);

        info!(%limit_type, modal = %modal_id, "Limit reached modal shown");
        Ok(modal_id)
    }

    /// Runs `action` only when the limit check allows it, then refreshes usage.
    ///
    /// Returns `Ok(false)` without running the action when denied. Check, act
    /// and refresh are not serialized: two concurrent calls may both pass the
    /// check before either acts.
    pub async fn execute_if_allowed<F, Fut>(
        &self,
        limit_type: LimitType,
        action: F,
    ) -> anyhow::Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        if !self.is_initialized() {
            self.initialize().await;
        }

        let check = self.check_limit(limit_type).await;
        if !check.allowed {
            if let Err(e) = self.show_limit_reached_modal(limit_type, &check) {
                error!(%limit_type, error = %e, "Failed to render limit reached modal");
            }
            return Ok(false);
        }

        action().await?;
        self.load_usage().await?;

        Ok(true)
    }

    pub fn plan_info(&self) -> Option<Plan> {
        self.state().plan.clone()
    }

    pub fn usage_info(&self) -> Option<Usage> {
        self.state().usage.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn is_plan_active(&self) -> bool {
        self.state()
            .plan
            .as_ref()
            .map(Plan::is_active)
            .unwrap_or(false)
    }

    /// How many more actions of `limit_type` the loaded plan allows. `None`
    /// when the plan is unlimited for that type or plan/usage are not loaded.
    pub fn remaining(&self, limit_type: LimitType) -> Option<i64> {
        let state = self.state();
        let limit = state.plan.as_ref()?.limits.get(limit_type);
        let used = state.usage.as_ref()?.get(limit_type);
        if limit == UNLIMITED {
            return None;
        }
        Some((limit - used).max(0))
    }

    pub fn plan_name(&self) -> String {
        match self.state().plan.as_ref() {
            Some(plan) if !plan.is_none() => plan_display_name(&plan.plan_name),
            _ => NO_PLAN_LABEL.to_string(),
        }
    }
}
