use askama::Template;

use crate::models::{LimitCheckResult, LimitType, UNLIMITED};

/// Attribute that tags the injected modal stylesheet so it is only added once.
pub const MODAL_STYLE_MARKER: &str = "data-subscription-modal";

pub const LIMIT_MODAL_CSS: &str = include_str!("../templates/limit_reached_modal.css");

const UNLIMITED_LABEL: &str = "Ilimitado";
const MISSING_VALUE: &str = "-";

#[derive(Template)]
#[template(path = "limit_reached_modal.html")]
pub struct LimitReachedModalTemplate {
    pub modal_id: String,
    pub type_name: String,
    pub reason: Option<String>,
    pub current: String,
    pub limit: String,
    pub upgrade_route: String,
}

impl LimitReachedModalTemplate {
    pub fn new(
        modal_id: impl Into<String>,
        limit_type: LimitType,
        info: &LimitCheckResult,
        upgrade_route: impl Into<String>,
    ) -> Self {
        let limit = match info.limit {
            Some(UNLIMITED) => UNLIMITED_LABEL.to_string(),
            Some(value) => value.to_string(),
            None => MISSING_VALUE.to_string(),
        };
        let current = info
            .current
            .map(|value| value.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_string());

        Self {
            modal_id: modal_id.into(),
            type_name: limit_type.display_name().to_string(),
            reason: info.reason.clone(),
            current,
            limit,
            upgrade_route: upgrade_route.into(),
        }
    }
}
