use anyhow::Result;
use portal::services::subscription_manager::MODAL_CLASS;
use portal::PageController;
use shared::{Config, LimitType};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting portal...");

    let config = Config::from_env()?;
    tracing::info!(api_base_url = %config.api_base_url, "Configuration loaded");

    // Optional gated action, e.g. `portal backtest`
    let requested = match std::env::args().nth(1) {
        Some(arg) => Some(
            LimitType::from_str(&arg)
                .ok_or_else(|| anyhow::anyhow!("Unknown limit type: {}", arg))?,
        ),
        None => None,
    };

    let mut page = PageController::from_config(config);
    page.load().await;

    let subscriptions = page.subscriptions.clone();
    tracing::info!(
        plan = %subscriptions.plan_name(),
        active = subscriptions.is_plan_active(),
        "Current plan"
    );
    if let Some(usage) = subscriptions.usage_info() {
        tracing::info!(
            backtests = usage.backtests,
            signal_bots = usage.signal_bots,
            auto_bots = usage.auto_bots,
            strategies = usage.strategies,
            operations_today = usage.operations_today,
            "Current usage"
        );
    }
    for limit_type in LimitType::ALL {
        match subscriptions.remaining(limit_type) {
            Some(remaining) => tracing::info!("{}: {} remaining", limit_type.display_name(), remaining),
            None => tracing::info!("{}: no ceiling", limit_type.display_name()),
        }
    }

    if let Some(limit_type) = requested {
        let allowed = subscriptions
            .execute_if_allowed(limit_type, || async move {
                tracing::info!(%limit_type, "Action allowed, running");
                Ok::<(), anyhow::Error>(())
            })
            .await?;

        if !allowed {
            for modal in page.document.elements_with_class(MODAL_CLASS) {
                println!("{}", modal.inner_html);
            }
        }
    }

    page.unload();
    Ok(())
}
