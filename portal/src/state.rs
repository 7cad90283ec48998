use std::sync::Arc;

use shared::{BackendApi, BackendClient, Config};

use crate::dom::Document;
use crate::services::subscription_manager::SubscriptionManager;
use crate::services::universal_menu::{mount_layout, MenuListener, UniversalMenu};

/// Owns the widgets of one page for its lifetime.
pub struct PageController {
    pub config: Config,
    pub document: Document,
    pub subscriptions: Arc<SubscriptionManager>,
    pub menu: UniversalMenu,
    menu_listener: Option<MenuListener>,
}

impl PageController {
    pub fn new(config: Config, api: Arc<dyn BackendApi>, document: Document) -> Self {
        let subscriptions = Arc::new(
            SubscriptionManager::new(Arc::clone(&api), document.clone())
                .with_subscriptions_route(config.subscriptions_route.clone()),
        );
        let menu = UniversalMenu::new(document.clone(), api);

        Self {
            config,
            document,
            subscriptions,
            menu,
            menu_listener: None,
        }
    }

    pub fn from_config(config: Config) -> Self {
        let api: Arc<dyn BackendApi> = Arc::new(BackendClient::from_config(&config));
        let document = Document::new();
        mount_layout(&document);
        Self::new(config, api, document)
    }

    /// Wires page events and loads both widgets concurrently. Returns whether
    /// the subscription manager initialized.
    pub async fn load(&mut self) -> bool {
        if self.menu_listener.is_none() {
            self.menu_listener = Some(self.menu.register_listeners());
        }

        let (initialized, is_admin) =
            tokio::join!(self.subscriptions.initialize(), self.menu.reveal_admin_link());
        tracing::info!(initialized, is_admin, "Page loaded");
        initialized
    }

    /// Removes page-level listeners before navigating away.
    pub fn unload(&mut self) {
        self.menu_listener = None;
    }
}
