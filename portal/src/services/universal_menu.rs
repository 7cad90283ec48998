use std::sync::Arc;

use shared::BackendApi;
use tracing::{debug, error};

use crate::dom::{Document, Element, ListenerId};

pub const UNIVERSAL_MENU_ID: &str = "universalMenu";
pub const UNIVERSAL_MENU_CLASS: &str = "universal-menu";
pub const UNIVERSAL_MENU_CONTAINER_ID: &str = "universalMenuContainer";
pub const UNIVERSAL_MENU_TOGGLE_ID: &str = "universalMenuToggle";
pub const ADMIN_MENU_LINK_ID: &str = "adminMenuLink";
pub const ACTIVE_CLASS: &str = "active";

/// Registers the shared menu markup: container, toggle button, dropdown and
/// the admin link, hidden until an admin is confirmed.
pub fn mount_layout(document: &Document) {
    document.append_element(
        Element::new(UNIVERSAL_MENU_CONTAINER_ID).with_class(UNIVERSAL_MENU_CLASS),
    );
    document.append_element(
        Element::new(UNIVERSAL_MENU_TOGGLE_ID)
            .with_class("universal-menu-toggle")
            .with_parent(UNIVERSAL_MENU_CONTAINER_ID),
    );
    document.append_element(
        Element::new(UNIVERSAL_MENU_ID)
            .with_class("universal-menu-content")
            .with_parent(UNIVERSAL_MENU_CONTAINER_ID),
    );
    document.append_element(
        Element::new(ADMIN_MENU_LINK_ID)
            .with_parent(UNIVERSAL_MENU_ID)
            .hidden(),
    );
}

pub struct UniversalMenu {
    document: Document,
    api: Arc<dyn BackendApi>,
}

impl UniversalMenu {
    pub fn new(document: Document, api: Arc<dyn BackendApi>) -> Self {
        Self { document, api }
    }

    /// Flips the dropdown's visibility. Returns whether it is now open.
    pub fn toggle(&self) -> bool {
        self.document
            .toggle_class(UNIVERSAL_MENU_ID, ACTIVE_CLASS)
            .unwrap_or(false)
    }

    pub fn is_open(&self) -> bool {
        self.document
            .element(UNIVERSAL_MENU_ID)
            .map(|menu| menu.has_class(ACTIVE_CLASS))
            .unwrap_or(false)
    }

    /// Wires the menu's page events: a click on the toggle control flips the
    /// dropdown, a click outside the menu container closes it. The listener
    /// lives as long as the returned guard.
    pub fn register_listeners(&self) -> MenuListener {
        let id = self.document.add_click_listener(|doc, event| {
            if event.target == UNIVERSAL_MENU_TOGGLE_ID {
                doc.toggle_class(UNIVERSAL_MENU_ID, ACTIVE_CLASS);
                return;
            }
            let Some(container) = doc.query_class(UNIVERSAL_MENU_CLASS) else {
                return;
            };
            if doc.element(UNIVERSAL_MENU_ID).is_none() {
                return;
            }
            if !doc.contains(&container.id, &event.target) {
                doc.remove_class(UNIVERSAL_MENU_ID, ACTIVE_CLASS);
            }
        });

        MenuListener {
            document: self.document.clone(),
            id,
        }
    }

    /// Shows the admin link when the backend reports an admin role. Any error
    /// leaves the link hidden.
    pub async fn reveal_admin_link(&self) -> bool {
        match self.api.current_user().await {
            Ok(response) => {
                let is_admin = response.success
                    && response.user.as_ref().map(|u| u.is_admin()).unwrap_or(false);
                if is_admin {
                    debug!("Admin role confirmed, showing admin link");
                    self.document.set_hidden(ADMIN_MENU_LINK_ID, false)
                } else {
                    false
                }
            }
            Err(e) => {
                error!("Error checking user role: {}", e);
                false
            }
        }
    }
}

/// Menu click subscription; dropping it unregisters the listener.
#[must_use = "dropping the guard removes the listener"]
pub struct MenuListener {
    document: Document,
    id: ListenerId,
}

impl Drop for MenuListener {
    fn drop(&mut self) {
        self.document.remove_click_listener(self.id);
    }
}
