pub mod dom;
pub mod services;
pub mod state;

pub use dom::{ClickEvent, Document, Element, ListenerId, StyleSheet};
pub use services::subscription_manager::SubscriptionManager;
pub use services::universal_menu::{MenuListener, UniversalMenu};
pub use state::PageController;
