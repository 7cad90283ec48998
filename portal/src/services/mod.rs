pub mod subscription_manager;
pub mod universal_menu;
