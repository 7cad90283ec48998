pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod templates;

pub use client::{BackendApi, BackendClient};
pub use config::Config;
pub use error::ApiError;
pub use models::*;
pub use templates::{LimitReachedModalTemplate, LIMIT_MODAL_CSS, MODAL_STYLE_MARKER};
