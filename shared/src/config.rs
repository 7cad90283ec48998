use dotenv::dotenv;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SUBSCRIPTIONS_ROUTE: &str = "/subscriptions";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub subscriptions_route: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            anyhow::bail!("API_BASE_URL must be an http(s) URL, got: {}", api_base_url);
        }

        Ok(Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            auth_token: std::env::var("AUTH_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            subscriptions_route: std::env::var("SUBSCRIPTIONS_ROUTE")
                .unwrap_or_else(|_| DEFAULT_SUBSCRIPTIONS_ROUTE.to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            subscriptions_route: DEFAULT_SUBSCRIPTIONS_ROUTE.to_string(),
        }
    }
}
