use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;

/// The deployed backend this dashboard was built against. Overridable via
/// DASH_API_URL (or --api-url, which sets that variable).
pub const DEFAULT_API_URL: &str =
    "https://data-visualisation-dashboard-backend-xm6j.onrender.com/api/data";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
}

/// Initializes the application configuration.
/// Loads a .env file if present, then resolves the backend endpoint.
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let api_url = env::var("DASH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    if api_url.trim().is_empty() {
        return Err(eyre!("DASH_API_URL is set but empty"));
    }

    Ok(AppConfig { api_url })
}
