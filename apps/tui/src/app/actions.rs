use color_eyre::Result;

use crate::api::{ApiClient, Record};
use crate::config::init_app_config;
use crate::domain::FilterState;

/// Facade over the backend client, so the rest of the app never handles
/// a half-initialized connection.
#[derive(Debug, Default)]
pub struct AppActions {
    client: Option<ApiClient>,
}

impl AppActions {
    pub const fn new() -> Self {
        Self { client: None }
    }

    pub fn initialize(&mut self) -> Result<()> {
        let config = init_app_config()?;
        self.client = Some(ApiClient::new(config.api_url));
        Ok(())
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.client.as_ref().map(ApiClient::endpoint)
    }

    pub async fn fetch_records(&self, filters: &FilterState) -> Result<Vec<Record>> {
        let client = self.client()?;
        client.fetch_records(filters).await.map_err(Into::into)
    }

    /// Cloned client for a spawned fetch task.
    pub fn client_handle(&self) -> Result<ApiClient> {
        self.client().cloned()
    }

    fn client(&self) -> Result<&ApiClient> {
        self.client
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("API client not initialized"))
    }
}
