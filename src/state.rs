use std::sync::Arc;

use anyhow::Context;
use mongodb::{Client, Database};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let client = Client::with_uri_str(&config.mongo_url)
            .await
            .context("connect to document store")?;
        let db = client.database(&config.db_name);
        Ok(Self { client, db, config })
    }

    /// Release the store connection. Call once, after the server has stopped.
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}
