use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::nasa::NasaClient;
use crate::translate::{MyMemoryClient, Translator};

/// Per-process handles shared by every request. Nothing in here is mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub nasa: Arc<NasaClient>,
    pub translator: Translator,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // One pooled client for NASA, the media host and MyMemory.
        let http_client = Client::builder()
            .timeout(config.http.timeout())
            .connect_timeout(config.http.connect_timeout())
            .build()?;

        let nasa = Arc::new(NasaClient::new(
            http_client.clone(),
            config.nasa.api.url.clone(),
            config.nasa.api.key.clone(),
        ));

        let backend = Arc::new(MyMemoryClient::new(
            http_client,
            config.translation.api_url.clone(),
            config.translation.langpair.clone(),
        ));

        info!(
            "Initialized clients: nasa={}, translation={} ({}), timeout={}s",
            config.nasa.api.url,
            config.translation.api_url,
            config.translation.langpair,
            config.http.timeout_secs
        );

        Ok(Self {
            config: Arc::new(config),
            nasa,
            translator: Translator::new(backend),
        })
    }
}
