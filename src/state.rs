// src/state.rs
use std::sync::Arc;

use crate::config::{AppConfig, ChatSettings};
use crate::services::generator::{GeminiClient, TextGenerator};

pub type SharedState = Arc<AppState>;

/// Read-only per-process state. Requests share nothing mutable through it.
pub struct AppState {
    /// `None` when no API key was configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub chat: ChatSettings,
}

impl AppState {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, chat: ChatSettings) -> Self {
        Self { generator, chat }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let generator = match &config.upstream.api_key {
            Some(key) => {
                let client = GeminiClient::new(&config.upstream, key.clone())?;
                Some(Arc::new(client) as Arc<dyn TextGenerator>)
            }
            None => None,
        };
        Ok(Self::new(generator, config.chat.clone()))
    }
}
