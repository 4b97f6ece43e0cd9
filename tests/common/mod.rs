#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use study_chat_backend::error::GenerationError;
use study_chat_backend::services::generator::TextGenerator;

/// Replays a fixed script of upstream outcomes and records every prompt.
/// Once the script runs out it keeps answering with `fallback`.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Result<String, GenerationError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(
        script: Vec<Result<String, GenerationError>>,
        fallback: Result<String, GenerationError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn always(outcome: Result<String, GenerationError>) -> Arc<Self> {
        Self::new(Vec::new(), outcome)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Never answers; used to exercise the request deadline.
pub struct HangingGenerator;

#[async_trait]
impl TextGenerator for HangingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        std::future::pending().await
    }
}

pub fn overloaded() -> GenerationError {
    GenerationError::Overloaded {
        status: 503,
        message: "The model is overloaded. Please try again later.".to_string(),
    }
}

pub fn unauthorized() -> GenerationError {
    GenerationError::Unauthorized {
        status: 403,
        message: "API key not valid.".to_string(),
    }
}
