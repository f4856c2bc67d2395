//! LLM Generation Module
//!
//! Provides the boundary to the upstream model that writes coaching text.
//!
//! ## Architecture
//!
//! - **GenerationInvoker**: trait the coaching service calls on a cache miss
//! - **OpenRouterClient**: OpenRouter chat-completions implementation
//! - **prompt**: system/user prompt templating
//! - **models**: model catalog and token budgets

use async_trait::async_trait;
use std::time::Duration;

pub mod models;
mod openrouter;
pub mod prompt;

pub use openrouter::OpenRouterClient;

use crate::types::{PromptContext, TelemetrySample};

/// Unified trait for coaching-message generators
#[async_trait]
pub trait GenerationInvoker: Send + Sync {
    /// Produce one coaching message for the sample
    async fn generate(
        &self,
        sample: &TelemetrySample,
        ctx: &PromptContext,
    ) -> Result<String, GenerationError>;

    /// Whether credentials are present (reported by the health endpoint)
    fn is_configured(&self) -> bool {
        true
    }

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Generation failures. Never shown to the runner; the caller falls back.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("upstream API key is not configured")]
    NotConfigured,
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream returned empty content")]
    EmptyContent,
}
