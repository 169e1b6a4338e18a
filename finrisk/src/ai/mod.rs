//! Model provider abstraction.
//!
//! A model provider is an opaque text-in/text-out completion service. The
//! query service only ever sees this trait, so tests substitute fakes and
//! the concrete client can change without touching the core.

use async_trait::async_trait;

pub mod openai;

pub use crate::error::{AiError, AiResult};
pub use openai::OpenAiClient;

/// Opaque completion service: one prompt in, one textual response out.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Submit one prompt and return the model's textual response.
    async fn complete(&self, prompt: &str) -> AiResult<String>;
}
