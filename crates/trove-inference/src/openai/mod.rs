//! OpenAI-compatible backend for embeddings and text generation.

mod backend;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_EMBED_MODEL, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL,
    DEFAULT_TIMEOUT_SECS,
};
pub use types::ChatMessage;
