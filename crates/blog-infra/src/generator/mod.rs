//! Content generator adapters.

mod openai;

pub use openai::{OpenAiConfig, OpenAiGenerator};
