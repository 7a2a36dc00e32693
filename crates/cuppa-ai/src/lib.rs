//! Prompt-to-filter translation through a generative-language model.
//!
//! A free-text request plus optional coordinates goes out as a single
//! `generateContent` call; the model's reply is pulled out of any
//! surrounding prose or code fences and classified as a café search,
//! an unrelated request, or a request that needs clarification.

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod translate;

pub use client::GeminiClient;
pub use error::AiError;
pub use extract::extract_json;
pub use translate::{parse_translation, FilterTranslator, Translation};
