//! Text-to-speech module.
//!
//! Defines the provider seam used by the pipeline, the prompt contract for
//! multi-word requests and the Gemini REST implementation.

mod gemini;
mod prompt;
mod provider;

pub use gemini::GeminiTts;
pub use prompt::{Language, build_batch_prompt, build_single_prompt};
pub use provider::{ProviderError, SpeechProvider};
