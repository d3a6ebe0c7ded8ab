//! Synthesis provider seam and its error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use super::Language;
use crate::audio::RawAudioStream;

/// Failure reported by a synthesis provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },
    #[error("Request rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Empty response: {0}")]
    Empty(String),
    #[error("Blocked: finish_reason={0}")]
    Blocked(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Rate-limit and quota errors get the long, escalating cooldown.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }

    /// Everything except an outright rejection of the request may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::Rejected { .. })
    }
}

/// A text-to-speech service that turns one prompt into one audio stream.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `prompt` with the given voice.
    ///
    /// # Arguments
    /// * `prompt` - Full instruction text (batch or single-item)
    /// * `voice` - Provider voice identifier
    /// * `language` - Language of the items being spoken
    ///
    /// # Returns
    /// The decoded audio for the whole prompt.
    async fn synthesize(&self, prompt: &str, voice: &str, language: Language) -> Result<RawAudioStream, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ProviderError::RateLimited("429".into()).is_rate_limit());
        assert!(ProviderError::RateLimited("429".into()).is_retryable());
        assert!(ProviderError::Transport("timed out".into()).is_retryable());
        assert!(ProviderError::Blocked("SAFETY".into()).is_retryable());
        assert!(!ProviderError::Server { status: 503, body: String::new() }.is_rate_limit());

        let rejected = ProviderError::Rejected { status: 401, body: "API key not valid".into() };
        assert!(!rejected.is_retryable());
        assert!(!rejected.is_rate_limit());
    }
}
