//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::apps::{self, AppId};
use super::voices;
use crate::audio::SUPPORTED_BITRATES;

/// Flashcard audio generator configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "flashcard-audio")]
#[command(author, version, about = "Batch-generate flashcard audio with Gemini TTS", long_about = None)]
pub struct AppConfig {
    /// List the flashcard apps and exit
    #[arg(long)]
    pub list_apps: bool,

    /// List the available Gemini voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Only generate audio for this app (default: all apps)
    #[arg(long, short = 'a', value_enum)]
    pub app: Option<AppId>,

    /// Regenerate files that already exist
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Generative Language API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = "https://generativelanguage.googleapis.com/v1beta")]
    pub api_base: String,

    /// Gemini TTS model name
    #[arg(long, short = 'm', env = "GEMINI_TTS_MODEL", default_value = "gemini-2.5-flash-preview-tts")]
    pub model: String,

    /// Voice for Japanese apps
    #[arg(long, default_value = "Kore")]
    pub voice_ja: String,

    /// Voice for English apps
    #[arg(long, default_value = "Aoede")]
    pub voice_en: String,

    /// Audio root directory; each app writes to its own subdirectory
    #[arg(long, short = 'o', default_value = "edup-app/public/audio")]
    pub output_dir: PathBuf,

    /// Seconds between requests (keeps under the requests-per-minute quota)
    #[arg(long, default_value = "8")]
    pub delay: u64,

    /// Maximum words per batch request
    #[arg(long, default_value = "50")]
    pub batch_size: usize,

    /// Maximum requests per run, retries and per-word fallback included
    #[arg(long, default_value = "200")]
    pub max_requests: u32,

    /// Attempts per request before giving up
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Base wait in seconds after a rate-limit error, multiplied by the attempt number
    #[arg(long, default_value = "60")]
    pub rate_limit_wait: u64,

    /// Wait in seconds after any other retryable error
    #[arg(long, default_value = "5")]
    pub retry_delay: u64,

    /// Shortest pause (ms) that separates two words
    #[arg(long, default_value = "800")]
    pub silence_min_len: u32,

    /// Level (dBFS) at or below which audio counts as silence
    #[arg(long, default_value = "-36", allow_hyphen_values = true)]
    pub silence_thresh: f32,

    /// Silence (ms) kept before and after each word
    #[arg(long, default_value = "150")]
    pub silence_keep: u32,

    /// MP3 bitrate in kbps
    #[arg(long, default_value = "128")]
    pub bitrate: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "120")]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let config = Self::parse();

        if config.list_apps {
            apps::print_apps();
            std::process::exit(0);
        }

        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        config
    }

    /// The API key, if one was given and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    /// Apps selected for this run.
    pub fn selected_apps(&self) -> Vec<AppId> {
        match self.app {
            Some(app) => vec![app],
            None => AppId::ALL.to_vec(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("Batch size must be at least 1");
        }

        if self.max_requests == 0 {
            anyhow::bail!("Max requests must be at least 1");
        }

        if self.max_retries == 0 {
            anyhow::bail!("Max retries must be at least 1");
        }

        if self.silence_min_len == 0 {
            anyhow::bail!("Silence min length must be positive");
        }

        if self.silence_thresh >= 0.0 {
            anyhow::bail!("Silence threshold must be below 0 dBFS, got {}", self.silence_thresh);
        }

        if !SUPPORTED_BITRATES.contains(&self.bitrate) {
            anyhow::bail!("Bitrate must be one of {:?} kbps, got {}", SUPPORTED_BITRATES, self.bitrate);
        }

        if self.timeout == 0 {
            anyhow::bail!("Timeout must be positive");
        }

        if self.model.trim().is_empty() {
            anyhow::bail!("Model name must not be empty");
        }

        for voice in [&self.voice_ja, &self.voice_en] {
            if voices::get_voice(voice).is_none() {
                warn!("Unknown voice '{}', see --list-voices", voice);
            }
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Model: {}", self.model);
        info!("  Voices: ja={}, en={}", self.voice_ja, self.voice_en);
        info!("  Output directory: {}", self.output_dir.display());
        info!("  Batch size: {}", self.batch_size);
        info!("  Request delay: {}s", self.delay);
        info!("  Max requests: {}", self.max_requests);
        info!("  Retries: {} (rate limit wait {}s, retry delay {}s)", self.max_retries, self.rate_limit_wait, self.retry_delay);
        info!("  Silence: min {}ms, threshold {}dBFS, keep {}ms", self.silence_min_len, self.silence_thresh, self.silence_keep);
        info!("  MP3 bitrate: {} kbps", self.bitrate);
        if self.force {
            info!("  Force: regenerating existing files");
        }
    }
}
