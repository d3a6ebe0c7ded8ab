//! Audio handling for synthesized speech.
//!
//! This module decodes the raw PCM returned by the TTS provider, splits combined
//! multi-word streams on silence gaps and exports clips as MP3 via LAME.

mod encode;
mod pcm;
pub mod silence;

use thiserror::Error;

pub use encode::{Mp3Encoder, SUPPORTED_BITRATES};
pub use pcm::{AudioClip, DEFAULT_SAMPLE_RATE, RawAudioStream, rate_from_mime};
pub use silence::{Segmentation, SilenceParams};

/// Errors raised while decoding or encoding audio.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("PCM payload has odd length {0} (expected 16-bit samples)")]
    OddLength(usize),
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("Unsupported MP3 bitrate: {0} kbps")]
    UnsupportedBitrate(u32),
    #[error("Cannot encode an empty clip")]
    EmptyClip,
    #[error("MP3 encoder error: {0}")]
    Encoder(String),
}
