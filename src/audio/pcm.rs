//! PCM containers for provider output and the clips cut from it.

use std::ops::Range;

use super::AudioError;

/// Sample rate used by Gemini TTS when the response does not state one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Full-scale amplitude of a signed 16-bit sample.
pub const MAX_AMPLITUDE: f64 = 32768.0;

/// A decoded mono waveform covering one synthesis response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudioStream {
    samples: Vec<i16>, // Mono 16-bit PCM
    sample_rate: u32,  // Samples per second
}

impl RawAudioStream {
    /// Wrap already decoded samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        Ok(Self { samples, sample_rate })
    }

    /// Decode little-endian signed 16-bit mono PCM bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw PCM payload as returned by the provider
    /// * `sample_rate` - Sample rate stated by the provider
    ///
    /// # Errors
    /// Returns an error if the payload is not a whole number of samples or the rate is zero.
    pub fn from_pcm_s16le(bytes: &[u8], sample_rate: u32) -> Result<Self, AudioError> {
        if bytes.len() % 2 != 0 {
            return Err(AudioError::OddLength(bytes.len()));
        }
        let samples = bytes.chunks_exact(2).map(|pair| i16::from_le_bytes([pair[0], pair[1]])).collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    #[cfg(test)]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Frame index corresponding to a millisecond offset, clamped to the stream.
    pub fn frame_at(&self, ms: u64) -> usize {
        let frame = ms * self.sample_rate as u64 / 1000;
        (frame as usize).min(self.samples.len())
    }

    /// Copy out the samples between two millisecond offsets.
    pub fn clip(&self, range_ms: Range<u64>) -> AudioClip {
        let start = self.frame_at(range_ms.start);
        let end = self.frame_at(range_ms.end).max(start);
        AudioClip { samples: self.samples[start..end].to_vec(), sample_rate: self.sample_rate }
    }

    /// Use the whole stream as one clip (single-item synthesis).
    pub fn into_clip(self) -> AudioClip {
        AudioClip { samples: self.samples, sample_rate: self.sample_rate }
    }
}

/// A contiguous piece of speech destined for one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, for progress reporting.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Extract the sample rate from a provider MIME type such as `audio/L16;codec=pcm;rate=24000`.
pub fn rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';').map(str::trim).find_map(|param| param.strip_prefix("rate=")).and_then(|rate| rate.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_little_endian() {
        let bytes = [0x01, 0x00, 0xff, 0x7f, 0x00, 0x80];
        let audio = RawAudioStream::from_pcm_s16le(&bytes, 24000).unwrap();
        assert_eq!(audio.samples(), &[1, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        let err = RawAudioStream::from_pcm_s16le(&[0, 0, 0], 24000).unwrap_err();
        assert!(matches!(err, AudioError::OddLength(3)));
    }

    #[test]
    fn test_clip_by_milliseconds() {
        let audio = RawAudioStream::new((0..24000).map(|i| (i % 100) as i16).collect(), 24000).unwrap();
        assert_eq!(audio.duration_ms(), 1000);

        let clip = audio.clip(250..500);
        assert_eq!(clip.samples().len(), 6000);
        assert_eq!(clip.samples()[0], audio.samples()[6000]);

        // Ranges past the end are clamped
        let tail = audio.clip(900..5000);
        assert_eq!(tail.samples().len(), 2400);
    }

    #[test]
    fn test_rate_from_mime() {
        assert_eq!(rate_from_mime("audio/L16;codec=pcm;rate=24000"), Some(24000));
        assert_eq!(rate_from_mime("audio/L16; rate=16000"), Some(16000));
        assert_eq!(rate_from_mime("audio/L16;codec=pcm"), None);
    }
}
