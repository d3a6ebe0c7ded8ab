//! MP3 export using LAME.

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, Mode, MonoPcm, Quality};

use super::{AudioClip, AudioError};

/// Bitrates accepted on the command line, in kbps.
///
/// Provider audio is 24 kHz, which LAME encodes as MPEG-2 Layer III; that
/// layer tops out at 160 kbps, so higher settings would be silently capped.
pub const SUPPORTED_BITRATES: &[u32] = &[32, 48, 64, 96, 128, 160];

/// Encodes mono clips to constant-bitrate MP3.
#[derive(Clone, Copy)]
pub struct Mp3Encoder {
    bitrate: Bitrate,
    kbps: u32,
}

impl std::fmt::Debug for Mp3Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mp3Encoder").field("kbps", &self.kbps).finish()
    }
}

impl Mp3Encoder {
    /// Create an encoder for the given bitrate.
    ///
    /// # Errors
    /// Returns an error if the bitrate is not one LAME supports.
    pub fn new(kbps: u32) -> Result<Self, AudioError> {
        let bitrate = match kbps {
            32 => Bitrate::Kbps32,
            48 => Bitrate::Kbps48,
            64 => Bitrate::Kbps64,
            96 => Bitrate::Kbps96,
            128 => Bitrate::Kbps128,
            160 => Bitrate::Kbps160,
            other => return Err(AudioError::UnsupportedBitrate(other)),
        };
        Ok(Self { bitrate, kbps })
    }

    pub fn kbps(&self) -> u32 {
        self.kbps
    }

    /// Encode a clip to a complete MP3 byte stream.
    ///
    /// # Arguments
    /// * `clip` - Mono 16-bit clip to encode
    ///
    /// # Returns
    /// The encoded MP3 file contents.
    ///
    /// # Errors
    /// Returns an error if the clip is empty or LAME rejects the configuration.
    pub fn encode(&self, clip: &AudioClip) -> Result<Vec<u8>, AudioError> {
        if clip.is_empty() {
            return Err(AudioError::EmptyClip);
        }

        let mut builder = Builder::new().ok_or_else(|| AudioError::Encoder("failed to allocate LAME context".to_string()))?;
        builder.set_num_channels(1).map_err(lame_error)?;
        builder.set_mode(Mode::Mono).map_err(lame_error)?;
        builder.set_sample_rate(clip.sample_rate()).map_err(lame_error)?;
        builder.set_brate(self.bitrate).map_err(lame_error)?;
        builder.set_quality(Quality::Best).map_err(lame_error)?;
        let mut encoder = builder.build().map_err(lame_error)?;

        let samples = clip.samples();
        let mut output = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(samples.len()));
        encoder.encode_to_vec(MonoPcm(samples), &mut output).map_err(lame_error)?;
        encoder.flush_to_vec::<FlushNoGap>(&mut output).map_err(lame_error)?;

        Ok(output)
    }
}

fn lame_error(e: impl std::fmt::Debug) -> AudioError {
    AudioError::Encoder(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RawAudioStream;

    #[test]
    fn test_rejects_unsupported_bitrate() {
        assert!(matches!(Mp3Encoder::new(100), Err(AudioError::UnsupportedBitrate(100))));
        assert!(SUPPORTED_BITRATES.iter().all(|&kbps| Mp3Encoder::new(kbps).is_ok()));
        for kbps in [192, 256, 320] {
            assert!(matches!(Mp3Encoder::new(kbps), Err(AudioError::UnsupportedBitrate(k)) if k == kbps));
        }
    }

    #[test]
    fn test_debug_shows_bitrate() {
        let encoder = Mp3Encoder::new(128).unwrap();
        assert_eq!(format!("{:?}", encoder), "Mp3Encoder { kbps: 128 }");
    }

    #[test]
    fn test_every_bitrate_changes_output_size() {
        let samples: Vec<i16> = (0..24000).map(|i| ((i as f32 * 0.115).sin() * 8000.0) as i16).collect();
        let clip = RawAudioStream::new(samples, 24000).unwrap().into_clip();

        let sizes: Vec<usize> = SUPPORTED_BITRATES.iter().map(|&kbps| Mp3Encoder::new(kbps).unwrap().encode(&clip).unwrap().len()).collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]), "sizes {:?}", sizes);
    }

    #[test]
    fn test_encode_produces_mp3_frames() {
        let samples = (0..24000).map(|i| ((i as f32 * 0.115).sin() * 8000.0) as i16).collect();
        let clip = RawAudioStream::new(samples, 24000).unwrap().into_clip();

        let mp3 = Mp3Encoder::new(128).unwrap().encode(&clip).unwrap();
        assert!(mp3.len() > 1000, "only {} bytes", mp3.len());
        // Frame sync: 11 set bits
        assert_eq!(mp3[0], 0xFF);
        assert_eq!(mp3[1] & 0xE0, 0xE0);
    }

    #[test]
    fn test_encode_rejects_empty_clip() {
        let clip = RawAudioStream::new(Vec::new(), 24000).unwrap().into_clip();
        assert!(matches!(Mp3Encoder::new(128).unwrap().encode(&clip), Err(AudioError::EmptyClip)));
    }
}
