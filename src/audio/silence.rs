//! Silence-gap segmentation of combined multi-word speech.
//!
//! A batch response is one waveform in which the words are separated by long
//! pauses. Splitting works on millisecond windows: a window of `min_silence_ms`
//! whose RMS sits at or below the threshold counts as silence, overlapping
//! silent windows merge into silent ranges, and everything between them is a
//! clip. Each clip keeps `keep_silence_ms` of padding on both sides.
//!
//! When the clip count does not match the number of requested words, a fixed
//! sweep of threshold and window offsets is tried in order. The first match
//! wins; if nothing matches the caller gets [`Segmentation::Mismatched`] and
//! must not use any of the clips.

use std::ops::Range;

use tracing::debug;

use super::pcm::{AudioClip, MAX_AMPLITUDE, RawAudioStream};

/// Threshold offsets (dB) tried after the baseline, outer loop of the sweep.
pub const THRESHOLD_OFFSETS_DB: [f32; 4] = [-4.0, -8.0, 4.0, 8.0];

/// Minimum-silence offsets (ms) tried for each threshold, inner loop of the sweep.
pub const MIN_SILENCE_OFFSETS_MS: [i64; 3] = [0, -200, 200];

/// Swept minimum-silence lengths never go below this.
pub const MIN_SILENCE_FLOOR_MS: u32 = 300;

/// Parameters for one silence-detection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceParams {
    pub min_silence_ms: u32,  // Shortest pause that separates two clips
    pub threshold_dbfs: f32,  // Windows at or below this level are silence
    pub keep_silence_ms: u32, // Padding kept around each clip
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self { min_silence_ms: 800, threshold_dbfs: -36.0, keep_silence_ms: 150 }
    }
}

/// Outcome of matching a stream against an expected clip count.
#[derive(Debug)]
pub enum Segmentation {
    /// Exactly the expected number of clips, in temporal order.
    Matched { clips: Vec<AudioClip>, params: SilenceParams },
    /// No candidate produced the expected count.
    Mismatched { baseline_count: usize },
}

/// Candidate parameters in the order they are tried: baseline first, then
/// every threshold offset crossed with every minimum-silence offset.
pub fn sweep(baseline: SilenceParams) -> Vec<SilenceParams> {
    let mut candidates = Vec::with_capacity(1 + THRESHOLD_OFFSETS_DB.len() * MIN_SILENCE_OFFSETS_MS.len());
    candidates.push(baseline);

    for db in THRESHOLD_OFFSETS_DB {
        for ms in MIN_SILENCE_OFFSETS_MS {
            let min_silence_ms = (i64::from(baseline.min_silence_ms) + ms).max(i64::from(MIN_SILENCE_FLOOR_MS)) as u32;
            candidates.push(SilenceParams { min_silence_ms, threshold_dbfs: baseline.threshold_dbfs + db, keep_silence_ms: baseline.keep_silence_ms });
        }
    }

    candidates
}

/// Split `audio` into exactly `expected` clips, sweeping parameters if needed.
///
/// # Arguments
/// * `audio` - Combined response for the whole batch
/// * `expected` - Number of words requested in the batch
/// * `baseline` - First parameter set to try
///
/// # Returns
/// `Matched` with the clips and the parameters that produced them, or
/// `Mismatched` with the clip count observed at the baseline.
pub fn segment(audio: &RawAudioStream, expected: usize, baseline: SilenceParams) -> Segmentation {
    let energy = EnergyIndex::new(audio);
    let mut baseline_count = None;

    for params in sweep(baseline) {
        let ranges = clip_ranges(&energy, &params);
        let count = *baseline_count.get_or_insert(ranges.len());

        if ranges.len() == expected {
            debug!("Split into {} clips with min_silence={}ms thresh={}dBFS", expected, params.min_silence_ms, params.threshold_dbfs);
            let clips = ranges.into_iter().map(|range| audio.clip(range)).collect();
            return Segmentation::Matched { clips, params };
        }

        debug!(
            "min_silence={}ms thresh={}dBFS gave {} clips, want {} (baseline {})",
            params.min_silence_ms,
            params.threshold_dbfs,
            ranges.len(),
            expected,
            count
        );
    }

    Segmentation::Mismatched { baseline_count: baseline_count.unwrap_or(0) }
}

/// Silent ranges (ms) of at least `min_silence_ms`.
pub fn detect_silence(audio: &RawAudioStream, min_silence_ms: u32, threshold_dbfs: f32) -> Vec<Range<u64>> {
    silent_ranges(&EnergyIndex::new(audio), min_silence_ms, threshold_dbfs)
}

/// Prefix sums of squared samples, so any window's RMS is O(1).
struct EnergyIndex<'a> {
    audio: &'a RawAudioStream,
    prefix: Vec<u64>, // prefix[i] = sum of squares of samples[..i]
}

impl<'a> EnergyIndex<'a> {
    fn new(audio: &'a RawAudioStream) -> Self {
        let mut prefix = Vec::with_capacity(audio.samples().len() + 1);
        let mut total = 0u64;
        prefix.push(total);
        for &sample in audio.samples() {
            let value = i64::from(sample);
            total += (value * value) as u64;
            prefix.push(total);
        }
        Self { audio, prefix }
    }

    fn duration_ms(&self) -> u64 {
        self.audio.duration_ms()
    }

    fn rms(&self, range_ms: Range<u64>) -> f64 {
        let start = self.audio.frame_at(range_ms.start);
        let end = self.audio.frame_at(range_ms.end);
        if end <= start {
            return 0.0;
        }
        let energy = (self.prefix[end] - self.prefix[start]) as f64;
        (energy / (end - start) as f64).sqrt()
    }
}

fn dbfs_to_amplitude(dbfs: f32) -> f64 {
    10f64.powf(f64::from(dbfs) / 20.0) * MAX_AMPLITUDE
}

fn silent_ranges(energy: &EnergyIndex<'_>, min_silence_ms: u32, threshold_dbfs: f32) -> Vec<Range<u64>> {
    let len = energy.duration_ms();
    let window = u64::from(min_silence_ms.max(1));
    if len < window {
        return Vec::new();
    }

    let threshold = dbfs_to_amplitude(threshold_dbfs);
    let mut ranges = Vec::new();
    // (first silent window start, latest silent window start) of the open range
    let mut open: Option<(u64, u64)> = None;

    for start in 0..=len - window {
        if energy.rms(start..start + window) > threshold {
            continue;
        }
        open = match open {
            Some((first, last)) if start > last + window => {
                ranges.push(first..last + window);
                Some((start, start))
            }
            Some((first, _)) => Some((first, start)),
            None => Some((start, start)),
        };
    }

    if let Some((first, last)) = open {
        ranges.push(first..last + window);
    }
    ranges
}

fn nonsilent_ranges(energy: &EnergyIndex<'_>, min_silence_ms: u32, threshold_dbfs: f32) -> Vec<Range<u64>> {
    let len = energy.duration_ms();
    let silent = silent_ranges(energy, min_silence_ms, threshold_dbfs);

    if silent.is_empty() {
        return if len == 0 { Vec::new() } else { vec![0..len] };
    }
    if silent[0] == (0..len) {
        return Vec::new();
    }

    let mut ranges = Vec::with_capacity(silent.len() + 1);
    let mut previous_end = 0;
    for range in &silent {
        ranges.push(previous_end..range.start);
        previous_end = range.end;
    }
    if previous_end != len {
        ranges.push(previous_end..len);
    }
    if ranges.first() == Some(&(0..0)) {
        ranges.remove(0);
    }
    ranges
}

/// Padded clip ranges; neighbours whose padding overlaps meet halfway.
fn clip_ranges(energy: &EnergyIndex<'_>, params: &SilenceParams) -> Vec<Range<u64>> {
    let len = energy.duration_ms();
    let keep = u64::from(params.keep_silence_ms);

    let mut padded: Vec<Range<u64>> = nonsilent_ranges(energy, params.min_silence_ms, params.threshold_dbfs)
        .into_iter()
        .map(|range| range.start.saturating_sub(keep)..range.end + keep)
        .collect();

    for i in 1..padded.len() {
        let last_end = padded[i - 1].end;
        let next_start = padded[i].start;
        if next_start < last_end {
            let midpoint = (last_end + next_start) / 2;
            padded[i - 1].end = midpoint;
            padded[i].start = midpoint;
        }
    }

    padded.into_iter().map(|range| range.start..range.end.min(len)).collect()
}
