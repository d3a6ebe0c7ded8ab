//! Batch execution: synthesis with retry, segmentation, fallback and export.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::batch::{Batch, Plan, SpeechItem};
use super::retry::RetryPolicy;
use super::sink;
use super::throttle::Throttle;
use crate::audio::silence;
use crate::audio::{AudioClip, AudioError, Mp3Encoder, RawAudioStream, Segmentation, SilenceParams};
use crate::config::AppConfig;
use crate::tts::{Language, ProviderError, SpeechProvider, build_batch_prompt, build_single_prompt};

/// Voice per language.
#[derive(Debug, Clone)]
pub struct Voices {
    pub ja: String,
    pub en: String,
}

impl Voices {
    pub fn for_language(&self, language: Language) -> &str {
        match language {
            Language::Ja => &self.ja,
            Language::En => &self.en,
        }
    }
}

/// Everything the runner needs from the configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub voices: Voices,
    pub retry: RetryPolicy,
    pub silence: SilenceParams,
    pub delay: Duration,
    pub max_requests: u32,
    pub bitrate: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            voices: Voices { ja: config.voice_ja.clone(), en: config.voice_en.clone() },
            retry: RetryPolicy {
                max_attempts: config.max_retries,
                rate_limit_wait: Duration::from_secs(config.rate_limit_wait),
                retry_delay: Duration::from_secs(config.retry_delay),
            },
            silence: SilenceParams {
                min_silence_ms: config.silence_min_len,
                threshold_dbfs: config.silence_thresh,
                keep_silence_ms: config.silence_keep,
            },
            delay: Duration::from_secs(config.delay),
            max_requests: config.max_requests,
            bitrate: config.bitrate,
        }
    }
}

/// Why a synthesis call produced no audio.
#[derive(Debug, Error)]
pub enum SynthesisFailure {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: ProviderError },
    #[error("not retrying: {0}")]
    Terminal(ProviderError),
    #[error("request budget spent")]
    BudgetSpent,
}

/// Why a clip could not be written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("encode failed: {0}")]
    Encode(#[from] AudioError),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// How a batch ended up being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPath {
    /// One request, split on silence.
    Segmented,
    /// Split abandoned, one request per item.
    Fallback,
    /// The batch request itself failed.
    Failed,
    /// Not attempted in this run.
    Deferred,
}

/// Outcome of one batch; every item lands in exactly one list, in batch order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub path: BatchPath,
    pub written: Vec<String>,
    pub failed: Vec<String>,
    pub deferred: Vec<String>,
}

impl BatchResult {
    fn new(path: BatchPath) -> Self {
        Self { path, written: Vec::new(), failed: Vec::new(), deferred: Vec::new() }
    }

    fn failed(batch: &Batch) -> Self {
        Self { failed: filenames(batch), ..Self::new(BatchPath::Failed) }
    }

    fn deferred(batch: &Batch) -> Self {
        Self { deferred: filenames(batch), ..Self::new(BatchPath::Deferred) }
    }
}

fn filenames(batch: &Batch) -> Vec<String> {
    batch.items().iter().map(|item| item.filename.clone()).collect()
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub generated: usize,
    pub failed: usize,
    pub deferred: usize,
    pub skipped: usize,
    pub requests: u32,
    pub elapsed: Duration,
    pub failed_files: Vec<String>,
}

impl RunReport {
    /// Empty report carrying the plan's skip count.
    pub fn for_plan(plan: &Plan) -> Self {
        Self { skipped: plan.skipped, ..Self::default() }
    }

    fn record(&mut self, result: BatchResult) {
        self.generated += result.written.len();
        self.failed += result.failed.len();
        self.deferred += result.deferred.len();
        self.failed_files.extend(result.failed);
    }

    pub fn log_summary(&self) {
        info!("════════════════════════════════════════");
        info!("📊 Generated: {}  Failed: {}  Skipped: {}  Deferred: {}", self.generated, self.failed, self.skipped, self.deferred);
        info!("🌐 Requests: {}  Elapsed: {:.0}s", self.requests, self.elapsed.as_secs_f32());
        if !self.failed_files.is_empty() {
            warn!("❌ Failed: {}", self.failed_files.join(", "));
        }
        if self.failed > 0 || self.deferred > 0 {
            info!("💡 Run again to pick up the remaining files");
        }
    }
}

/// Sequential batch runner.
pub struct Pipeline<P: SpeechProvider> {
    provider: P,
    settings: PipelineSettings,
    encoder: Mp3Encoder,
    throttle: Throttle,
    cancel: CancellationToken,
}

impl<P: SpeechProvider> Pipeline<P> {
    /// Create a runner.
    ///
    /// # Errors
    /// Returns an error if the configured bitrate is not supported.
    pub fn new(provider: P, settings: PipelineSettings, cancel: CancellationToken) -> Result<Self, AudioError> {
        let encoder = Mp3Encoder::new(settings.bitrate)?;
        debug!("MP3 export at {} kbps mono", encoder.kbps());
        let throttle = Throttle::new(settings.delay, settings.max_requests);
        Ok(Self { provider, settings, encoder, throttle, cancel })
    }

    /// Process every planned batch in order.
    ///
    /// Batches left when the budget runs out or the token is cancelled are
    /// reported deferred. Cancellation is only observed between batches.
    pub async fn run(&mut self, plan: &Plan) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::for_plan(plan);
        let total = plan.batches.len();
        let mut stopped = false;

        for (idx, batch) in plan.batches.iter().enumerate() {
            if !stopped && self.cancel.is_cancelled() {
                warn!("🛑 Interrupted, deferring {} remaining batch(es)", total - idx);
                stopped = true;
            }
            if !stopped && self.throttle.is_exhausted() {
                warn!("🛑 Request budget of {} spent, deferring {} remaining batch(es)", self.settings.max_requests, total - idx);
                stopped = true;
            }
            if stopped {
                report.record(BatchResult::deferred(batch));
                continue;
            }

            info!("📦 [{}/{}] {} - {} items ({})", idx + 1, total, batch.label(), batch.len(), batch.language());
            debug!("{} request(s) left in budget", self.throttle.remaining());
            let result = self.process_batch(batch).await;
            debug!("Batch {} finished via {:?}", idx + 1, result.path);
            report.record(result);
        }

        report.requests = self.throttle.issued();
        report.elapsed = started.elapsed();
        report
    }

    /// Synthesize one batch and export its clips, falling back to single-item
    /// requests when the combined audio cannot be split.
    pub async fn process_batch(&mut self, batch: &Batch) -> BatchResult {
        let prompt = build_batch_prompt(batch);
        let voice = self.settings.voices.for_language(batch.language()).to_string();

        let audio = match self.synthesize(&prompt, &voice, batch.language()).await {
            Ok(audio) => audio,
            Err(SynthesisFailure::BudgetSpent) => {
                warn!("⏸️ Out of requests, deferring {} items", batch.len());
                return BatchResult::deferred(batch);
            }
            Err(e) => {
                error!("❌ Batch failed: {}", e);
                return BatchResult::failed(batch);
            }
        };

        match silence::segment(&audio, batch.len(), self.settings.silence) {
            Segmentation::Matched { clips, params } => {
                info!("✂️ Split into {} clips (min_silence={}ms, thresh={}dBFS)", clips.len(), params.min_silence_ms, params.threshold_dbfs);
                let mut result = BatchResult::new(BatchPath::Segmented);
                for (item, clip) in batch.items().iter().zip(&clips) {
                    self.export_into(item, clip, &mut result).await;
                }
                result
            }
            Segmentation::Mismatched { baseline_count } => {
                let baseline = self.settings.silence;
                debug!("Silent gaps at baseline (ms): {:?}", silence::detect_silence(&audio, baseline.min_silence_ms, baseline.threshold_dbfs));
                warn!("⚠️ Expected {} clips, found {} and no sweep candidate matched; generating one by one", batch.len(), baseline_count);
                self.fallback(batch, &voice).await
            }
        }
    }

    /// One request per item with the single-item prompt; the whole response is the clip.
    async fn fallback(&mut self, batch: &Batch, voice: &str) -> BatchResult {
        let mut result = BatchResult::new(BatchPath::Fallback);

        for item in batch.items() {
            if self.throttle.is_exhausted() {
                result.deferred.push(item.filename.clone());
                continue;
            }

            let prompt = build_single_prompt(item, batch.language());
            match self.synthesize(&prompt, voice, batch.language()).await {
                Ok(audio) => self.export_into(item, &audio.into_clip(), &mut result).await,
                Err(SynthesisFailure::BudgetSpent) => result.deferred.push(item.filename.clone()),
                Err(e) => {
                    error!("  ❌ {}: {}", item.filename, e);
                    result.failed.push(item.filename.clone());
                }
            }
        }

        if !result.deferred.is_empty() {
            warn!("⏸️ Out of requests, deferring {} items", result.deferred.len());
        }
        result
    }

    /// Call the provider through the throttle, retrying per the policy.
    async fn synthesize(&mut self, prompt: &str, voice: &str, language: Language) -> Result<RawAudioStream, SynthesisFailure> {
        let policy = self.settings.retry;
        let mut attempt = 0;

        loop {
            if !self.throttle.acquire().await {
                return Err(SynthesisFailure::BudgetSpent);
            }
            attempt += 1;

            let error = match self.provider.synthesize(prompt, voice, language).await {
                Ok(audio) => return Ok(audio),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(SynthesisFailure::Terminal(error));
            }
            if !policy.should_retry(attempt, &error) {
                return Err(SynthesisFailure::Exhausted { attempts: attempt, last: error });
            }

            let wait = policy.backoff(attempt, &error);
            warn!("⚠️ Attempt {}/{} via {} failed: {} (retrying in {}s)", attempt, policy.max_attempts, self.provider.name(), error, wait.as_secs());
            tokio::time::sleep(wait).await;
        }
    }

    async fn export_into(&self, item: &SpeechItem, clip: &AudioClip, result: &mut BatchResult) {
        match self.export(item, clip).await {
            Ok(()) => {
                info!("  ✅ {} ({:.1}s)", item.filename, clip.duration_secs());
                result.written.push(item.filename.clone());
            }
            Err(e) => {
                error!("  ❌ {}: {}", item.filename, e);
                result.failed.push(item.filename.clone());
            }
        }
    }

    async fn export(&self, item: &SpeechItem, clip: &AudioClip) -> Result<(), ExportError> {
        let mp3 = self.encoder.encode(clip)?;
        sink::write_atomic(&item.output_path, &mp3).await?;
        Ok(())
    }
}
