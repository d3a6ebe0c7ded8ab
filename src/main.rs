//! Flashcard Audio - batch-generates flashcard MP3s with Gemini TTS.
//!
//! Many words are packed into one synthesis request, the combined speech is
//! split on silence into one clip per word, and batches that cannot be split
//! are regenerated word by word. Existing files are skipped, so an interrupted
//! or quota-limited run is resumed by simply running it again.

mod audio;
mod config;
mod pipeline;
mod tts;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use config::AppConfig;
use pipeline::{Pipeline, PipelineSettings, RunReport, SpeechItem, WorkItem, plan_batches};
use tts::GeminiTts;

/// Enumerate every catalog entry for the selected apps.
fn collect_work(config: &AppConfig) -> Vec<WorkItem> {
    config
        .selected_apps()
        .into_iter()
        .flat_map(|app| {
            let dir = config.output_dir.join(app.output_dir());
            app.entries().into_iter().map(move |entry| WorkItem {
                group: app.label().to_string(),
                language: entry.language,
                item: SpeechItem::new(entry.filename.clone(), entry.speech, entry.context, dir.join(&entry.filename)),
            })
        })
        .collect()
}

/// Cancel `token` on Ctrl+C or SIGTERM.
fn spawn_shutdown_watcher(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("🛑 Received Ctrl+C, finishing current batch...");
            }
            _ = async {
                #[cfg(unix)]
                {
                    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                        Ok(mut sigterm) => {
                            sigterm.recv().await;
                        }
                        Err(e) => {
                            warn!("Failed to register SIGTERM handler: {}", e);
                            std::future::pending::<()>().await;
                        }
                    }
                }
                #[cfg(not(unix))]
                {
                    std::future::pending::<()>().await;
                }
            } => {
                info!("🛑 Received SIGTERM, finishing current batch...");
            }
        }

        token.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🔊 Flashcard Audio v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }

    if config.api_key().is_none() {
        error!("❌ GEMINI_API_KEY is not set");
        error!("Get a key at https://aistudio.google.com/apikey and export GEMINI_API_KEY=...");
        std::process::exit(1);
    }

    config.log_config();

    for app in config.selected_apps() {
        let dir = config.output_dir.join(app.output_dir());
        pipeline::sink::ensure_dir(&dir).await.with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let plan = plan_batches(collect_work(&config), config.batch_size, config.force);
    let runnable = plan.batches.len().min(config.max_requests as usize);

    info!("📋 Total: {}  Already done: {}  To generate: {}", plan.total, plan.skipped, plan.pending());
    if plan.duplicates > 0 {
        info!("   Dropped {} duplicate output path(s)", plan.duplicates);
    }
    info!("   Batches: {} (up to {} words each)", plan.batches.len(), config.batch_size);
    if runnable < plan.batches.len() {
        warn!("   Request cap {} allows {} batch(es); the rest are deferred to the next run", config.max_requests, runnable);
    }
    info!("   Estimated time: ~{:.1} min", (runnable as u64 * config.delay) as f32 / 60.0);

    if plan.batches.is_empty() {
        info!("✅ Nothing to generate");
        RunReport::for_plan(&plan).log_summary();
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_shutdown_watcher(cancel.clone());

    let provider = GeminiTts::new(&config)?;
    let mut pipeline = Pipeline::new(provider, PipelineSettings::from_config(&config), cancel).context("Failed to create MP3 encoder")?;

    let report = pipeline.run(&plan).await;
    report.log_summary();

    Ok(())
}
