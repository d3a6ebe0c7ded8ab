//! Batch synthesis pipeline.
//!
//! Plans pending items into single-language batches, sends each batch as one
//! request, splits the combined audio on silence and writes one MP3 per item.
//! Batches whose audio cannot be split are regenerated one item at a time.

mod batch;
mod retry;
mod runner;
pub mod sink;
mod throttle;

pub use batch::{Batch, SpeechItem, WorkItem, plan_batches};
pub use runner::{Pipeline, PipelineSettings, RunReport};
