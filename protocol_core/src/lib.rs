#![forbid(unsafe_code)]

//! Core domain model and business logic for the Dayplan 30-day protocol tracker.
//!
//! This crate provides:
//! - Domain types (protocol, exercise logs, day feedback, catalog entries)
//! - Content segmentation and exercise extraction from free-form plan text
//! - Catalog enrichment
//! - Day logging, completion gating, finalization and progress
//! - Persistence (key-value store, activity calendar, CSV export)

pub mod types;
pub mod error;
pub mod segment;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod logbook;
pub mod gate;
pub mod feedback;
pub mod progress;
pub mod activation;
pub mod view;
pub mod command;
pub mod generation;
pub mod store;
pub mod streak;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use segment::{ContentParser, MarkerParser};
pub use feedback::{finalize_day, ActivitySink, FeedbackInput, NoActivitySink};
pub use command::{apply, CommandContext, ProtocolCommand};
pub use progress::{summarize, ProgressSummary};
pub use view::{day_view, next_day_preview, DayView, ExerciseView};
pub use generation::{GenerationGuard, GenerationTicket};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use streak::ActivityLog;
pub use export::export_feedback_csv;
