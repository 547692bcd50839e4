// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod classify;
pub mod config;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classify::Analyzer;
pub use crate::model::{Analysis, ImpactLevel, InboundTweet, Post, Project};
pub use crate::notify::{Button, Notifier, TelegramNotifier};
pub use crate::pipeline::{IngestOutcome, Pipeline};
