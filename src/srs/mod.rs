//! Spaced repetition engine
//!
//! - `retention`: forgetting curve
//! - `algorithm`: pure SM-2 state transition
//! - `recorder`: serialized read-modify-write of a card plus its log entry
//! - `stats`: learning statistics over a card snapshot
//! - `optimizer`: ranked, time-boxed study sessions
//! - `service`: the public API tying them to a store

pub mod algorithm;
pub mod locks;
pub mod optimizer;
pub mod recorder;
pub mod retention;
pub mod service;
pub mod stats;

pub use algorithm::{apply_review, preview_intervals, ReviewOutcome};
pub use recorder::ReviewRecorder;
pub use retention::{current_retention, memory_strength, retention};
pub use service::{IntervalPreview, SrsService};
