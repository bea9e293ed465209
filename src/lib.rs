pub mod config;
pub mod data;
pub mod features;
pub mod handlers;
pub mod schema;
pub mod srs;
pub mod utils;

pub use config::{AppConfig, EngineConfig};
pub use data::models::{CardReviewState, LearningStats, SrsError, StudyPreferences, StudySchedule};
pub use data::repositories::{InMemoryReviewStore, ReviewStore, SqliteReviewStore};
pub use srs::SrsService;
