pub mod card_models;
pub mod schedule_models;
pub mod srs_models;
pub mod stats_models;

pub use card_models::{
    CardReviewState, NewCard, NewReviewEvent, ReviewEvent,
    CardRow, NewCardRow, ReviewEventRow, NewReviewEventRow,
    INITIAL_EASINESS_FACTOR, MIN_EASINESS_FACTOR,
};
pub use schedule_models::{
    NotificationPlan, ScoredCard, StudyBatch, StudyBatches,
    StudyPreferences, StudySchedule, TimeSlot, TimeWindow,
};
pub use srs_models::{CreateCardRequest, ReviewRequest, SrsError, SrsResult};
pub use stats_models::{LearningStats, ReviewActivity};
