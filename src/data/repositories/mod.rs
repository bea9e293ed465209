pub mod card;
pub mod memory;

use chrono::{DateTime, Utc};

use crate::data::models::{CardReviewState, NewCard, NewReviewEvent, ReviewEvent, SrsResult};

pub use card::{CardRepository, DbPool, SqliteReviewStore};
pub use memory::InMemoryReviewStore;

/// Persistence port used by the review engine
pub trait ReviewStore: Send + Sync {
    fn create_card(&self, card: NewCard, now: DateTime<Utc>) -> SrsResult<CardReviewState>;

    fn get_card(&self, card_id: i32) -> SrsResult<CardReviewState>;

    fn save_card(&self, card: &CardReviewState) -> SrsResult<()>;

    fn append_review_event(&self, event: &NewReviewEvent) -> SrsResult<ReviewEvent>;

    fn list_cards_by_owner(&self, owner_id: i32) -> SrsResult<Vec<CardReviewState>>;

    fn list_due_cards(&self, owner_id: i32, as_of: DateTime<Utc>) -> SrsResult<Vec<CardReviewState>>;

    fn list_review_events(&self, owner_id: i32) -> SrsResult<Vec<ReviewEvent>>;

    /// Persist a reviewed card together with its log entry.
    ///
    /// Stores without transactions fall back to card first, log second, so
    /// a failure can at worst lose the log entry, never orphan it.
    fn commit_review(&self, card: &CardReviewState, event: &NewReviewEvent) -> SrsResult<ReviewEvent> {
        self.save_card(card)?;
        self.append_review_event(event)
    }
}
