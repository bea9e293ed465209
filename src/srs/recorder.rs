use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::algorithm::{apply_review, validate_difficulty};
use super::locks::CardLocks;
use crate::data::models::{CardReviewState, NewReviewEvent, SrsResult};
use crate::data::repositories::ReviewStore;

/// The single entry point that mutates card scheduling state
pub struct ReviewRecorder {
    store: Arc<dyn ReviewStore>,
    locks: CardLocks,
}

impl ReviewRecorder {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self {
            store,
            locks: CardLocks::new(),
        }
    }

    /// Apply one review to a card and log it.
    ///
    /// Reviews of the same card are serialized. On failure the stored card
    /// keeps its pre-review state, so the call can be re-issued.
    pub fn record_review(
        &self,
        card_id: i32,
        difficulty: i32,
        now: DateTime<Utc>,
    ) -> SrsResult<CardReviewState> {
        if let Err(e) = validate_difficulty(difficulty) {
            log::warn!("Rejected review of card {}: {}", card_id, e);
            return Err(e);
        }

        self.locks.with_card(card_id, || -> SrsResult<CardReviewState> {
            let current = self.store.get_card(card_id)?;
            let outcome = apply_review(&current, difficulty, now)?;

            let event = NewReviewEvent {
                card_id,
                owner_id: current.owner_id,
                difficulty,
                retention: outcome.card.last_retention,
                interval_days: outcome.interval_days,
                easiness_factor: outcome.card.easiness_factor,
                reviewed_at: now,
            };

            self.store.commit_review(&outcome.card, &event).map_err(|e| {
                log::error!("Failed to persist review of card {}: {}", card_id, e);
                e
            })?;

            log::info!(
                "Card {} reviewed with difficulty {}: repetitions {}, next review in {} day(s)",
                card_id,
                difficulty,
                outcome.card.repetition_count,
                outcome.interval_days
            );
            Ok(outcome.card)
        })
    }
}
