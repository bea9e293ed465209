use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::ReviewStore;
use crate::data::models::{CardReviewState, NewCard, NewReviewEvent, ReviewEvent, SrsError, SrsResult};

#[derive(Debug, Default)]
struct Tables {
    cards: BTreeMap<i32, CardReviewState>,
    events: Vec<ReviewEvent>,
    next_card_id: i32,
}

/// Process-local store, used when no database is configured
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    tables: RwLock<Tables>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewStore for InMemoryReviewStore {
    fn create_card(&self, card: NewCard, now: DateTime<Utc>) -> SrsResult<CardReviewState> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.next_card_id += 1;
        let created = CardReviewState::new(tables.next_card_id, card, now);
        tables.cards.insert(created.card_id, created.clone());
        Ok(created)
    }

    fn get_card(&self, card_id: i32) -> SrsResult<CardReviewState> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.cards.get(&card_id).cloned().ok_or(SrsError::NotFound(card_id))
    }

    fn save_card(&self, card: &CardReviewState) -> SrsResult<()> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        match tables.cards.get_mut(&card.card_id) {
            Some(stored) => {
                *stored = card.clone();
                Ok(())
            }
            None => Err(SrsError::NotFound(card.card_id)),
        }
    }

    fn append_review_event(&self, event: &NewReviewEvent) -> SrsResult<ReviewEvent> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let event_id = tables.events.len() as i32 + 1;
        let stored = ReviewEvent::from_new(event_id, event.clone());
        tables.events.push(stored.clone());
        Ok(stored)
    }

    fn list_cards_by_owner(&self, owner_id: i32) -> SrsResult<Vec<CardReviewState>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .cards
            .values()
            .filter(|card| card.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn list_due_cards(&self, owner_id: i32, as_of: DateTime<Utc>) -> SrsResult<Vec<CardReviewState>> {
        let mut due: Vec<_> = self
            .list_cards_by_owner(owner_id)?
            .into_iter()
            .filter(|card| card.is_due(as_of))
            .collect();
        due.sort_by_key(|card| (card.next_review_at, card.card_id));
        Ok(due)
    }

    fn list_review_events(&self, owner_id: i32) -> SrsResult<Vec<ReviewEvent>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .events
            .iter()
            .filter(|event| event.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn commit_review(&self, card: &CardReviewState, event: &NewReviewEvent) -> SrsResult<ReviewEvent> {
        // Both writes under one lock so readers never see one without the other
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = tables.cards.get_mut(&card.card_id) else {
            return Err(SrsError::NotFound(card.card_id));
        };
        *stored = card.clone();

        let event_id = tables.events.len() as i32 + 1;
        let logged = ReviewEvent::from_new(event_id, event.clone());
        tables.events.push(logged.clone());
        Ok(logged)
    }
}
