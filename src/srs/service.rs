use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use super::algorithm::preview_intervals;
use super::optimizer::build_schedule;
use super::recorder::ReviewRecorder;
use super::retention::current_retention;
use super::stats::{compute_activity, compute_stats};
use crate::config::EngineConfig;
use crate::data::models::{
    CardReviewState, LearningStats, NewCard, SrsResult, StudyPreferences, StudySchedule,
};
use crate::data::repositories::ReviewStore;
use crate::utils::format_interval;

/// Interval each rating would give a card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub card_id: i32,
    /// Days for ratings 1 through 5
    pub intervals: [i32; 5],
    pub labels: Vec<String>,
}

/// Public API of the review engine
pub struct SrsService {
    store: Arc<dyn ReviewStore>,
    recorder: ReviewRecorder,
    config: EngineConfig,
}

impl SrsService {
    pub fn new(store: Arc<dyn ReviewStore>, config: EngineConfig) -> Self {
        Self {
            recorder: ReviewRecorder::new(store.clone()),
            store,
            config,
        }
    }

    pub fn create_card(&self, card: NewCard, now: DateTime<Utc>) -> SrsResult<CardReviewState> {
        let created = self.store.create_card(card, now)?;
        log::info!("Created card {} for user {}", created.card_id, created.owner_id);
        Ok(created)
    }

    pub fn get_card(&self, card_id: i32) -> SrsResult<CardReviewState> {
        self.store.get_card(card_id)
    }

    pub fn preview_card(&self, card_id: i32, now: DateTime<Utc>) -> SrsResult<IntervalPreview> {
        let card = self.store.get_card(card_id)?;
        let intervals = preview_intervals(&card, now)?;
        Ok(IntervalPreview {
            card_id,
            intervals,
            labels: intervals.iter().map(|&days| format_interval(days)).collect(),
        })
    }

    pub fn record_review(&self, card_id: i32, difficulty: i32, now: DateTime<Utc>) -> SrsResult<CardReviewState> {
        self.recorder.record_review(card_id, difficulty, now)
    }

    pub fn get_due_cards(&self, owner_id: i32, now: DateTime<Utc>) -> SrsResult<Vec<CardReviewState>> {
        self.store.list_due_cards(owner_id, now)
    }

    pub fn get_learning_stats(&self, owner_id: i32, now: DateTime<Utc>) -> SrsResult<LearningStats> {
        let cards = self.store.list_cards_by_owner(owner_id)?;
        let events = self.store.list_review_events(owner_id)?;

        let mut stats = compute_stats(&cards, now, &self.config);
        stats.activity = compute_activity(&events, now);
        Ok(stats)
    }

    pub fn generate_study_schedule(
        &self,
        owner_id: i32,
        preferences: &StudyPreferences,
        now: DateTime<Utc>,
    ) -> SrsResult<StudySchedule> {
        preferences.validate()?;

        let due = self.store.list_due_cards(owner_id, now)?;
        let retention_by_card: HashMap<i32, f64> = due
            .iter()
            .map(|card| (card.card_id, current_retention(card, now)))
            .collect();

        Ok(build_schedule(&due, &retention_by_card, preferences, now, &self.config))
    }
}
