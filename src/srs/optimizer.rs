//! Turns due cards into ranked, time-boxed study sessions.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::retention::current_retention;
use crate::config::EngineConfig;
use crate::data::models::{
    CardReviewState, ScoredCard, StudyBatch, StudyBatches, StudyPreferences, StudySchedule,
    TimeSlot, TimeWindow,
};
use crate::utils::days_between;

pub const QUICK_SESSION_MINUTES: u32 = 5;
pub const STANDARD_SESSION_MINUTES: u32 = 15;

/// Higher means study sooner: low retention and long overdue cards first
pub fn urgency_score(retention: f64, days_overdue: f64, overdue_weight: f64) -> f64 {
    (1.0 - retention.clamp(0.0, 1.0)) * 100.0 + days_overdue.max(0.0) * overdue_weight
}

/// Score and sort cards, most urgent first
pub fn rank_cards(
    due_cards: &[CardReviewState],
    retention_by_card: &HashMap<i32, f64>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<ScoredCard> {
    let mut ranked: Vec<ScoredCard> = due_cards
        .iter()
        .map(|card| {
            let retention = retention_by_card
                .get(&card.card_id)
                .copied()
                .unwrap_or_else(|| current_retention(card, now));
            let overdue = days_between(card.next_review_at, now);

            ScoredCard {
                card_id: card.card_id,
                retention,
                urgency: urgency_score(retention, overdue, config.overdue_weight),
                next_review_at: card.next_review_at,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.urgency
            .total_cmp(&a.urgency)
            .then(a.next_review_at.cmp(&b.next_review_at))
            .then(a.card_id.cmp(&b.card_id))
    });
    ranked
}

/// Longest prefix of `ranked` that fits in `minutes`
fn batch_for(ranked: &[ScoredCard], minutes: u32, minutes_per_card: u32) -> StudyBatch {
    let per_card = minutes_per_card.max(1);
    let capacity = (minutes / per_card) as usize;
    let card_ids: Vec<i32> = ranked.iter().take(capacity).map(|card| card.card_id).collect();

    StudyBatch {
        estimated_minutes: card_ids.len() as u32 * per_card,
        card_ids,
    }
}

pub fn build_batches(ranked: &[ScoredCard], max_session_minutes: u32, minutes_per_card: u32) -> StudyBatches {
    StudyBatches {
        quick: batch_for(ranked, QUICK_SESSION_MINUTES, minutes_per_card),
        standard: batch_for(ranked, STANDARD_SESSION_MINUTES, minutes_per_card),
        focus: batch_for(ranked, max_session_minutes, minutes_per_card),
    }
}

/// One slot per available window; the next one still ahead of `now` is
/// recommended, or the earliest one when the day is over.
pub fn optimal_slots(windows: &BTreeSet<TimeWindow>, now: DateTime<Utc>, recommend: bool) -> Vec<TimeSlot> {
    let current = now.time();
    let next = windows
        .iter()
        .copied()
        .find(|window| window.slot_time() > current)
        .or_else(|| windows.iter().next().copied());

    windows
        .iter()
        .map(|&window| TimeSlot {
            window,
            time: window.slot_time().format("%H:%M").to_string(),
            expected_retention: window.expected_retention(),
            recommended: recommend && Some(window) == next,
        })
        .collect()
}

pub fn build_schedule(
    due_cards: &[CardReviewState],
    retention_by_card: &HashMap<i32, f64>,
    preferences: &StudyPreferences,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> StudySchedule {
    let ranked = rank_cards(due_cards, retention_by_card, now, config);
    let per_card = config.minutes_per_card.max(1);

    let batches = build_batches(&ranked, preferences.max_session_minutes, per_card);
    let optimal_slots = optimal_slots(&preferences.available_time_windows, now, !ranked.is_empty());
    let notification_times = optimal_slots
        .iter()
        .filter(|slot| slot.recommended)
        .map(|slot| slot.time.clone())
        .collect();
    let cards_below_target = ranked
        .iter()
        .filter(|card| card.retention < preferences.target_retention)
        .count();

    log::debug!(
        "Built schedule: {} due cards, focus batch of {}",
        ranked.len(),
        batches.focus.card_ids.len()
    );

    StudySchedule {
        estimated_minutes: ranked.len() as u32 * per_card,
        cards_below_target,
        ranked_cards: ranked,
        batches,
        optimal_slots,
        notification_times,
    }
}
