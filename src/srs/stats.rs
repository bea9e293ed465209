//! Learning statistics over a snapshot of a user's cards and review log.
//!
//! Read-only; empty input yields zeroed statistics rather than an error.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, Utc};

use super::retention::current_retention;
use crate::config::EngineConfig;
use crate::data::models::{CardReviewState, LearningStats, ReviewActivity, ReviewEvent};

const MIN_DAILY_REVIEWS: u32 = 5;
const MAX_DAILY_REVIEWS: u32 = 20;

/// Share of the unmastered collection suggested per day
const DAILY_LOAD_FACTOR: f64 = 0.2;

pub fn is_mastered(card: &CardReviewState, config: &EngineConfig) -> bool {
    card.repetition_count >= config.mastery_min_repetitions
        && card.mastery_level >= config.mastery_threshold
}

pub fn is_struggling(card: &CardReviewState, config: &EngineConfig) -> bool {
    card.easiness_factor < config.struggling_easiness
        && card.repetition_count >= config.struggling_min_repetitions
}

pub fn learning_efficiency(mastered: usize, struggling: usize) -> f64 {
    match mastered + struggling {
        0 if mastered > 0 => 1.0,
        0 => 0.0,
        total => mastered as f64 / total as f64,
    }
}

pub fn recommended_daily_reviews(total_cards: usize, efficiency: f64) -> u32 {
    let load = (total_cards as f64 * (1.0 - efficiency) * DAILY_LOAD_FACTOR).ceil();
    (load.max(0.0) as u32).clamp(MIN_DAILY_REVIEWS, MAX_DAILY_REVIEWS)
}

pub fn compute_stats(cards: &[CardReviewState], as_of: DateTime<Utc>, config: &EngineConfig) -> LearningStats {
    let due_count = cards.iter().filter(|card| card.is_due(as_of)).count();
    let mastered_count = cards.iter().filter(|card| is_mastered(card, config)).count();
    let struggling_count = cards.iter().filter(|card| is_struggling(card, config)).count();

    // Unreviewed cards have no retention to speak of and are left out
    let retentions: Vec<f64> = cards
        .iter()
        .filter(|card| card.is_reviewed())
        .map(|card| current_retention(card, as_of))
        .collect();
    let average_retention = if retentions.is_empty() {
        0.0
    } else {
        retentions.iter().sum::<f64>() / retentions.len() as f64
    };

    let efficiency = learning_efficiency(mastered_count, struggling_count);

    LearningStats {
        total_cards: cards.len(),
        reviewed_cards: retentions.len(),
        due_count,
        mastered_count,
        struggling_count,
        average_retention,
        learning_efficiency: efficiency,
        recommended_daily_reviews: recommended_daily_reviews(cards.len(), efficiency),
        activity: ReviewActivity::default(),
    }
}

/// Today's review counts and the current daily streak
pub fn compute_activity(events: &[ReviewEvent], as_of: DateTime<Utc>) -> ReviewActivity {
    let today = as_of.date_naive();
    let past: Vec<&ReviewEvent> = events.iter().filter(|event| event.reviewed_at <= as_of).collect();

    let todays: Vec<&&ReviewEvent> = past
        .iter()
        .filter(|event| event.reviewed_at.date_naive() == today)
        .collect();

    let days: BTreeSet<NaiveDate> = past.iter().map(|event| event.reviewed_at.date_naive()).collect();

    ReviewActivity {
        reviews_today: todays.len(),
        correct_today: todays.iter().filter(|event| event.is_correct()).count(),
        streak_days: streak_ending(&days, today),
    }
}

/// Consecutive study days ending today, or yesterday if today is still open
fn streak_ending(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.checked_sub_days(Days::new(1)) {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::NewCard;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
    }

    fn card(card_id: i32, repetitions: i32, easiness: f64, mastery: f64) -> CardReviewState {
        let mut card = CardReviewState::new(
            card_id,
            NewCard {
                owner_id: 1,
                topic_id: None,
                front: format!("front {card_id}"),
                back: "back".to_string(),
            },
            as_of() - Duration::days(30),
        );
        card.repetition_count = repetitions;
        card.easiness_factor = easiness;
        card.mastery_level = mastery;
        if repetitions > 0 {
            card.last_reviewed_at = Some(as_of() - Duration::days(2));
            card.next_review_at = as_of() + Duration::days(3);
        }
        card
    }

    fn event(event_id: i32, difficulty: i32, reviewed_at: DateTime<Utc>) -> ReviewEvent {
        ReviewEvent {
            event_id,
            card_id: 1,
            owner_id: 1,
            difficulty,
            retention: 0.8,
            interval_days: 1,
            easiness_factor: 2.5,
            reviewed_at,
        }
    }

    #[test]
    fn test_empty_collection() {
        let stats = compute_stats(&[], as_of(), &EngineConfig::default());

        assert_eq!(stats.due_count, 0);
        assert_eq!(stats.mastered_count, 0);
        assert_eq!(stats.struggling_count, 0);
        assert_eq!(stats.average_retention, 0.0);
        assert_eq!(stats.learning_efficiency, 0.0);
        assert_eq!(stats.recommended_daily_reviews, 5);
    }

    #[test]
    fn test_counts() {
        let cards = vec![
            card(1, 0, 2.5, 0.0),  // new, due
            card(2, 6, 2.6, 0.9),  // mastered
            card(3, 4, 1.5, 0.4),  // struggling
            card(4, 5, 2.5, 0.65), // neither
        ];
        let stats = compute_stats(&cards, as_of(), &EngineConfig::default());

        assert_eq!(stats.total_cards, 4);
        assert_eq!(stats.reviewed_cards, 3);
        assert_eq!(stats.due_count, 1);
        assert_eq!(stats.mastered_count, 1);
        assert_eq!(stats.struggling_count, 1);
        assert_eq!(stats.learning_efficiency, 0.5);
    }

    #[test]
    fn test_average_retention_skips_unreviewed() {
        let reviewed = card(2, 2, 2.5, 0.3);
        let expected = current_retention(&reviewed, as_of());
        let stats = compute_stats(&[card(1, 0, 2.5, 0.0), reviewed], as_of(), &EngineConfig::default());

        assert!((stats.average_retention - expected).abs() < 1e-12);
        assert!(stats.average_retention > 0.0);
    }

    #[test]
    fn test_mastery_threshold_is_configurable() {
        let cards = vec![card(1, 5, 2.5, 0.65)];
        let strict = compute_stats(&cards, as_of(), &EngineConfig::default());
        let lenient = compute_stats(
            &cards,
            as_of(),
            &EngineConfig {
                mastery_threshold: 0.6,
                ..EngineConfig::default()
            },
        );

        assert_eq!(strict.mastered_count, 0);
        assert_eq!(lenient.mastered_count, 1);
    }

    #[test]
    fn test_efficiency_edges() {
        assert_eq!(learning_efficiency(0, 0), 0.0);
        assert_eq!(learning_efficiency(3, 0), 1.0);
        assert_eq!(learning_efficiency(0, 2), 0.0);
    }

    #[test]
    fn test_recommended_daily_reviews_clamped() {
        assert_eq!(recommended_daily_reviews(0, 0.0), 5);
        assert_eq!(recommended_daily_reviews(50, 0.0), 10);
        assert_eq!(recommended_daily_reviews(51, 0.0), 11);
        assert_eq!(recommended_daily_reviews(1000, 0.5), 20);
        assert_eq!(recommended_daily_reviews(1000, 1.0), 5);
    }

    #[test]
    fn test_activity_and_streak() {
        let events = vec![
            event(1, 4, as_of() - Duration::days(3)),
            event(2, 5, as_of() - Duration::days(2)),
            event(3, 2, as_of() - Duration::days(1)),
            event(4, 5, as_of() - Duration::hours(2)),
            event(5, 1, as_of() - Duration::hours(1)),
        ];
        let activity = compute_activity(&events, as_of());

        assert_eq!(activity.reviews_today, 2);
        assert_eq!(activity.correct_today, 1);
        assert_eq!(activity.streak_days, 4);
    }

    #[test]
    fn test_streak_survives_until_today_is_over() {
        let events = vec![
            event(1, 4, as_of() - Duration::days(2)),
            event(2, 4, as_of() - Duration::days(1)),
        ];
        assert_eq!(compute_activity(&events, as_of()).streak_days, 2);

        let stale = vec![event(1, 4, as_of() - Duration::days(3))];
        assert_eq!(compute_activity(&stale, as_of()).streak_days, 0);
        assert_eq!(compute_activity(&[], as_of()), ReviewActivity::default());
    }
}
