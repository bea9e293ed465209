//! Modified SM-2 scheduling.
//!
//! Difficulty ratings (1-5):
//! - 1: Forgotten
//! - 2: Wrong, but recognised once shown
//! - 3: Recalled with serious difficulty
//! - 4: Recalled after hesitation
//! - 5: Perfect recall
//!
//! Ratings below 3 are lapses and send the card back to the learning phase.

use chrono::{DateTime, Utc};

use super::retention::{memory_strength, reference_time, retention};
use crate::data::models::{CardReviewState, MIN_EASINESS_FACTOR, SrsError, SrsResult};
use crate::utils::{add_days, days_between};

pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 5;

/// Ratings below this count as a lapse
pub const PASSING_DIFFICULTY: i32 = 3;

/// Interval after the second consecutive success
pub const SECOND_INTERVAL_DAYS: i32 = 6;

/// Upper bound on any interval (100 years)
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

/// Repetitions after which the repetition part of mastery saturates
const MASTERY_REPETITIONS: f64 = 5.0;

/// Easiness at which the easiness part of mastery saturates
const MASTERY_EASINESS_CEILING: f64 = 3.0;

const MASTERY_REPETITION_WEIGHT: f64 = 0.6;
const MASTERY_EASINESS_WEIGHT: f64 = 0.4;

/// Result of applying one review to a card
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub card: CardReviewState,
    pub interval_days: i32,
}

pub fn validate_difficulty(difficulty: i32) -> SrsResult<()> {
    if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        Ok(())
    } else {
        Err(SrsError::Validation(format!(
            "difficulty rating {} is outside {}..={}",
            difficulty, MIN_DIFFICULTY, MAX_DIFFICULTY
        )))
    }
}

pub fn is_lapse(difficulty: i32) -> bool {
    difficulty < PASSING_DIFFICULTY
}

/// EF' = max(1.3, EF + (0.1 - (5-d) * (0.08 + (5-d) * 0.02)))
pub fn next_easiness_factor(easiness_factor: f64, difficulty: i32) -> f64 {
    let q = (MAX_DIFFICULTY - difficulty) as f64;
    (easiness_factor + (0.1 - q * (0.08 + q * 0.02))).max(MIN_EASINESS_FACTOR)
}

/// Interval in days for the repetition count reached by this review.
///
/// `previous_interval_days` is the real time elapsed since the prior review.
pub fn next_interval_days(repetition_count: i32, easiness_factor: f64, previous_interval_days: f64) -> i32 {
    match repetition_count {
        i32::MIN..=1 => 1,
        2 => SECOND_INTERVAL_DAYS,
        _ => {
            let interval = (previous_interval_days.max(1.0) * easiness_factor).round();
            (interval as i32).clamp(1, MAX_INTERVAL_DAYS)
        }
    }
}

/// Normalised blend of repetitions and easiness in `[0, 1]`
pub fn mastery_blend(repetition_count: i32, easiness_factor: f64) -> f64 {
    let repetitions = (repetition_count.max(0) as f64 / MASTERY_REPETITIONS).min(1.0);
    let easiness = ((easiness_factor - MIN_EASINESS_FACTOR)
        / (MASTERY_EASINESS_CEILING - MIN_EASINESS_FACTOR))
        .clamp(0.0, 1.0);

    (MASTERY_REPETITION_WEIGHT * repetitions + MASTERY_EASINESS_WEIGHT * easiness).clamp(0.0, 1.0)
}

/// Compute the state of `card` after it is reviewed at `reviewed_at`.
///
/// Pure: the caller is responsible for persisting the returned card.
pub fn apply_review(
    card: &CardReviewState,
    difficulty: i32,
    reviewed_at: DateTime<Utc>,
) -> SrsResult<ReviewOutcome> {
    validate_difficulty(difficulty)?;

    if let Some(last) = card.last_reviewed_at {
        if reviewed_at < last {
            return Err(SrsError::Validation(format!(
                "review time {} precedes the last review at {}",
                reviewed_at, last
            )));
        }
    }

    // How well the card was remembered right before this review
    let prior_retention = retention(
        days_between(reference_time(card), reviewed_at),
        memory_strength(card.repetition_count, card.easiness_factor),
    );

    let easiness_factor = next_easiness_factor(card.easiness_factor, difficulty);

    let repetition_count = if is_lapse(difficulty) {
        0
    } else {
        card.repetition_count.saturating_add(1)
    };

    let previous_interval_days = card
        .last_reviewed_at
        .map(|last| days_between(last, reviewed_at))
        .unwrap_or(1.0);
    let interval_days = next_interval_days(repetition_count, easiness_factor, previous_interval_days);

    let blend = mastery_blend(repetition_count, easiness_factor);
    let mastery_level = if is_lapse(difficulty) {
        card.mastery_level.min(blend)
    } else {
        card.mastery_level.max(blend)
    };

    let mut updated = card.clone();
    updated.repetition_count = repetition_count;
    updated.easiness_factor = easiness_factor;
    updated.next_review_at = add_days(reviewed_at, interval_days);
    updated.last_reviewed_at = Some(reviewed_at);
    updated.last_retention = prior_retention;
    updated.mastery_level = mastery_level.clamp(0.0, 1.0);

    Ok(ReviewOutcome {
        card: updated,
        interval_days,
    })
}

/// Interval each rating 1..=5 would produce if the card were reviewed now
pub fn preview_intervals(card: &CardReviewState, now: DateTime<Utc>) -> SrsResult<[i32; 5]> {
    let mut intervals = [0; 5];
    for (slot, difficulty) in intervals.iter_mut().zip(MIN_DIFFICULTY..=MAX_DIFFICULTY) {
        *slot = apply_review(card, difficulty, now)?.interval_days;
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{INITIAL_EASINESS_FACTOR, NewCard};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn new_card() -> CardReviewState {
        CardReviewState::new(
            1,
            NewCard {
                owner_id: 7,
                topic_id: None,
                front: "你好".to_string(),
                back: "hello".to_string(),
            },
            t0(),
        )
    }

    #[test]
    fn test_first_review_perfect() {
        let outcome = apply_review(&new_card(), 5, t0()).unwrap();

        assert_eq!(outcome.card.repetition_count, 1);
        assert_eq!(outcome.interval_days, 1);
        assert_eq!(outcome.card.next_review_at, t0() + Duration::days(1));
        assert_eq!(outcome.card.last_reviewed_at, Some(t0()));
    }

    #[test]
    fn test_second_review_is_six_days() {
        let first = apply_review(&new_card(), 5, t0()).unwrap().card;
        let second_at = t0() + Duration::days(1);
        let second = apply_review(&first, 5, second_at).unwrap();

        assert_eq!(second.card.repetition_count, 2);
        assert_eq!(second.card.next_review_at, t0() + Duration::days(7));
    }

    #[test]
    fn test_third_review_multiplies_elapsed_interval() {
        let mut card = new_card();
        card = apply_review(&card, 4, t0()).unwrap().card;
        card = apply_review(&card, 4, t0() + Duration::days(1)).unwrap().card;
        let third = apply_review(&card, 4, t0() + Duration::days(7)).unwrap();

        // 6 elapsed days * EF 2.5
        assert_eq!(third.card.repetition_count, 3);
        assert_eq!(third.interval_days, 15);
    }

    #[test]
    fn test_lapse_resets_schedule() {
        let mut card = new_card();
        card = apply_review(&card, 5, t0()).unwrap().card;
        card = apply_review(&card, 5, t0() + Duration::days(1)).unwrap().card;
        let ef_before = card.easiness_factor;

        let lapse_at = t0() + Duration::days(7);
        let lapse = apply_review(&card, 2, lapse_at).unwrap();

        assert_eq!(lapse.card.repetition_count, 0);
        assert!(lapse.card.easiness_factor < ef_before);
        assert_eq!(lapse.card.next_review_at, lapse_at + Duration::days(1));
    }

    #[test]
    fn test_easiness_floor_holds_for_every_rating() {
        for start in [MIN_EASINESS_FACTOR, 1.35, 1.8, INITIAL_EASINESS_FACTOR, 3.4] {
            for difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY {
                assert!(next_easiness_factor(start, difficulty) >= MIN_EASINESS_FACTOR);
            }
        }

        let mut card = new_card();
        for day in 0..20 {
            card = apply_review(&card, 1, t0() + Duration::days(day)).unwrap().card;
            assert!(card.easiness_factor >= MIN_EASINESS_FACTOR);
        }
        assert_eq!(card.easiness_factor, MIN_EASINESS_FACTOR);
    }

    #[test]
    fn test_easiness_update_values() {
        assert!((next_easiness_factor(2.5, 5) - 2.6).abs() < 1e-9);
        assert!((next_easiness_factor(2.5, 4) - 2.5).abs() < 1e-9);
        assert!((next_easiness_factor(2.5, 3) - 2.36).abs() < 1e-9);
    }

    #[test]
    fn test_repetitions_strictly_increase_on_success() {
        let mut card = new_card();
        let mut at = t0();
        for expected in 1..=8 {
            let outcome = apply_review(&card, 3, at).unwrap();
            assert_eq!(outcome.card.repetition_count, expected);
            at = outcome.card.next_review_at;
            card = outcome.card;
        }
    }

    #[test]
    fn test_next_review_after_last_review() {
        let mut card = new_card();
        let mut at = t0();
        for difficulty in [5, 3, 1, 4, 2, 5, 5, 3] {
            card = apply_review(&card, difficulty, at).unwrap().card;
            assert!(card.next_review_at > card.last_reviewed_at.unwrap());
            at += Duration::hours(30);
        }
    }

    #[test]
    fn test_mastery_monotone_on_success_and_not_raised_by_lapse() {
        let mut card = new_card();
        let mut at = t0();
        let mut previous = card.mastery_level;
        for difficulty in [5, 3, 3, 3, 4] {
            card = apply_review(&card, difficulty, at).unwrap().card;
            assert!(card.mastery_level >= previous);
            previous = card.mastery_level;
            at = card.next_review_at;
        }

        let lapsed = apply_review(&card, 1, at).unwrap().card;
        assert!(lapsed.mastery_level <= card.mastery_level);
        assert!(lapsed.mastery_level <= 1.0);
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        for difficulty in [0, 6, -1] {
            let err = apply_review(&new_card(), difficulty, t0()).unwrap_err();
            assert!(matches!(err, SrsError::Validation(_)));
        }
    }

    #[test]
    fn test_rejects_review_before_last_review() {
        let card = apply_review(&new_card(), 4, t0()).unwrap().card;
        let err = apply_review(&card, 4, t0() - Duration::hours(1)).unwrap_err();
        assert!(matches!(err, SrsError::Validation(_)));
    }

    #[test]
    fn test_last_retention_reflects_elapsed_time() {
        let card = apply_review(&new_card(), 5, t0()).unwrap().card;
        let on_time = apply_review(&card, 5, t0() + Duration::days(1)).unwrap().card;
        let late = apply_review(&card, 5, t0() + Duration::days(10)).unwrap().card;

        assert!(on_time.last_retention > late.last_retention);
        assert!((0.0..=1.0).contains(&late.last_retention));
    }

    #[test]
    fn test_preview_intervals() {
        let mut card = new_card();
        card = apply_review(&card, 5, t0()).unwrap().card;

        let preview = preview_intervals(&card, t0() + Duration::days(1)).unwrap();
        assert_eq!(preview, [1, 1, 6, 6, 6]);
        assert_eq!(card.repetition_count, 1);
    }

    fn card_in_state(
        repetition_count: i32,
        easiness_factor: f64,
        mastery_level: f64,
        hours_since_review: Option<i64>,
    ) -> CardReviewState {
        let mut card = new_card();
        card.repetition_count = repetition_count;
        card.easiness_factor = easiness_factor;
        card.mastery_level = mastery_level;
        card.last_reviewed_at = hours_since_review.map(|hours| t0() - Duration::hours(hours));
        card
    }

    proptest! {
        #[test]
        fn prop_easiness_never_below_floor(
            easiness in MIN_EASINESS_FACTOR..5.0f64,
            difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY,
        ) {
            prop_assert!(next_easiness_factor(easiness, difficulty) >= MIN_EASINESS_FACTOR);
        }

        #[test]
        fn prop_repetitions_follow_rating(
            repetition_count in 0i32..200,
            easiness in MIN_EASINESS_FACTOR..5.0f64,
            hours in proptest::option::of(0i64..100_000),
            difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY,
        ) {
            let card = card_in_state(repetition_count, easiness, 0.0, hours);
            let outcome = apply_review(&card, difficulty, t0()).unwrap();

            if difficulty >= PASSING_DIFFICULTY {
                prop_assert!(outcome.card.repetition_count > repetition_count);
            } else {
                prop_assert_eq!(outcome.card.repetition_count, 0);
            }
            prop_assert!(outcome.card.easiness_factor >= MIN_EASINESS_FACTOR);
            prop_assert!(outcome.card.next_review_at > t0());
        }

        #[test]
        fn prop_mastery_moves_with_rating(
            repetition_count in 0i32..200,
            easiness in MIN_EASINESS_FACTOR..5.0f64,
            mastery in 0.0..=1.0f64,
            hours in proptest::option::of(0i64..100_000),
            difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY,
        ) {
            let card = card_in_state(repetition_count, easiness, mastery, hours);
            let updated = apply_review(&card, difficulty, t0()).unwrap().card;

            if is_lapse(difficulty) {
                prop_assert!(updated.mastery_level <= mastery);
            } else {
                prop_assert!(updated.mastery_level >= mastery);
            }
            prop_assert!((0.0..=1.0).contains(&updated.mastery_level));
        }
    }
}
