//! Exponential forgetting curve.
//!
//! Recall probability decays as `R = exp(-t / max(1, S))` where `t` is the
//! number of days since the reference review and `S` the memory strength of
//! the card. The result is always within `[0, 1]`.

use chrono::{DateTime, Utc};

use crate::data::models::CardReviewState;
use crate::utils::days_between;

/// Lower bound of memory strength
pub const MIN_MEMORY_STRENGTH: f64 = 0.1;

/// Estimated recall probability after `days_since_review` days
pub fn retention(days_since_review: f64, memory_strength: f64) -> f64 {
    let elapsed = if days_since_review.is_finite() {
        days_since_review.max(0.0)
    } else if days_since_review > 0.0 {
        return 0.0;
    } else {
        0.0
    };
    let strength = if memory_strength.is_nan() {
        1.0
    } else {
        memory_strength.max(1.0)
    };

    let value = (-elapsed / strength).exp();
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Strength grows with successful repetitions and with easiness
pub fn memory_strength(repetition_count: i32, easiness_factor: f64) -> f64 {
    (repetition_count.max(0) as f64 * easiness_factor).max(MIN_MEMORY_STRENGTH)
}

/// Reference point for decay: the last review, or authoring for new cards
pub fn reference_time(card: &CardReviewState) -> DateTime<Utc> {
    card.last_reviewed_at.unwrap_or(card.created_at)
}

/// Current recall estimate for a card
pub fn current_retention(card: &CardReviewState, as_of: DateTime<Utc>) -> f64 {
    retention(
        days_between(reference_time(card), as_of),
        memory_strength(card.repetition_count, card.easiness_factor),
    )
}
