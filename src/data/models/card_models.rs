use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::{cards, review_events};

/// Easiness factor every new card starts with
pub const INITIAL_EASINESS_FACTOR: f64 = 2.5;

/// Easiness factor never drops below this
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Scheduling state of a single flashcard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewState {
    pub card_id: i32,
    pub owner_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i32>,
    pub front: String,
    pub back: String,
    /// Consecutive successful reviews since the last lapse
    pub repetition_count: i32,
    pub easiness_factor: f64,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Recall estimate cached at the last review
    pub last_retention: f64,
    pub mastery_level: f64,
    pub created_at: DateTime<Utc>,
}

impl CardReviewState {
    /// Fresh card, due immediately
    pub fn new(card_id: i32, card: NewCard, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            owner_id: card.owner_id,
            topic_id: card.topic_id,
            front: card.front,
            back: card.back,
            repetition_count: 0,
            easiness_factor: INITIAL_EASINESS_FACTOR,
            next_review_at: now,
            last_reviewed_at: None,
            last_retention: 0.0,
            mastery_level: 0.0,
            created_at: now,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_at <= as_of
    }

    pub fn is_reviewed(&self) -> bool {
        self.last_reviewed_at.is_some()
    }
}

/// Content of a card being authored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub owner_id: i32,
    #[serde(default)]
    pub topic_id: Option<i32>,
    pub front: String,
    pub back: String,
}

/// A review about to be appended to the log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewEvent {
    pub card_id: i32,
    pub owner_id: i32,
    /// 1 = forgotten, 5 = perfect recall
    pub difficulty: i32,
    /// Recall estimate right before the review
    pub retention: f64,
    pub interval_days: i32,
    pub easiness_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

/// An entry of the append-only review log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub event_id: i32,
    pub card_id: i32,
    pub owner_id: i32,
    pub difficulty: i32,
    pub retention: f64,
    pub interval_days: i32,
    pub easiness_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn from_new(event_id: i32, event: NewReviewEvent) -> Self {
        Self {
            event_id,
            card_id: event.card_id,
            owner_id: event.owner_id,
            difficulty: event.difficulty,
            retention: event.retention,
            interval_days: event.interval_days,
            easiness_factor: event.easiness_factor,
            reviewed_at: event.reviewed_at,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.difficulty >= 3
    }
}

/// Row of the `cards` table
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardRow {
    pub card_id: i32,
    pub owner_id: i32,
    pub topic_id: Option<i32>,
    pub front: String,
    pub back: String,
    pub repetition_count: i32,
    pub easiness_factor: f64,
    pub next_review_at: NaiveDateTime,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub last_retention: f64,
    pub mastery_level: f64,
    pub created_at: NaiveDateTime,
}

impl From<CardRow> for CardReviewState {
    fn from(row: CardRow) -> Self {
        Self {
            card_id: row.card_id,
            owner_id: row.owner_id,
            topic_id: row.topic_id,
            front: row.front,
            back: row.back,
            repetition_count: row.repetition_count,
            easiness_factor: row.easiness_factor,
            next_review_at: row.next_review_at.and_utc(),
            last_reviewed_at: row.last_reviewed_at.map(|t| t.and_utc()),
            last_retention: row.last_retention,
            mastery_level: row.mastery_level,
            created_at: row.created_at.and_utc(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cards)]
pub struct NewCardRow<'a> {
    pub owner_id: i32,
    pub topic_id: Option<i32>,
    pub front: &'a str,
    pub back: &'a str,
    pub repetition_count: i32,
    pub easiness_factor: f64,
    pub next_review_at: NaiveDateTime,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub last_retention: f64,
    pub mastery_level: f64,
    pub created_at: NaiveDateTime,
}

/// Row of the `review_events` table
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = review_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewEventRow {
    pub event_id: i32,
    pub card_id: i32,
    pub owner_id: i32,
    pub difficulty: i32,
    pub retention: f64,
    pub interval_days: i32,
    pub easiness_factor: f64,
    pub reviewed_at: NaiveDateTime,
}

impl From<ReviewEventRow> for ReviewEvent {
    fn from(row: ReviewEventRow) -> Self {
        Self {
            event_id: row.event_id,
            card_id: row.card_id,
            owner_id: row.owner_id,
            difficulty: row.difficulty,
            retention: row.retention,
            interval_days: row.interval_days,
            easiness_factor: row.easiness_factor,
            reviewed_at: row.reviewed_at.and_utc(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = review_events)]
pub struct NewReviewEventRow {
    pub card_id: i32,
    pub owner_id: i32,
    pub difficulty: i32,
    pub retention: f64,
    pub interval_days: i32,
    pub easiness_factor: f64,
    pub reviewed_at: NaiveDateTime,
}

impl From<&NewReviewEvent> for NewReviewEventRow {
    fn from(event: &NewReviewEvent) -> Self {
        Self {
            card_id: event.card_id,
            owner_id: event.owner_id,
            difficulty: event.difficulty,
            retention: event.retention,
            interval_days: event.interval_days,
            easiness_factor: event.easiness_factor,
            reviewed_at: event.reviewed_at.naive_utc(),
        }
    }
}
