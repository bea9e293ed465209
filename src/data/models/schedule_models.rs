use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Part of the day a user is willing to study in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Morning,
    Afternoon,
    Evening,
}

impl TimeWindow {
    /// Start time of the slot offered for this window (UTC)
    pub fn slot_time(self) -> NaiveTime {
        let hour = match self {
            TimeWindow::Morning => 9,
            TimeWindow::Afternoon => 14,
            TimeWindow::Evening => 19,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Illustrative retention expected when studying in this window
    pub fn expected_retention(self) -> f64 {
        match self {
            TimeWindow::Morning => 0.90,
            TimeWindow::Afternoon => 0.85,
            TimeWindow::Evening => 0.80,
        }
    }
}

fn default_time_windows() -> BTreeSet<TimeWindow> {
    BTreeSet::from([TimeWindow::Morning, TimeWindow::Evening])
}

fn default_max_session_minutes() -> u32 {
    30
}

fn default_target_retention() -> f64 {
    0.85
}

/// Study preferences supplied with a schedule request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreferences {
    #[serde(default = "default_time_windows")]
    pub available_time_windows: BTreeSet<TimeWindow>,
    #[serde(default = "default_max_session_minutes")]
    #[validate(range(min = 1, max = 480, message = "Session length must be between 1 and 480 minutes"))]
    pub max_session_minutes: u32,
    #[serde(default = "default_target_retention")]
    #[validate(range(min = 0.0, max = 1.0, message = "Target retention must be between 0 and 1"))]
    pub target_retention: f64,
}

impl Default for StudyPreferences {
    fn default() -> Self {
        Self {
            available_time_windows: default_time_windows(),
            max_session_minutes: default_max_session_minutes(),
            target_retention: default_target_retention(),
        }
    }
}

/// A due card ranked for study
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCard {
    pub card_id: i32,
    pub retention: f64,
    pub urgency: f64,
    pub next_review_at: DateTime<Utc>,
}

/// Prefix of the urgency ranking that fits a time box
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyBatch {
    pub card_ids: Vec<i32>,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyBatches {
    /// Fits in five minutes
    pub quick: StudyBatch,
    /// Fits in fifteen minutes
    pub standard: StudyBatch,
    /// Fits in the user's maximum session length
    pub focus: StudyBatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub window: TimeWindow,
    pub time: String,
    pub expected_retention: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySchedule {
    pub ranked_cards: Vec<ScoredCard>,
    pub batches: StudyBatches,
    pub optimal_slots: Vec<TimeSlot>,
    pub notification_times: Vec<String>,
    pub estimated_minutes: u32,
    pub cards_below_target: usize,
}

/// What a reminder scheduler needs to deliver notifications
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPlan {
    pub times: Vec<String>,
    pub batches: Vec<Vec<i32>>,
}

impl StudySchedule {
    pub fn is_empty(&self) -> bool {
        self.ranked_cards.is_empty()
    }

    pub fn notification_plan(&self) -> NotificationPlan {
        let batches = [&self.batches.quick, &self.batches.standard, &self.batches.focus]
            .into_iter()
            .filter(|batch| !batch.card_ids.is_empty())
            .map(|batch| batch.card_ids.clone())
            .collect();

        NotificationPlan {
            times: self.notification_times.clone(),
            batches,
        }
    }
}
