use serde::Serialize;

/// Summary of a user's card collection at a point in time
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_cards: usize,
    pub reviewed_cards: usize,
    pub due_count: usize,
    pub mastered_count: usize,
    pub struggling_count: usize,
    pub average_retention: f64,
    pub learning_efficiency: f64,
    pub recommended_daily_reviews: u32,
    pub activity: ReviewActivity,
}

/// Recent review history read from the log
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewActivity {
    pub reviews_today: usize,
    pub correct_today: usize,
    pub streak_days: u32,
}
