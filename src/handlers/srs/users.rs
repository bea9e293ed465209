use axum::extract::{Json, Path, State};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    data::models::{CardReviewState, LearningStats, SrsError, StudyPreferences, StudySchedule},
    srs::SrsService,
};

pub async fn due_cards(
    State(service): State<Arc<SrsService>>,
    Path(owner_id): Path<i32>,
) -> Result<Json<Vec<CardReviewState>>, SrsError> {
    Ok(Json(service.get_due_cards(owner_id, Utc::now())?))
}

pub async fn learning_stats(
    State(service): State<Arc<SrsService>>,
    Path(owner_id): Path<i32>,
) -> Result<Json<LearningStats>, SrsError> {
    Ok(Json(service.get_learning_stats(owner_id, Utc::now())?))
}

// An empty body falls back to the default preferences
pub async fn study_schedule(
    State(service): State<Arc<SrsService>>,
    Path(owner_id): Path<i32>,
    payload: Option<Json<StudyPreferences>>,
) -> Result<Json<StudySchedule>, SrsError> {
    let preferences = payload.map(|Json(p)| p).unwrap_or_default();
    Ok(Json(service.generate_study_schedule(owner_id, &preferences, Utc::now())?))
}
