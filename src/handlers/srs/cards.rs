use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::{
    data::models::{CardReviewState, CreateCardRequest, NewCard, ReviewRequest, SrsError},
    srs::{IntervalPreview, SrsService},
};

pub async fn create_card(
    State(service): State<Arc<SrsService>>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardReviewState>), SrsError> {
    payload.validate()?;

    let card = service.create_card(
        NewCard {
            owner_id: payload.owner_id,
            topic_id: payload.topic_id,
            front: payload.front,
            back: payload.back,
        },
        Utc::now(),
    )?;

    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(service): State<Arc<SrsService>>,
    Path(card_id): Path<i32>,
) -> Result<Json<CardReviewState>, SrsError> {
    Ok(Json(service.get_card(card_id)?))
}

pub async fn preview_card(
    State(service): State<Arc<SrsService>>,
    Path(card_id): Path<i32>,
) -> Result<Json<IntervalPreview>, SrsError> {
    Ok(Json(service.preview_card(card_id, Utc::now())?))
}

pub async fn review_card(
    State(service): State<Arc<SrsService>>,
    Path(card_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<CardReviewState>, SrsError> {
    payload.validate().map_err(|e| {
        log::warn!("Invalid review payload for card {}: {}", card_id, e);
        SrsError::from(e)
    })?;

    Ok(Json(service.record_review(card_id, payload.difficulty, Utc::now())?))
}
