pub mod cards;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::srs::SrsService;

pub fn srs_router(service: Arc<SrsService>) -> Router {
    Router::new()
        .route("/cards", post(cards::create_card))
        .route("/cards/{card_id}", get(cards::get_card))
        .route("/cards/{card_id}/preview", get(cards::preview_card))
        .route("/cards/{card_id}/review", post(cards::review_card))
        .route("/users/{owner_id}/due", get(users::due_cards))
        .route("/users/{owner_id}/stats", get(users::learning_stats))
        .route("/users/{owner_id}/schedule", post(users::study_schedule))
        .with_state(service)
}
