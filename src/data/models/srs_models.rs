use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

// Errors surfaced by the review engine and its persistence port
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SrsError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Card {0} not found")]
    NotFound(i32),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

pub type SrsResult<T> = Result<T, SrsError>;

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub owner_id: i32,
    #[serde(default)]
    pub topic_id: Option<i32>,
    #[validate(length(min = 1, message = "Front must not be empty"))]
    pub front: String,
    #[validate(length(min = 1, message = "Back must not be empty"))]
    pub back: String,
}
