use diesel::r2d2::PoolError;
use diesel::result::Error as DieselError;
use validator::ValidationErrors;

use crate::data::models::SrsError;

impl From<DieselError> for SrsError {
    fn from(err: DieselError) -> Self {
        SrsError::Persistence(err.to_string())
    }
}

impl From<PoolError> for SrsError {
    fn from(err: PoolError) -> Self {
        SrsError::Persistence(format!("connection pool: {}", err))
    }
}

impl From<ValidationErrors> for SrsError {
    fn from(err: ValidationErrors) -> Self {
        SrsError::Validation(err.to_string())
    }
}
