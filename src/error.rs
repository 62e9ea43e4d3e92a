use crate::io_struct::PredictResponse;
use crate::schema::SchemaError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Failures surfaced by `/predict`. Every variant maps to a 400 response
/// carrying only the message.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Model is unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Schema error: {0}")]
    Schema(SchemaError),

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl From<SchemaError> for PredictError {
    fn from(err: SchemaError) -> Self {
        match err {
            // A value that is present but not a number is the caller's fault.
            SchemaError::NonNumeric { .. } => PredictError::MalformedInput(err.to_string()),
            SchemaError::MissingField(_) => PredictError::Schema(err),
        }
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(PredictResponse::failure(self.to_string()))
    }
}
