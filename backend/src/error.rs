use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{Error as ErrorBody, ErrorCode, ValidationError};
use thiserror::Error;
use tracing::error;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input - {0}")]
    InvalidPollDefinition(#[from] ValidationError),
    #[error("Invalid poll identifier: {0}")]
    MalformedIdentifier(String),
    #[error("Option {0:?} is not available for this poll")]
    InvalidOption(String),
    #[error("Could not find poll with identifier {0}")]
    PollNotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidPollDefinition(_) => ErrorCode::ValidationFailed,
            ApiError::MalformedIdentifier(_) | ApiError::InvalidOption(_) => ErrorCode::InvalidInput,
            ApiError::PollNotFound(_) => ErrorCode::NotFound,
            ApiError::Storage(_) => ErrorCode::SystemError,
        }
    }

    pub fn status(&self) -> Status {
        Status::new(self.code().status_code())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let body = match &self {
            // Storage failures are logged in full but not echoed to clients.
            ApiError::Storage(e) => {
                error!("Request {} failed: {}", req.uri(), e);
                ErrorBody::new(self.code(), "An internal server error occurred.")
            }
            ApiError::InvalidPollDefinition(e) =>
                ErrorBody::new(self.code(), self.to_string()).with_details(format!("{:?}", e)),
            _ => ErrorBody::new(self.code(), self.to_string()),
        };

        rocket::Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}
