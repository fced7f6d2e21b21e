use crate::error::ApiError;
use shared::models::PollId;

pub fn parse_poll_id(id: &str) -> Result<PollId, ApiError> {
    id.trim().parse::<PollId>().map_err(|_| ApiError::MalformedIdentifier(id.to_string()))
}
