use std::collections::HashSet;
use crate::models::PollRequest;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 7;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("A poll can have between {MIN_OPTIONS} and {MAX_OPTIONS} options")]
    TooFewOptions,
    #[error("A poll can have between {MIN_OPTIONS} and {MAX_OPTIONS} options")]
    TooManyOptions,
    #[error("Poll question must not be empty")]
    EmptyQuestion,
    #[error("Empty option text")]
    EmptyOption,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
}

pub fn validate_poll_request(request: &PollRequest) -> Result<(), ValidationError> {
    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }
    if request.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }
    if request.question.trim().is_empty() { return Err(ValidationError::EmptyQuestion); }
    if request.options.iter().any(|opt| opt.trim().is_empty()) { return Err(ValidationError::EmptyOption); }

    // Each option gets exactly one seed row, so labels must be unique.
    let mut seen = HashSet::with_capacity(request.options.len());
    if let Some(dup) = request.options.iter().find(|opt| !seen.insert(opt.as_str())) {
        return Err(ValidationError::DuplicateOption(dup.clone()));
    }

    Ok(())
}
