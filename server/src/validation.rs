use crate::error::ApiError;

/// Validate a generation request and return the text to synthesize.
///
/// Only a missing or empty text is rejected. Length limits and voice names
/// are the upstream's business, so both are forwarded as given.
pub fn validate_generate_request(text: Option<&str>) -> Result<&str, ApiError> {
    match text {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ApiError::InvalidInput("Text is required".to_string())),
    }
}
