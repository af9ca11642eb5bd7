use crate::error::ApiError;

/// Reject a speech text that has nothing to analyze.
///
/// No upper bound is enforced; long speeches are forwarded to the model as-is.
pub fn validate_speech_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "speech_text cannot be empty".to_string(),
        ));
    }
    Ok(())
}
