//! Label rules shared by survey titles, questions, and options.

use crate::error::CoreError;

/// Maximum length of a label, in characters.
pub const MAX_LABEL_LENGTH: usize = 1000;

/// Trim a user-supplied label and reject empty or oversized values.
pub fn normalize_label(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Label must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Label must be at most {MAX_LABEL_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
