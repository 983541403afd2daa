//! Field parsing shared by the product and outlet forms.

use std::str::FromStr;

/// A form field failed validation. The message is shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    #[error("{0} is not a valid option")]
    InvalidChoice(&'static str),
    #[error("latitude and longitude must be given together")]
    PartialCoordinates,
}

/// Trimmed, non-empty text.
pub(crate) fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(trimmed.to_owned())
}

/// Trimmed text, `None` when blank.
pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Parse a number, `None` when blank.
pub(crate) fn optional_number<T: FromStr>(
    value: &str,
    field: &'static str,
) -> Result<Option<T>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| FormError::NotANumber(field))
}
