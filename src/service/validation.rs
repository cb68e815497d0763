//! Request validation for URL text and entry metadata.

use crate::error::AppError;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub struct RequestValidator;

impl RequestValidator {
    /// Trim and check a URL field. Must be an absolute http(s) URL.
    pub fn url(field: &str, raw: &str) -> Result<String, AppError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
        if value.chars().count() > MAX_URL_LENGTH {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, MAX_URL_LENGTH
            )));
        }
        let parsed = Url::parse(value)
            .map_err(|_| AppError::Validation(format!("{} must be an absolute URL", field)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(value.to_string()),
            other => Err(AppError::Validation(format!(
                "{} must use http or https, not '{}'",
                field, other
            ))),
        }
    }

    /// Optional free text: blank becomes `None`, overlong is rejected.
    pub fn optional_text(
        field: &str,
        raw: Option<&str>,
        max: usize,
    ) -> Result<Option<String>, AppError> {
        let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
        Ok(Some(value.to_string()))
    }
}
