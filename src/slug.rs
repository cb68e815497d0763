//! Public list slugs: random generation and validation of user-chosen ones.

use crate::error::AppError;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Characters a generated slug is drawn from.
pub const SLUG_ALPHABET: &[u8] = b"1234567890abcdefghijklmnopqrstuvwxyz";
pub const SLUG_LENGTH: usize = 10;
pub const MAX_CUSTOM_SLUG_LENGTH: usize = 64;

static CUSTOM_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern compiles"));

/// Random 10-character slug over `0-9a-z`.
pub fn generate_slug() -> String {
    let mut rng = rand::thread_rng();
    (0..SLUG_LENGTH)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Check a user-supplied slug. Returns the slug unchanged when it is usable.
pub fn validate_slug(slug: &str) -> Result<&str, AppError> {
    if slug.len() > MAX_CUSTOM_SLUG_LENGTH {
        return Err(AppError::Validation(format!(
            "customUrl must be at most {} characters",
            MAX_CUSTOM_SLUG_LENGTH
        )));
    }
    if !CUSTOM_SLUG.is_match(slug) {
        return Err(AppError::Validation(
            "customUrl may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    Ok(slug)
}
