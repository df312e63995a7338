use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_NAME_LENGTH: usize = 100;

static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{L}[\p{L} '.-]*$").expect("valid name regex"));

/// Validates a person or company name.
///
/// The trimmed value must start with a letter and contain only letters,
/// spaces, apostrophes, hyphens and periods.
pub fn validate_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.chars().count() <= MAX_NAME_LENGTH && NAME_REGEX.is_match(name)
}
