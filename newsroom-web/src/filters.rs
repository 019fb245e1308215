//! Custom askama filters.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Words masked out of rendered content.
pub const CENSORED_WORDS: &[&str] = &["damn", "hell", "idiot"];

static CENSOR_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b({})\b", CENSORED_WORDS.join("|"));
    Regex::new(&pattern).expect("valid censor regex")
});

/// Replace each listed word with asterisks of the same length,
/// case-insensitively and on word boundaries only.
pub fn censor<T: std::fmt::Display>(value: T) -> askama::Result<String> {
    let text = value.to_string();
    Ok(CENSOR_RE
        .replace_all(&text, |caps: &Captures| "*".repeat(caps[0].len()))
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_words_are_masked_preserving_length() {
        let out = censor("what the hell happened").unwrap();
        assert_eq!(out, "what the **** happened");
    }

    #[test]
    fn masking_is_case_insensitive() {
        let out = censor("DAMN and Damn").unwrap();
        assert_eq!(out, "**** and ****");
    }

    #[test]
    fn substrings_inside_words_survive() {
        let out = censor("hello shellfish").unwrap();
        assert_eq!(out, "hello shellfish");
    }
}
