//! Mail transport: a message shape, an async `Mailer` trait and the
//! SMTP/console/memory backends. Callers treat delivery as fire-and-forget
//! with logging; no return value is consumed for control flow.

pub mod backends;
pub mod message;

pub use backends::{mailer_from_settings, ConsoleMailer, Mailer, MemoryMailer, SmtpMailer};
pub use message::EmailMessage;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Derive a plain-text body from a rendered HTML template.
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_flattens_markup() {
        let html = "<html><body>\n  <h1>Hello, alice!</h1>\n  <p>Welcome to <a href=\"/\">Newsroom</a>.</p>\n</body></html>";
        assert_eq!(strip_tags(html), "Hello, alice!\nWelcome to Newsroom.");
    }

    #[test]
    fn strip_tags_leaves_plain_text_alone() {
        assert_eq!(strip_tags("just words"), "just words");
    }
}
