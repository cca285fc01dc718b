//! Log Redaction Layer
//!
//! Scrubs CPF numbers, phone numbers, e-mail addresses and bearer tokens from
//! user text prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static CPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").unwrap());
static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{2}\s?)?\(?\d{2}\)?[-.\s]?9?\d{4}[-.\s]?\d{4}\b").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = CPF_RE.replace_all(input, "[REDACTED_CPF]").to_string();
    redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string();
    redacted = EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]").to_string();
    redacted = TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();
    redacted
}
