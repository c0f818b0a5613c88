//! `{key}` placeholder scanning and substitution.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::template::variables::Assignment;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex")
});

static KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid key regex"));

/// Returns true if `key` can appear inside a `{...}` placeholder.
pub fn is_valid_key(key: &str) -> bool {
    KEY.is_match(key)
}

/// Collects every placeholder key referenced in `text`.
pub fn referenced_keys(text: &str) -> BTreeSet<&str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replaces every `{key}` whose key is in `assignment`.
///
/// The text is scanned once, so substituted values are never rescanned and
/// the order of keys does not matter. Placeholders without an assigned value
/// are left as they are.
pub fn substitute<'a>(text: &'a str, assignment: &Assignment) -> Cow<'a, str> {
    if assignment.is_empty() {
        return Cow::Borrowed(text);
    }
    PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| match assignment.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
}
