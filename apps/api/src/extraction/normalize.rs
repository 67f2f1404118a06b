//! Date and number normalization for values read back from the model.
//!
//! Both functions are pattern rewrites, not validators: a date such as
//! `2025-13-45` is left alone, and an unrecognized date string passes through.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
    pub(crate) static ref CJK_DATE: Regex =
        Regex::new(r"([0-9]{4})年([0-9]{1,2})月([0-9]{1,2})日?").unwrap();
    static ref SLASH_DATE: Regex = Regex::new(r"([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Rewrites a loosely formatted date as `YYYY-MM-DD`.
///
/// Recognized, in order: already-canonical `YYYY-MM-DD`, `YYYY年M月D日`
/// (trailing 日 optional) and `YYYY/M/D`. Anything else is returned unchanged.
pub fn normalize_date(input: &str) -> String {
    if input.is_empty() || ISO_DATE.is_match(input) {
        return input.to_string();
    }

    for pattern in [&*CJK_DATE, &*SLASH_DATE] {
        if let Some(caps) = pattern.captures(input) {
            return format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]);
        }
    }

    input.to_string()
}

/// Returns the first run of ASCII digits, or an empty string if there is none.
pub fn normalize_number(input: &str) -> String {
    DIGIT_RUN
        .find(input)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
