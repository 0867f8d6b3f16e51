//! Span redaction.
//!
//! Replaces matched spans with category-tagged markers. Matches are
//! applied in descending start-offset order so that replacements never
//! invalidate the offsets of matches still waiting to be applied.

use super::detector::SensitiveMatch;

/// Redact the matched spans out of the payload.
///
/// Each span is replaced with `[REDACTED_<CATEGORY>]`. With an empty match
/// set the payload is returned unchanged. Span ends are clamped to the
/// current string length so overlapping matches from different rules
/// degrade the same way slicing does, rather than panicking.
#[must_use]
pub fn redact(payload: &str, matches: &[SensitiveMatch]) -> String {
    if matches.is_empty() {
        return payload.to_string();
    }

    let mut ordered: Vec<&SensitiveMatch> = matches.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = payload.to_string();
    for m in ordered {
        let mut end = m.end.min(result.len());
        while !result.is_char_boundary(end) {
            end -= 1;
        }
        let mut start = m.start.min(end);
        while !result.is_char_boundary(start) {
            start -= 1;
        }

        result = format!("{}{}{}", &result[..start], m.category.marker(), &result[end..]);
    }

    result
}
