//! Small string helpers shared by the extractors.

use regex::{Match, Regex};

/// Whether `m` stands alone, i.e. is not glued to an ASCII letter or digit
/// on either side. Non-ASCII neighbours (CJK text, punctuation) count as
/// separators.
fn is_standalone(haystack: &str, m: &Match<'_>) -> bool {
    let bytes = haystack.as_bytes();
    let before = m.start().checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(m.end()).copied();
    !before.is_some_and(|b| b.is_ascii_alphanumeric())
        && !after.is_some_and(|b| b.is_ascii_alphanumeric())
}

/// Iterate the standalone matches of `re` in `haystack`, in order.
pub(crate) fn standalone_matches<'h>(
    re: &'h Regex,
    haystack: &'h str,
) -> impl Iterator<Item = Match<'h>> + 'h {
    re.find_iter(haystack)
        .filter(move |m| is_standalone(haystack, m))
}

/// Cut `s` to at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
