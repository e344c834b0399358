//! Pure string heuristics over apply URLs.
//!
//! Nothing here parses URLs properly; exporters hand us whatever the job
//! boards printed, so the rules work on raw text.

use jobfeed_entity::company::MAX_CAREER_URL_LEN;
use jobfeed_entity::job::MAX_APPLY_URL_LEN;

use crate::text::truncate_chars;

/// Query parameter that marks the start of tracking noise.
const TRACKING_PARAM: &str = "utm_source=";

/// Path segments that usually sit right under an employer's career page.
const LISTING_SEGMENTS: [&str; 3] = ["/job/", "/jobs/", "/career/"];

/// Domain endings used when no listing segment is present.
const DOMAIN_ENDINGS: [&str; 2] = [".com/", ".net/"];

/// Remove the tracking parameter boundary from `url`.
///
/// `utm_source=` only counts as a parameter name, right after `?` or `&`.
/// After `&` the URL is cut at that separator. As the first parameter,
/// only its own pair is removed so the remaining query survives.
pub fn strip_tracking(url: &str) -> String {
    let Some(start) = find_param(url, TRACKING_PARAM) else {
        return url.to_string();
    };
    let separator = start - 1;

    if url.as_bytes()[separator] == b'&' {
        return url[..separator].to_string();
    }

    // First parameter: drop `utm_source=...` and its trailing `&`.
    let rest = &url[start..];
    match rest.find('&') {
        Some(amp) => format!("{}{}", &url[..=separator], &rest[amp + 1..]),
        None => url[..separator].to_string(),
    }
}

/// Strip tracking noise, then cut to the stored apply URL limit.
pub fn clean_apply_url(url: &str) -> String {
    let stripped = strip_tracking(url.trim());
    truncate_chars(&stripped, MAX_APPLY_URL_LEN).to_string()
}

/// Derive an employer's career page from one of its apply URLs.
///
/// The earliest listing segment wins (`https://acme.com/jobs/eng` gives
/// `https://acme.com/jobs`). Without one, the URL is cut after the first
/// `.com` or `.net`. Otherwise the URL is used as is. An empty URL yields
/// nothing.
pub fn derive_career_url(apply_url: &str) -> Option<String> {
    let url = apply_url.trim();
    if url.is_empty() {
        return None;
    }

    let derived = if let Some((idx, segment)) = earliest(url, &LISTING_SEGMENTS) {
        &url[..idx + segment.len() - 1]
    } else if let Some((idx, ending)) = earliest(url, &DOMAIN_ENDINGS) {
        &url[..idx + ending.len() - 1]
    } else {
        url
    };

    Some(truncate_chars(derived, MAX_CAREER_URL_LEN).to_string())
}

/// Byte offset of `name` where it starts a query parameter.
fn find_param(url: &str, name: &str) -> Option<usize> {
    url.match_indices(name)
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && matches!(url.as_bytes()[idx - 1], b'?' | b'&'))
}

/// Earliest occurrence of any needle, ties broken by list order.
fn earliest<'n>(haystack: &str, needles: &[&'n str]) -> Option<(usize, &'n str)> {
    needles
        .iter()
        .filter_map(|needle| haystack.find(needle).map(|idx| (idx, *needle)))
        .min_by_key(|(idx, _)| *idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_after_ampersand_drops_the_tail() {
        assert_eq!(
            strip_tracking("https://x.io/apply?x=1&utm_source=indeed&foo=bar"),
            "https://x.io/apply?x=1"
        );
    }

    #[test]
    fn test_strip_first_param_keeps_the_rest() {
        assert_eq!(
            strip_tracking("https://acme.com/jobs/eng?utm_source=indeed&x=1"),
            "https://acme.com/jobs/eng?x=1"
        );
        assert_eq!(
            strip_tracking("https://acme.com/jobs/eng?utm_source=indeed"),
            "https://acme.com/jobs/eng"
        );
    }

    #[test]
    fn test_strip_ignores_embedded_name() {
        let url = "https://acme.com/apply?my_utm_source=1";
        assert_eq!(strip_tracking(url), url);
        assert_eq!(strip_tracking("https://acme.com/a"), "https://acme.com/a");
    }

    #[test]
    fn test_clean_truncates_to_exact_limit() {
        let long = format!("https://acme.com/{}", "a".repeat(2000));
        let cleaned = clean_apply_url(&long);
        assert_eq!(cleaned.chars().count(), MAX_APPLY_URL_LEN);
        assert_eq!(cleaned, clean_apply_url(&long));
    }

    #[test]
    fn test_career_url_earliest_segment_wins() {
        assert_eq!(
            derive_career_url("https://acme.com/jobs/eng").as_deref(),
            Some("https://acme.com/jobs")
        );
        assert_eq!(
            derive_career_url("https://acme.com/career/x/jobs/y").as_deref(),
            Some("https://acme.com/career")
        );
        assert_eq!(
            derive_career_url("https://acme.com/job/42").as_deref(),
            Some("https://acme.com/job")
        );
    }

    #[test]
    fn test_career_url_falls_back_to_domain() {
        assert_eq!(
            derive_career_url("https://apply.globex.net/openings/7").as_deref(),
            Some("https://apply.globex.net")
        );
        assert_eq!(
            derive_career_url("https://initech.io/apply").as_deref(),
            Some("https://initech.io/apply")
        );
        assert_eq!(derive_career_url("  "), None);
    }

    #[test]
    fn test_career_url_is_capped() {
        let long = format!("https://initech.io/{}", "b".repeat(900));
        let derived = derive_career_url(&long).unwrap();
        assert_eq!(derived.chars().count(), MAX_CAREER_URL_LEN);
    }
}
