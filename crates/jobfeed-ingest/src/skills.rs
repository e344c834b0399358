//! Skill keyword extraction from requirements text.

use std::sync::LazyLock;

use regex::Regex;

/// The closed skill vocabulary.
pub const SKILL_VOCABULARY: [&str; 12] = [
    "JavaScript",
    "Java",
    "Python",
    "React",
    "Vue",
    "Angular",
    "Node.js",
    "SQL",
    "MongoDB",
    "AWS",
    "Docker",
    "Kubernetes",
];

/// Separator between extracted skills.
pub const SKILL_SEPARATOR: &str = ", ";

static SKILL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Longer spellings first so "JavaScript" is not read as "Java".
    let mut words: Vec<&str> = SKILL_VOCABULARY.to_vec();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("skill regex is valid")
});

/// Every vocabulary occurrence in `requirements`, in order of appearance.
///
/// Matching is a case-insensitive substring scan: `ReactJS` yields `React`
/// and `PostgreSQL` yields `SQL`. Hits keep the spelling used in the text.
/// Repeats are kept.
pub fn extract(requirements: &str) -> Vec<&str> {
    SKILL_PATTERN
        .find_iter(requirements)
        .map(|m| m.as_str())
        .collect()
}

/// Extracted skills rendered as the stored comma-separated value.
pub fn extract_joined(requirements: Option<&str>) -> String {
    requirements
        .map(|text| extract(text).join(SKILL_SEPARATOR))
        .unwrap_or_default()
}
