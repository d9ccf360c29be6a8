//! Size classification from the registry's employee-range descriptor.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::SizeCategory;

/// Phrases checked in order; the first one found wins.
///
/// Spanish phrasings are what the registry ships; English ones cover
/// translated exports.
const SIZE_PHRASES: &[(&str, SizeCategory)] = &[
    ("0 a 5", SizeCategory::Micro),
    ("1 a 5", SizeCategory::Micro),
    ("0 to 5", SizeCategory::Micro),
    ("1 to 5", SizeCategory::Micro),
    ("6 a 10", SizeCategory::Micro),
    ("6 to 10", SizeCategory::Micro),
    ("11 a 30", SizeCategory::Small),
    ("11 to 30", SizeCategory::Small),
    ("31 a 50", SizeCategory::Small),
    ("31 to 50", SizeCategory::Small),
    ("51 a 100", SizeCategory::Medium),
    ("51 to 100", SizeCategory::Medium),
    ("101 a 250", SizeCategory::Medium),
    ("101 to 250", SizeCategory::Medium),
    ("251", SizeCategory::Large),
    ("más", SizeCategory::Large),
    ("mas", SizeCategory::Large),
    ("more", SizeCategory::Large),
];

/// One case-insensitive, whole-word pattern per phrase, in table order.
static SIZE_PATTERNS: LazyLock<Vec<(Regex, SizeCategory)>> = LazyLock::new(|| {
    SIZE_PHRASES
        .iter()
        .map(|(phrase, category)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
            let regex = Regex::new(&pattern).expect("size phrase patterns are literal");
            (regex, *category)
        })
        .collect()
});

/// Classify a raw descriptor such as `"11 a 30 personas"`.
///
/// Matching is case-insensitive. Numbers only match whole numbers, so
/// `"31 a 50"` is not read as `"1 a 5"`.
pub fn classify_size_descriptor(descriptor: Option<&str>) -> SizeCategory {
    let text = match descriptor.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return SizeCategory::Unknown,
    };

    SIZE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, category)| *category)
        .unwrap_or(SizeCategory::Other)
}

/// Upper bound of the employee range: the largest all-digit token.
pub fn employee_upper_bound(descriptor: Option<&str>) -> Option<u32> {
    descriptor?
        .split_whitespace()
        .filter(|token| token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<u32>().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ranges() {
        let cases = [
            ("0 a 5 personas", SizeCategory::Micro),
            ("6 a 10 personas", SizeCategory::Micro),
            ("11 a 30 personas", SizeCategory::Small),
            ("31 a 50 personas", SizeCategory::Small),
            ("51 a 100 personas", SizeCategory::Medium),
            ("101 a 250 personas", SizeCategory::Medium),
            ("251 y más personas", SizeCategory::Large),
        ];
        for (descriptor, expected) in cases {
            assert_eq!(
                classify_size_descriptor(Some(descriptor)),
                expected,
                "{}",
                descriptor
            );
        }
    }

    #[test]
    fn test_case_insensitive_and_english() {
        assert_eq!(
            classify_size_descriptor(Some("251 Y MÁS PERSONAS")),
            SizeCategory::Large
        );
        assert_eq!(
            classify_size_descriptor(Some("1 to 5 employees")),
            SizeCategory::Micro
        );
        assert_eq!(
            classify_size_descriptor(Some("500 or more")),
            SizeCategory::Large
        );
    }

    #[test]
    fn test_numbers_match_whole() {
        // "1 a 5" appears inside "31 a 50" but is not a whole-number match
        assert_eq!(
            classify_size_descriptor(Some("31 a 50 personas")),
            SizeCategory::Small
        );
        assert_eq!(
            classify_size_descriptor(Some("de 101 a 250")),
            SizeCategory::Medium
        );
        // "mas" only as a word
        assert_eq!(
            classify_size_descriptor(Some("Tomasa")),
            SizeCategory::Other
        );
    }

    #[test]
    fn test_every_phrase_compiles() {
        assert_eq!(SIZE_PATTERNS.len(), SIZE_PHRASES.len());
    }

    #[test]
    fn test_missing_and_unrecognized() {
        assert_eq!(classify_size_descriptor(None), SizeCategory::Unknown);
        assert_eq!(classify_size_descriptor(Some("   ")), SizeCategory::Unknown);
        assert_eq!(
            classify_size_descriptor(Some("no especificado")),
            SizeCategory::Other
        );
    }

    #[test]
    fn test_employee_upper_bound() {
        assert_eq!(employee_upper_bound(Some("0 a 5 personas")), Some(5));
        assert_eq!(employee_upper_bound(Some("251 y más personas")), Some(251));
        assert_eq!(employee_upper_bound(Some("sin dato")), None);
        assert_eq!(employee_upper_bound(None), None);
    }
}
