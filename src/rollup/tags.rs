//! Bucket tag extraction from card titles.

use std::collections::BTreeSet;

use regex::Regex;

/// Matches one `[tag]` marker. No nesting; an unterminated `[` never matches.
const TAG_PATTERN: &str = r"\[[^\]]+\]";

/// Extracts bucket tags from card titles.
///
/// The pattern is compiled once in [`TagExtractor::new`] and never mutated,
/// so a single extractor can be shared by reference for a whole pass.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    pattern: Regex,
}

impl TagExtractor {
    /// Creates an extractor with the compiled tag pattern.
    #[must_use]
    pub fn new() -> Self {
        Self { pattern: Regex::new(TAG_PATTERN).expect("valid tag regex") }
    }

    /// Returns the distinct lower-cased tags found in `title`, without their
    /// brackets. Titles without tags yield an empty set.
    #[must_use]
    pub fn extract(&self, title: &str) -> BTreeSet<String> {
        self.pattern
            .find_iter(title)
            .map(|m| {
                let tag = m.as_str();
                tag[1..tag.len() - 1].to_lowercase()
            })
            .collect()
    }
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(title: &str) -> Vec<String> {
        TagExtractor::new().extract(title).into_iter().collect()
    }

    #[test]
    fn single_tag() {
        assert_eq!(tags("[foo] Task"), vec!["foo"]);
    }

    #[test]
    fn adjacent_tags_are_lowercased() {
        assert_eq!(tags("[Foo][bar] Task"), vec!["bar", "foo"]);
    }

    #[test]
    fn untagged_title_yields_nothing() {
        assert!(tags("Task").is_empty());
    }

    #[test]
    fn unterminated_bracket_yields_nothing() {
        assert!(tags("[unterminated Task").is_empty());
    }

    #[test]
    fn empty_brackets_are_not_a_tag() {
        assert!(tags("[] Task").is_empty());
    }

    #[test]
    fn repeated_tag_collapses() {
        assert_eq!(tags("[ops] fix [OPS] dashboards"), vec!["ops"]);
    }

    #[test]
    fn tag_may_appear_anywhere_and_keep_spaces() {
        assert_eq!(tags("Rotate keys [Site Reliability]"), vec!["site reliability"]);
    }
}
