//! Phrase matching strategies.
//!
//! Claims rarely appear verbatim in rendered HTML (collapsed whitespace,
//! decoded entities, editorial paraphrase), so matching is a cascade that
//! trades precision for recall: exact containment first, then majority word
//! overlap, then key-word overlap.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::{MAX_IGNORED_WORD_LEN, MatchConfig};

/// Runs of four or more ASCII word characters. Accented and non-Latin
/// letters split words, so "straße" yields "stra".
static KEY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b\w{4,}\b)").expect("key word pattern is valid"));

/// Matching strategies, strictest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    Exact,
    MajorityWords,
    KeyWords,
}

impl MatchStrategy {
    /// The cascade order.
    pub const CASCADE: [MatchStrategy; 3] = [
        MatchStrategy::Exact,
        MatchStrategy::MajorityWords,
        MatchStrategy::KeyWords,
    ];
}

/// Lowercase and collapse runs of whitespace to single spaces.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Whitespace-separated words longer than two chars, edge punctuation trimmed.
///
/// Expects normalized input.
pub fn significant_words(normalized: &str) -> Vec<String> {
    normalized
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > MAX_IGNORED_WORD_LEN)
        .map(str::to_owned)
        .collect()
}

/// Key words: runs of at least four ASCII word characters, in phrase order.
pub fn key_words(normalized: &str) -> Vec<String> {
    KEY_WORD_RE
        .find_iter(normalized)
        .map(|m| m.as_str().to_owned())
        .collect()
}

fn required(count: usize, ratio: f64, floor: usize) -> usize {
    floor.max((count as f64 * ratio).floor() as usize)
}

/// A phrase prepared for repeated matching against node texts.
#[derive(Clone, Debug)]
pub struct PhraseMatcher {
    normalized: String,
    words: Vec<String>,
    key_words: Vec<String>,
    config: MatchConfig,
}

impl PhraseMatcher {
    pub fn new(phrase: &str, config: &MatchConfig) -> Self {
        let normalized = normalize(phrase);
        let words = significant_words(&normalized);
        let key_words = key_words(&normalized);
        Self {
            normalized,
            words,
            key_words,
            config: config.clone(),
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn key_words(&self) -> &[String] {
        &self.key_words
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Test one normalized node text with one strategy.
    pub fn matches(&self, strategy: MatchStrategy, text: &NodeText) -> bool {
        match strategy {
            MatchStrategy::Exact => self.matches_exact(text),
            MatchStrategy::MajorityWords => self.matches_majority(text),
            MatchStrategy::KeyWords => self.matches_key_words(text),
        }
    }

    fn matches_exact(&self, text: &NodeText) -> bool {
        !self.normalized.is_empty() && text.normalized.contains(&self.normalized)
    }

    fn matches_majority(&self, text: &NodeText) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let hits = self
            .words
            .iter()
            .filter(|word| {
                text.words
                    .iter()
                    .any(|w| w.contains(word.as_str()) || word.contains(w.as_str()))
            })
            .count();
        hits >= required(
            self.words.len(),
            self.config.word_overlap_ratio,
            self.config.min_word_matches,
        )
    }

    fn matches_key_words(&self, text: &NodeText) -> bool {
        if self.key_words.is_empty() {
            return false;
        }
        let hits = self
            .key_words
            .iter()
            .filter(|k| text.normalized.contains(k.as_str()))
            .count();
        hits >= required(
            self.key_words.len(),
            self.config.key_word_ratio,
            self.config.min_key_word_matches,
        )
    }

    /// Whether any key word appears in the given (unnormalized) text.
    pub fn mentions_key_word(&self, text: &str) -> bool {
        let text = normalize(text);
        self.key_words.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Node text precomputed once per region pass.
#[derive(Clone, Debug)]
pub struct NodeText {
    pub normalized: String,
    pub words: Vec<String>,
}

impl NodeText {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let words = significant_words(&normalized);
        Self { normalized, words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(phrase: &str) -> PhraseMatcher {
        PhraseMatcher::new(phrase, &MatchConfig::default())
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Hello\n\t  World  "), "hello world");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_exact_is_case_and_whitespace_insensitive() {
        let m = matcher("Cups of   COFFEE");
        let text = NodeText::new("Drinking 5 cups\nof coffee daily");
        assert!(m.matches(MatchStrategy::Exact, &text));
    }

    #[test]
    fn test_empty_phrase_never_matches() {
        let m = matcher("   ");
        let text = NodeText::new("any text at all on the page");
        for strategy in MatchStrategy::CASCADE {
            assert!(!m.matches(strategy, &text));
        }
    }

    #[test]
    fn test_majority_threshold() {
        // words > 2 chars: the, moon, landing, was, staged, studio -> need 3.
        let m = matcher("the moon landing was staged in a studio");
        assert_eq!(m.words().len(), 6);

        let paraphrase = NodeText::new(
            "Studio staging of the 1969 lunar mission has long been a conspiracy theory",
        );
        assert!(!m.matches(MatchStrategy::MajorityWords, &paraphrase));

        let closer = NodeText::new("Some say the moon footage came from a studio set");
        assert!(m.matches(MatchStrategy::MajorityWords, &closer));
    }

    #[test]
    fn test_majority_needs_at_least_two() {
        // Three words -> floor(1.8) = 1, but the floor of two applies.
        let m = matcher("vaccines cause autism");
        let one = NodeText::new("nothing here about autism and nothing else");
        assert!(!m.matches(MatchStrategy::MajorityWords, &one));
        let two = NodeText::new("claims that vaccines lead to autism persist");
        assert!(m.matches(MatchStrategy::MajorityWords, &two));
    }

    #[test]
    fn test_key_words() {
        let m = matcher("the moon landing was staged in a studio");
        assert_eq!(m.key_words(), ["moon", "landing", "staged", "studio"]);

        // Only "studio" is present: 1 < max(1, 2).
        let paraphrase = NodeText::new(
            "Studio staging of the 1969 lunar mission has long been a conspiracy theory",
        );
        assert!(!m.matches(MatchStrategy::KeyWords, &paraphrase));

        let two = NodeText::new("A studio recreated the moon surface for the film");
        assert!(m.matches(MatchStrategy::KeyWords, &two));
    }

    #[test]
    fn test_key_words_are_ascii_only() {
        assert_eq!(key_words("naïve résumé über straße"), ["stra"]);
        assert_eq!(key_words("лунная посадка moon"), ["moon"]);
    }

    #[test]
    fn test_mentions_key_word() {
        let m = matcher("the moon landing was staged in a studio");
        assert!(m.mentions_key_word("Studio staging of the lunar mission"));
        assert!(!m.mentions_key_word("Nothing relevant"));
    }
}
