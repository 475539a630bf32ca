//! Tokenizer: turns raw text into normalized, stop-word-free terms.
//!
//! Terms keep the punctuation that technical names rely on (`c++`, `c#`, `node.js`, `.net`).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}+#.\-]+").expect("term pattern is valid"));

const STOP_WORDS: &[&str] = &[
    // articles / determiners
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "all",
    // conjunctions / prepositions
    "and", "or", "but", "nor", "so", "yet", "if", "then", "than", "as", "of", "in", "on", "at",
    "to", "for", "with", "by", "from", "into", "onto", "over", "under", "about", "via", "per",
    // pronouns
    "i", "me", "my", "mine", "we", "us", "our", "ours", "you", "your", "yours", "he", "him",
    "his", "she", "her", "hers", "it", "its", "they", "them", "their", "theirs", "who", "whom",
    "which", "what",
    // auxiliaries and generic verbs
    "is", "are", "was", "were", "be", "been", "being", "am", "do", "does", "did", "done", "have",
    "has", "had", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
    "use", "used", "uses", "using", "also", "etc", "not", "no",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Splits `text` into lower-cased terms in order of occurrence.
///
/// Runs without a single letter (numbers like `5` or `2024`, stray `--`) and stop-words are dropped.
/// Sentence punctuation trailing a run is trimmed so `required.` and `required` are one term.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TERM_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().trim_end_matches(['.', '-']))
        .filter(|term| term.chars().any(char::is_alphabetic))
        .filter(|term| !STOP_SET.contains(*term))
        .map(str::to_string)
        .collect()
}
