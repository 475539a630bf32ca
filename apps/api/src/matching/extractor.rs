//! Entity Extractor: derives a `CandidateProfile` from résumé text.
//!
//! Nothing here fails: a field that cannot be found is left empty.
//!
//! Skills come from one of two strategies:
//! 1. A "Skills" / "Technical Skills" section, read by `SkillsSectionScanner`.
//! 2. When no such heading exists, word-like terms from the top of the document.
//!
//! The two can disagree noticeably for the same candidate depending on how the résumé is laid out.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::tokenizer::tokenize;

const NAME_MAX_CHARS: usize = 128;
/// Lines read after a skills heading before the section is considered over.
const SKILLS_WINDOW: usize = 9;
const SECTION_SKILLS_CAP: usize = 40;
const FALLBACK_LINES: usize = 40;
const FALLBACK_SKILLS_CAP: usize = 30;
const MIN_PHONE_DIGITS: usize = 9;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

// Separators are limited to spaces/tabs so a match never spans two lines.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d[\d \t().\-]{7,}\d").expect("phone pattern is valid")
});

static SKILLS_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:technical\s+)?skills\s*(?::\s*(.*))?$").expect("heading pattern is valid")
});

// A capitalized short line ending in ':' ("Experience:", "Work History:").
static SECTION_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z &/\-]{0,40}:$").expect("section pattern is valid")
});

static SKILL_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|\n•●▪◦·*]").expect("split pattern is valid"));

static WORDLIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\p{N}+#.\-]+$").expect("word pattern is valid"));

/// Structured facts pulled from a résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Lower-cased, deduplicated, in extraction order.
    pub skills: Vec<String>,
}

/// Extracts name, contact details and skills from `text`.
pub fn extract_profile(text: &str) -> CandidateProfile {
    CandidateProfile {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
        skills: extract_skills(text),
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub fn extract_name(text: &str) -> String {
    non_blank_lines(text)
        .next()
        .map(|line| line.chars().take(NAME_MAX_CHARS).collect())
        .unwrap_or_default()
}

pub fn extract_email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn extract_phone(text: &str) -> String {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
        })
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn extract_skills(text: &str) -> Vec<String> {
    match SkillsSectionScanner::scan(non_blank_lines(text)) {
        Some(section) => split_skill_fragments(&section),
        None => fallback_skills(text),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section-based strategy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingHeading,
    /// Number of lines still allowed before the window closes.
    Collecting(usize),
    Done,
}

/// Line-by-line state machine that finds a skills heading and collects the lines under it.
#[derive(Debug)]
struct SkillsSectionScanner {
    state: ScanState,
    found_heading: bool,
    collected: Vec<String>,
}

impl SkillsSectionScanner {
    fn new() -> Self {
        Self {
            state: ScanState::SeekingHeading,
            found_heading: false,
            collected: Vec::new(),
        }
    }

    /// Returns the collected section text, or `None` when no skills heading was seen.
    fn scan<'a>(lines: impl Iterator<Item = &'a str>) -> Option<String> {
        let mut scanner = Self::new();
        for line in lines {
            scanner.feed(line);
            if scanner.state == ScanState::Done {
                break;
            }
        }
        scanner
            .found_heading
            .then(|| scanner.collected.join("\n"))
    }

    fn feed(&mut self, line: &str) {
        self.state = match self.state {
            ScanState::SeekingHeading => match SKILLS_HEADING_RE.captures(line) {
                Some(caps) => {
                    self.found_heading = true;
                    if let Some(inline) = caps.get(1).map(|m| m.as_str().trim()) {
                        if !inline.is_empty() {
                            self.collected.push(inline.to_string());
                        }
                    }
                    ScanState::Collecting(SKILLS_WINDOW)
                }
                None => ScanState::SeekingHeading,
            },
            ScanState::Collecting(_) if SECTION_HEADING_RE.is_match(line) => ScanState::Done,
            ScanState::Collecting(remaining) => {
                self.collected.push(line.to_string());
                if remaining <= 1 {
                    ScanState::Done
                } else {
                    ScanState::Collecting(remaining - 1)
                }
            }
            ScanState::Done => ScanState::Done,
        };
    }
}

fn split_skill_fragments(section: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SKILL_SPLIT_RE
        .split(section)
        .map(|fragment| {
            fragment
                .trim()
                .trim_start_matches(['-', '–'])
                .trim()
                .to_lowercase()
        })
        .filter(|fragment| fragment.chars().count() >= 2)
        .filter(|fragment| seen.insert(fragment.clone()))
        .take(SECTION_SKILLS_CAP)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback strategy
// ────────────────────────────────────────────────────────────────────────────

fn fallback_skills(text: &str) -> Vec<String> {
    let head = text
        .lines()
        .take(FALLBACK_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    tokenize(&head)
        .into_iter()
        .filter(|term| WORDLIKE_RE.is_match(term))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(FALLBACK_SKILLS_CAP)
        .collect()
}
