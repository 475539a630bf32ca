//! Scorer: pluggable, trait-based scorer that measures one résumé against one job description.
//!
//! Default: `DeterministicScorer` (pure-Rust, deterministic, fully testable).
//! Optional: `LlmMatchScorer` (semantic via Claude), which falls back to the deterministic
//! result on any failure.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen at startup via config.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::education::has_education_signal;
use crate::matching::experience::estimate_years;
use crate::matching::prompts::{build_match_prompt, match_score_system};
use crate::matching::similarity::{jaccard, to_set};
use crate::matching::tokenizer::tokenize;

pub const SKILLS_WEIGHT: f64 = 0.45;
pub const EXPERIENCE_WEIGHT: f64 = 0.40;
pub const EDUCATION_WEIGHT: f64 = 0.15;

const LIST_CAP: usize = 20;

static SKILL_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}{2}").expect("skill-like pattern is valid"));

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Scored comparison of one résumé with one job description.
///
/// Flat by construction: only strings, floats, integers and string lists, so it maps onto a table
/// row or a JSON body without reshaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub skills_score: f64,     // 0 – 10
    pub experience_score: f64, // 0 – 10
    pub education_score: f64,  // 0 – 10
    pub overall_score: f64,    // weighted, 0 – 10
    pub match_percentage: u32, // 0 – 100
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub justification: String,
    pub recommendation: String,
    pub scorer_backend: String, // "deterministic" | "llm"
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the ranker or handlers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
        resume_skills: &[String],
    ) -> Result<MatchResult, AppError>;

    fn backend(&self) -> &'static str;
}

/// Token-overlap scorer. No I/O, same input always gives the same result.
pub struct DeterministicScorer;

#[async_trait]
impl MatchScorer for DeterministicScorer {
    async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
        resume_skills: &[String],
    ) -> Result<MatchResult, AppError> {
        Ok(score_match(job_description, resume_text, resume_skills))
    }

    fn backend(&self) -> &'static str {
        "deterministic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core deterministic algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Scores `resume_text` (and the skills already extracted from it) against `job_description`.
///
/// Algorithm:
/// 1. Tokenize both texts into sets; JD terms with two consecutive letters are skill candidates
/// 2. skills = 10 × jaccard(résumé skills, JD skill candidates)
/// 3. experience = 10 × min(résumé years / required years, 1), or 10 × jaccard(RES, JD) when the
///    JD states no requirement
/// 4. education from the requirement/presence table (9 / 5 / 7)
/// 5. overall = 0.45 × skills + 0.40 × experience + 0.15 × education
pub fn score_match(job_description: &str, resume_text: &str, resume_skills: &[String]) -> MatchResult {
    let jd_terms = to_set(tokenize(job_description));
    let resume_terms = to_set(tokenize(resume_text));

    let jd_skill_candidates: HashSet<String> = jd_terms
        .iter()
        .filter(|term| SKILL_LIKE_RE.is_match(term))
        .cloned()
        .collect();
    let resume_skill_set = to_set(resume_skills.iter().map(|s| s.to_lowercase()));

    let skills_score = round2(10.0 * jaccard(&resume_skill_set, &jd_skill_candidates));

    let jd_years = estimate_years(job_description);
    let resume_years = estimate_years(resume_text);
    let experience_score = if jd_years > 0.0 {
        round2(10.0 * (resume_years / jd_years).min(1.0))
    } else {
        round2(10.0 * jaccard(&resume_terms, &jd_terms))
    };

    let (jd_has_edu, resume_has_edu) = has_education_signal(job_description, resume_text);
    let education_score = education_score(jd_has_edu, resume_has_edu);

    let overall = overall_score(skills_score, experience_score, education_score);
    let percentage = match_percentage(overall);

    let strengths: Vec<String> = resume_skill_set
        .intersection(&jd_skill_candidates)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(LIST_CAP)
        .collect();
    let matched_count = resume_skill_set.intersection(&jd_skill_candidates).count();
    let gaps: Vec<String> = jd_skill_candidates
        .difference(&resume_skill_set)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(LIST_CAP)
        .collect();

    let justification = build_justification(
        matched_count,
        jd_skill_candidates.len(),
        resume_years,
        jd_years,
        jd_has_edu,
        resume_has_edu,
    );

    MatchResult {
        skills_score,
        experience_score,
        education_score,
        overall_score: overall,
        match_percentage: percentage,
        strengths,
        gaps,
        justification,
        recommendation: recommendation_for(percentage).to_string(),
        scorer_backend: "deterministic".to_string(),
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted overall score: 0.45*skills + 0.40*experience + 0.15*education, rounded to 2dp.
pub fn overall_score(skills: f64, experience: f64, education: f64) -> f64 {
    round2(SKILLS_WEIGHT * skills + EXPERIENCE_WEIGHT * experience + EDUCATION_WEIGHT * education)
}

/// Overall score rescaled to 0–100. Clamped so float overshoot at 10.0 cannot produce 101.
pub fn match_percentage(overall: f64) -> u32 {
    (overall * 10.0).round().clamp(0.0, 100.0) as u32
}

/// A stated requirement that is met scores 9, one that is missed 5, and no requirement 7.
pub fn education_score(jd_has_edu: bool, resume_has_edu: bool) -> f64 {
    match (jd_has_edu, resume_has_edu) {
        (true, true) => 9.0,
        (true, false) => 5.0,
        (false, _) => 7.0,
    }
}

const RECOMMENDATIONS: [&str; 4] = ["Highly Recommended", "Recommended", "Maybe", "Not Recommended"];

pub fn recommendation_for(match_percentage: u32) -> &'static str {
    if match_percentage >= 80 {
        "Highly Recommended"
    } else if match_percentage >= 65 {
        "Recommended"
    } else if match_percentage >= 50 {
        "Maybe"
    } else {
        "Not Recommended"
    }
}

fn build_justification(
    matched: usize,
    total: usize,
    resume_years: f64,
    jd_years: f64,
    jd_has_edu: bool,
    resume_has_edu: bool,
) -> String {
    let required = if jd_years > 0.0 {
        format!("{jd_years:.1}")
    } else {
        "n/a".to_string()
    };
    format!(
        "Matched {matched} of {total} job skill terms; candidate shows {resume_years:.1} years of \
         experience vs {required} required; education required: {jd_has_edu}, education found: \
         {resume_has_edu}."
    )
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer: semantic scorer with deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// Raw report requested from the model. The three dimension scores are required; a reply
/// without them fails to parse and the caller falls back to the deterministic scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmMatchReport {
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub recommendation: String,
}

impl LlmMatchReport {
    /// Normalises the model's numbers into a `MatchResult` that honours the same invariants as
    /// the deterministic path: dimensions clamped to [0, 10], overall and percentage recomputed.
    pub fn into_match_result(self) -> MatchResult {
        let clamp = |v: f64| if v.is_finite() { round2(v.clamp(0.0, 10.0)) } else { 0.0 };
        let skills_score = clamp(self.skills_score);
        let experience_score = clamp(self.experience_score);
        let education_score = clamp(self.education_score);
        let overall = overall_score(skills_score, experience_score, education_score);
        let percentage = match_percentage(overall);
        let recommendation = canonical_recommendation(&self.recommendation)
            .unwrap_or_else(|| recommendation_for(percentage))
            .to_string();

        MatchResult {
            skills_score,
            experience_score,
            education_score,
            overall_score: overall,
            match_percentage: percentage,
            strengths: self.strengths.into_iter().take(LIST_CAP).collect(),
            gaps: self.gaps.into_iter().take(LIST_CAP).collect(),
            justification: self.justification,
            recommendation,
            scorer_backend: "llm".to_string(),
        }
    }
}

/// Maps a model-supplied label onto one of the four recommendation bands, ignoring case.
fn canonical_recommendation(label: &str) -> Option<&'static str> {
    let label = label.trim();
    RECOMMENDATIONS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(label))
}

/// Semantic scorer via Claude. Never fails: any LLM error yields the deterministic result.
pub struct LlmMatchScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
        resume_skills: &[String],
    ) -> Result<MatchResult, AppError> {
        let prompt = build_match_prompt(job_description, resume_text);
        let report = self
            .0
            .call_json::<LlmMatchReport>(&prompt, &match_score_system())
            .await;
        Ok(resolve_llm_report(
            report,
            job_description,
            resume_text,
            resume_skills,
        ))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn resolve_llm_report(
    report: Result<LlmMatchReport, LlmError>,
    job_description: &str,
    resume_text: &str,
    resume_skills: &[String],
) -> MatchResult {
    match report {
        Ok(report) => report.into_match_result(),
        Err(e) => {
            warn!("LLM scoring failed, falling back to deterministic scorer: {e}");
            score_match(job_description, resume_text, resume_skills)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Requires 5+ years Python and AWS experience, Bachelor's degree required.";
    const RESUME: &str = "3 years Python developer, AWS certified, no degree mentioned";

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_end_to_end_experience_and_education() {
        let result = score_match(JD, RESUME, &skills(&["Python", "AWS"]));
        assert_eq!(result.experience_score, 6.0);
        assert_eq!(result.education_score, 5.0);
    }

    #[test]
    fn test_end_to_end_skills_and_lists() {
        let result = score_match(JD, RESUME, &skills(&["Python", "AWS"]));
        // JD skill candidates: requires, years, python, aws, experience, bachelor, degree, required
        assert_eq!(result.skills_score, 2.5);
        assert_eq!(result.strengths, vec!["aws", "python"]);
        assert!(result.gaps.contains(&"bachelor".to_string()));
        assert!(!result.gaps.contains(&"python".to_string()));
        let mut sorted = result.gaps.clone();
        sorted.sort();
        assert_eq!(result.gaps, sorted);
    }

    #[test]
    fn test_overall_and_percentage_invariants_hold() {
        let result = score_match(JD, RESUME, &skills(&["Python", "AWS"]));
        assert_eq!(
            result.overall_score,
            overall_score(
                result.skills_score,
                result.experience_score,
                result.education_score
            )
        );
        assert_eq!(result.match_percentage, match_percentage(result.overall_score));
    }

    #[test]
    fn test_overall_formula_example() {
        let overall = overall_score(8.0, 6.0, 9.0);
        assert!((overall - 7.35).abs() < 1e-9, "overall was {overall}");
        assert_eq!(match_percentage(overall), 74);
    }

    #[test]
    fn test_percentage_capped_at_100() {
        assert_eq!(match_percentage(10.0), 100);
        assert_eq!(match_percentage(10.04), 100);
        assert_eq!(match_percentage(0.0), 0);
    }

    #[test]
    fn test_education_table() {
        assert_eq!(education_score(true, true), 9.0);
        assert_eq!(education_score(true, false), 5.0);
        assert_eq!(education_score(false, true), 7.0);
        assert_eq!(education_score(false, false), 7.0);
    }

    #[test]
    fn test_experience_ratio_capped_at_ten() {
        let result = score_match("2 years Go", "9 years Go", &[]);
        assert_eq!(result.experience_score, 10.0);
    }

    #[test]
    fn test_no_required_years_uses_text_overlap() {
        // JD {rust, tokio} vs résumé {rust, axum}: 1 shared of 3
        let result = score_match("Rust tokio", "Rust axum", &[]);
        assert_eq!(result.experience_score, round2(10.0 / 3.0));
    }

    #[test]
    fn test_empty_resume_scores_neutral_education_only() {
        let result = score_match("Rust engineer", "", &[]);
        assert_eq!(result.skills_score, 0.0);
        assert_eq!(result.experience_score, 0.0);
        assert_eq!(result.education_score, 7.0);
        assert_eq!(result.overall_score, 1.05);
        assert_eq!(result.match_percentage, 11);
        assert!(result.strengths.is_empty());
    }

    #[test]
    fn test_justification_reports_na_without_requirement() {
        let result = score_match("Rust engineer", "Rust", &skills(&["rust"]));
        assert!(result.justification.contains("n/a required"));
        assert!(result.justification.contains("Matched 1 of 2"));
    }

    #[test]
    fn test_justification_reports_required_years() {
        let result = score_match(JD, RESUME, &[]);
        assert!(result.justification.contains("3.0 years"));
        assert!(result.justification.contains("vs 5.0 required"));
        assert!(result.justification.contains("education required: true"));
        assert!(result.justification.contains("education found: false"));
    }

    #[test]
    fn test_lists_are_capped() {
        let jd: Vec<String> = (0..30).map(|i| format!("tool{i:02}")).collect();
        let result = score_match(&jd.join(" "), "", &[]);
        assert_eq!(result.gaps.len(), LIST_CAP);
        assert_eq!(result.gaps[0], "tool00");
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let first = score_match(JD, RESUME, &skills(&["python"]));
        let second = score_match(JD, RESUME, &skills(&["python"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(recommendation_for(100), "Highly Recommended");
        assert_eq!(recommendation_for(80), "Highly Recommended");
        assert_eq!(recommendation_for(70), "Recommended");
        assert_eq!(recommendation_for(50), "Maybe");
        assert_eq!(recommendation_for(12), "Not Recommended");
    }

    #[tokio::test]
    async fn test_deterministic_scorer_matches_pure_function() {
        let scorer = DeterministicScorer;
        let via_trait = scorer.score(JD, RESUME, &[]).await.unwrap();
        assert_eq!(via_trait, score_match(JD, RESUME, &[]));
        assert_eq!(scorer.backend(), "deterministic");
    }

    #[test]
    fn test_llm_report_is_clamped_and_recomputed() {
        let report = LlmMatchReport {
            skills_score: 14.0,
            experience_score: -2.0,
            education_score: 7.5,
            strengths: (0..25).map(|i| format!("s{i}")).collect(),
            gaps: vec![],
            justification: "ok".to_string(),
            recommendation: String::new(),
        };
        let result = report.into_match_result();
        assert_eq!(result.skills_score, 10.0);
        assert_eq!(result.experience_score, 0.0);
        assert_eq!(result.overall_score, overall_score(10.0, 0.0, 7.5));
        assert_eq!(result.strengths.len(), LIST_CAP);
        assert_eq!(result.scorer_backend, "llm");
        assert_eq!(result.recommendation, recommendation_for(result.match_percentage));
    }

    #[test]
    fn test_llm_report_deserializes_with_missing_lists() {
        let report: LlmMatchReport = serde_json::from_str(
            r#"{"skills_score": 8.0, "experience_score": 6.0, "education_score": 5.0,
                "recommendation": "maybe"}"#,
        )
        .unwrap();
        assert_eq!(report.skills_score, 8.0);
        assert!(report.strengths.is_empty());
        assert_eq!(report.into_match_result().recommendation, "Maybe");
    }

    #[test]
    fn test_llm_reply_without_scores_falls_back() {
        for reply in ["{}", r#"{"skills_score": 9.0, "recommendation": "Recommended"}"#] {
            let report = serde_json::from_str::<LlmMatchReport>(reply).map_err(LlmError::from);
            assert!(report.is_err(), "{reply} should not parse");
            let result = resolve_llm_report(report, JD, RESUME, &[]);
            assert_eq!(result.scorer_backend, "deterministic");
            assert_eq!(result, score_match(JD, RESUME, &[]));
        }
    }

    #[test]
    fn test_llm_unknown_recommendation_uses_band() {
        let report = LlmMatchReport {
            skills_score: 1.0,
            experience_score: 1.0,
            education_score: 1.0,
            strengths: vec![],
            gaps: vec![],
            justification: String::new(),
            recommendation: "Strongly Hire!".to_string(),
        };
        let result = report.into_match_result();
        assert_eq!(result.match_percentage, 10);
        assert_eq!(result.recommendation, "Not Recommended");
    }

    #[test]
    fn test_llm_failure_falls_back_to_deterministic() {
        let result = resolve_llm_report(Err(LlmError::EmptyContent), JD, RESUME, &[]);
        assert_eq!(result, score_match(JD, RESUME, &[]));
        assert_eq!(result.scorer_backend, "deterministic");
    }
}
