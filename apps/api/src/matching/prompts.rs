// LLM prompt constants for the optional language-model scorer.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Role line prepended to the shared JSON-only instruction.
pub const MATCH_SCORE_ROLE: &str = "You are an experienced recruiter and talent evaluator.";

pub fn match_score_system() -> String {
    format!("{MATCH_SCORE_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Match scoring prompt. Replace `{resume_text}` and `{job_description}` before sending.
pub const MATCH_SCORE_PROMPT_TEMPLATE: &str = r#"Review the candidate resume against the job description and assess compatibility.

CANDIDATE RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills_score": 8.5,
  "experience_score": 8.0,
  "education_score": 7.5,
  "strengths": ["Strong Python and ML background", "Hands-on cloud experience"],
  "gaps": ["Missing Kubernetes experience"],
  "justification": "One or two sentences explaining the scores.",
  "recommendation": "Highly Recommended" | "Recommended" | "Maybe" | "Not Recommended"
}

RULES:
1. Every score is a float between 0.0 and 10.0.
2. Judge contextual fit, not only keyword overlap.
3. If information is missing, score it conservatively and say so in gaps.
4. Return ONLY the JSON object. Nothing else, no code fences."#;

/// Fills both placeholders in one left-to-right pass, so placeholder text inside the résumé or
/// job description is copied verbatim.
pub fn build_match_prompt(job_description: &str, resume_text: &str) -> String {
    let values = [
        ("{resume_text}", resume_text),
        ("{job_description}", job_description),
    ];
    let mut prompt = String::with_capacity(
        MATCH_SCORE_PROMPT_TEMPLATE.len() + resume_text.len() + job_description.len(),
    );
    let mut rest = MATCH_SCORE_PROMPT_TEMPLATE;
    loop {
        let next = values
            .iter()
            .filter_map(|&(placeholder, value)| rest.find(placeholder).map(|at| (at, placeholder, value)))
            .min_by_key(|&(at, _, _)| at);
        let Some((at, placeholder, value)) = next else {
            prompt.push_str(rest);
            return prompt;
        };
        prompt.push_str(&rest[..at]);
        prompt.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }
}
