use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::extractor::CandidateProfile;

/// A stored résumé with its extracted profile and, once matched, its latest scores.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub filename: String,
    pub candidate_name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing)]
    pub raw_text: String,
    pub skills_score: Option<f64>,
    pub experience_score: Option<f64>,
    pub education_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub match_percentage: Option<i32>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub justification: Option<String>,
    pub recommendation: Option<String>,
    pub scorer_backend: Option<String>,
    pub job_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub scored_at: Option<DateTime<Utc>>,
}

impl ResumeRow {
    pub fn profile(&self) -> CandidateProfile {
        CandidateProfile {
            name: self.candidate_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            skills: self.skills.clone(),
        }
    }
}
