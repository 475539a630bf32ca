use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::matching::extractor::CandidateProfile;
use crate::matching::scorer::MatchResult;
use crate::models::ResumeRow;

/// Inserts a freshly ingested résumé. Scores stay NULL until the first match run.
pub async fn insert_resume<'e, E: PgExecutor<'e>>(
    executor: E,
    filename: &str,
    profile: &CandidateProfile,
    raw_text: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO resumes (id, filename, candidate_name, email, phone, skills, raw_text)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(filename)
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.skills)
    .bind(raw_text)
    .execute(executor)
    .await?;
    Ok(id)
}

pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at, id")
        .fetch_all(pool)
        .await
}

/// Overwrites the stored scores of one résumé with the latest match result.
pub async fn save_match_result<'e, E: PgExecutor<'e>>(
    executor: E,
    resume_id: Uuid,
    job_description: &str,
    result: &MatchResult,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE resumes SET
            skills_score = $1,
            experience_score = $2,
            education_score = $3,
            overall_score = $4,
            match_percentage = $5,
            strengths = $6,
            gaps = $7,
            justification = $8,
            recommendation = $9,
            scorer_backend = $10,
            job_description = $11,
            scored_at = NOW()
        WHERE id = $12
        "#,
    )
    .bind(result.skills_score)
    .bind(result.experience_score)
    .bind(result.education_score)
    .bind(result.overall_score)
    .bind(result.match_percentage as i32)
    .bind(&result.strengths)
    .bind(&result.gaps)
    .bind(&result.justification)
    .bind(&result.recommendation)
    .bind(&result.scorer_backend)
    .bind(job_description)
    .bind(resume_id)
    .execute(executor)
    .await?;
    Ok(())
}
