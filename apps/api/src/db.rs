use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_RESUMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resumes (
    id                UUID PRIMARY KEY,
    filename          TEXT NOT NULL,
    candidate_name    TEXT NOT NULL DEFAULT '',
    email             TEXT NOT NULL DEFAULT '',
    phone             TEXT NOT NULL DEFAULT '',
    skills            TEXT[] NOT NULL DEFAULT '{}',
    raw_text          TEXT NOT NULL,
    skills_score      DOUBLE PRECISION,
    experience_score  DOUBLE PRECISION,
    education_score   DOUBLE PRECISION,
    overall_score     DOUBLE PRECISION,
    match_percentage  INTEGER,
    strengths         TEXT[] NOT NULL DEFAULT '{}',
    gaps              TEXT[] NOT NULL DEFAULT '{}',
    justification     TEXT,
    recommendation    TEXT,
    scorer_backend    TEXT,
    job_description   TEXT,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    scored_at         TIMESTAMPTZ
)
"#;

const DROP_RESUMES_TABLE: &str = "DROP TABLE IF EXISTS resumes";

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `resumes` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_RESUMES_TABLE).execute(pool).await?;
    Ok(())
}

/// Drops every stored résumé and recreates an empty schema.
pub async fn reset_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(DROP_RESUMES_TABLE).execute(pool).await?;
    ensure_schema(pool).await?;
    info!("Database reset: resumes table recreated");
    Ok(())
}
