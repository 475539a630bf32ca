//! Axum route handlers for the Screening API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::db::reset_schema;
use crate::errors::AppError;
use crate::matching::ranker::rank_with;
use crate::matching::scorer::MatchResult;
use crate::models::ResumeRow;
use crate::screening::ingest::{prepare_document, store_batch, UploadedDocument, UploadedResume};
use crate::screening::store::{list_resumes, save_match_result};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub uploaded: Vec<UploadedResume>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_description: String,
}

/// One ranked candidate, flattened into a single JSON object.
#[derive(Debug, Serialize)]
pub struct ShortlistedCandidate {
    pub id: Uuid,
    pub filename: String,
    pub candidate_name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub result: MatchResult,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub shortlisted_candidates: Vec<ShortlistedCandidate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/batch-upload
///
/// Accepts multipart files (PDF or plain text) and extracts each candidate profile. Every file is
/// read before any is stored, and the batch is stored atomically.
pub async fn handle_batch_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchUploadResponse>, AppError> {
    let mut documents = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue; // plain form fields carry no résumé
        };
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{filename}': {e}")))?;
        documents.push(UploadedDocument {
            filename,
            content_type,
            bytes,
        });
    }

    if documents.is_empty() {
        return Err(AppError::Validation(
            "at least one résumé file is required".to_string(),
        ));
    }

    info!("Batch upload: {} file(s)", documents.len());
    let mut prepared = Vec::with_capacity(documents.len());
    for document in documents {
        prepared.push(prepare_document(document).await?);
    }
    let uploaded = store_batch(&state.db, prepared).await?;

    Ok(Json(BatchUploadResponse { uploaded }))
}

/// GET /api/v1/resumes
///
/// Returns every stored résumé with its most recent scores.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(list_resumes(&state.db).await?))
}

/// POST /api/v1/match
///
/// Scores every stored résumé against the job description, persists the scores and returns
/// the candidates ranked best-first.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let rows = list_resumes(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::Validation(
            "no résumés have been uploaded yet".to_string(),
        ));
    }

    let batch = rows
        .iter()
        .map(|row| (row.profile(), row.raw_text.clone()))
        .collect();
    info!(
        "Matching {} résumé(s) with the {} scorer",
        rows.len(),
        state.scorer.backend()
    );
    let ranked = rank_with(state.scorer.clone(), &request.job_description, batch).await?;

    let mut tx = state.db.begin().await?;
    let mut shortlisted_candidates = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        let row = &rows[candidate.batch_index];
        save_match_result(&mut *tx, row.id, &request.job_description, &candidate.result).await?;
        shortlisted_candidates.push(ShortlistedCandidate {
            id: row.id,
            filename: row.filename.clone(),
            candidate_name: candidate.profile.name,
            email: candidate.profile.email,
            phone: candidate.profile.phone,
            skills: candidate.profile.skills,
            result: candidate.result,
        });
    }
    tx.commit().await?;

    Ok(Json(MatchResponse {
        shortlisted_candidates,
    }))
}

/// POST /api/v1/admin/reset-db
///
/// Drops all stored résumés and recreates the schema.
pub async fn handle_reset_db(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    reset_schema(&state.db).await?;
    Ok(Json(json!({ "status": "reset" })))
}
