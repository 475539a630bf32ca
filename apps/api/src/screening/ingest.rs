use bytes::Bytes;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::extractor::{extract_profile, CandidateProfile};
use crate::screening::store::insert_resume;

/// One file received from a batch upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

#[derive(Debug, Serialize)]
pub struct UploadedResume {
    pub id: Uuid,
    pub filename: String,
    pub candidate_name: String,
    /// Extracted text length in characters.
    pub text_length: usize,
}

/// Decides how to read a document from its declared media type, then its extension.
pub fn detect_kind(filename: &str, content_type: Option<&str>) -> Option<DocumentKind> {
    match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
        Some("application/pdf") => return Some(DocumentKind::Pdf),
        Some("text/plain") => return Some(DocumentKind::PlainText),
        _ => {}
    }
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Some(DocumentKind::Pdf)
    } else if lower.ends_with(".txt") {
        Some(DocumentKind::PlainText)
    } else {
        None
    }
}

/// Converts raw document bytes into plain text. CPU-bound for PDFs; call off the async runtime.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, AppError> {
    let text = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::UnprocessableEntity(format!("PDF extraction failed: {e}")))?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(text.trim().to_string())
}

/// A document that has been read and profiled but not yet stored.
#[derive(Debug)]
pub struct PreparedResume {
    pub filename: String,
    pub profile: CandidateProfile,
    pub text: String,
}

/// Reads one uploaded document and extracts its profile. Touches no storage, so a batch can be
/// fully validated before anything is written.
pub async fn prepare_document(document: UploadedDocument) -> Result<PreparedResume, AppError> {
    let UploadedDocument {
        filename,
        content_type,
        bytes,
    } = document;

    let kind = detect_kind(&filename, content_type.as_deref()).ok_or_else(|| {
        AppError::Validation(format!("'{filename}' is not a PDF or plain-text résumé"))
    })?;

    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| match e {
            AppError::UnprocessableEntity(msg) => {
                AppError::UnprocessableEntity(format!("{filename}: {msg}"))
            }
            other => other,
        })?;

    if text.is_empty() {
        warn!("No text could be read from '{filename}'; storing an empty profile");
    }

    let profile = extract_profile(&text);
    Ok(PreparedResume {
        filename,
        profile,
        text,
    })
}

/// Stores a prepared batch in one transaction: either every résumé is saved or none is.
pub async fn store_batch(
    pool: &PgPool,
    batch: Vec<PreparedResume>,
) -> Result<Vec<UploadedResume>, AppError> {
    let mut tx = pool.begin().await?;
    let mut uploaded = Vec::with_capacity(batch.len());
    for resume in batch {
        let id = insert_resume(&mut *tx, &resume.filename, &resume.profile, &resume.text).await?;
        let text_length = resume.text.chars().count();
        info!(
            "Ingested '{}' as {id} ({text_length} chars, {} skills)",
            resume.filename,
            resume.profile.skills.len()
        );
        uploaded.push(UploadedResume {
            id,
            filename: resume.filename,
            candidate_name: resume.profile.name,
            text_length,
        });
    }
    tx.commit().await?;
    Ok(uploaded)
}
