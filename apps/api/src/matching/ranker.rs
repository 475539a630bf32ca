//! Ranker: scores a batch of résumés against one job description and orders them.
//!
//! Each résumé is scored independently; there is no cross-résumé normalisation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::AppError;
use crate::matching::extractor::CandidateProfile;
use crate::matching::scorer::{score_match, MatchResult, MatchScorer};

/// A résumé with its score. `batch_index` is its position in the input batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub batch_index: usize,
    pub profile: CandidateProfile,
    pub result: MatchResult,
}

pub type RankedBatch = Vec<RankedCandidate>;

/// Ranks `(profile, résumé text)` pairs with the deterministic scorer.
pub fn rank(
    job_description: &str,
    batch: Vec<(CandidateProfile, String)>,
) -> Result<RankedBatch, AppError> {
    check_preconditions(job_description, batch.len())?;

    let ranked = batch
        .into_iter()
        .enumerate()
        .map(|(batch_index, (profile, resume_text))| {
            let result = score_match(job_description, &resume_text, &profile.skills);
            RankedCandidate {
                batch_index,
                profile,
                result,
            }
        })
        .collect();

    Ok(sort_ranked(ranked))
}

/// Ranks with any `MatchScorer`, scoring each résumé on its own task.
pub async fn rank_with(
    scorer: Arc<dyn MatchScorer>,
    job_description: &str,
    batch: Vec<(CandidateProfile, String)>,
) -> Result<RankedBatch, AppError> {
    check_preconditions(job_description, batch.len())?;

    let job_description: Arc<str> = Arc::from(job_description);
    let mut tasks = JoinSet::new();
    for (batch_index, (profile, resume_text)) in batch.into_iter().enumerate() {
        let scorer = Arc::clone(&scorer);
        let job_description = Arc::clone(&job_description);
        tasks.spawn(async move {
            let result = scorer
                .score(&job_description, &resume_text, &profile.skills)
                .await?;
            debug!(
                "Scored candidate #{batch_index} '{}': overall={} backend={}",
                profile.name, result.overall_score, result.scorer_backend
            );
            Ok::<_, AppError>(RankedCandidate {
                batch_index,
                profile,
                result,
            })
        });
    }

    let mut scored = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let candidate = joined.map_err(|e| AppError::Internal(e.into()))??;
        scored.push(candidate);
    }

    // Tasks finish in any order; restore input order so the stable sort keeps ties as submitted.
    scored.sort_by_key(|c| c.batch_index);
    Ok(sort_ranked(scored))
}

/// Sorts descending by overall score. `sort_by` is stable, so equal scores keep input order.
pub fn sort_ranked(mut ranked: RankedBatch) -> RankedBatch {
    ranked.sort_by(|a, b| b.result.overall_score.total_cmp(&a.result.overall_score));
    ranked
}

fn check_preconditions(job_description: &str, batch_len: usize) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if batch_len == 0 {
        return Err(AppError::Validation(
            "at least one résumé is required for matching".to_string(),
        ));
    }
    Ok(())
}
