mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod screening;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema, reset_schema};
use crate::llm_client::LlmClient;
use crate::matching::extractor::extract_profile;
use crate::matching::ranker::rank;
use crate::matching::scorer::{DeterministicScorer, LlmMatchScorer, MatchScorer};
use crate::routes::build_router;
use crate::screening::ingest::{detect_kind, extract_text};
use crate::state::AppState;

const USAGE: &str = "Usage: screener [serve | reset-db | rank <job-description.txt> <resume>...]";

#[derive(Debug, PartialEq)]
enum Command {
    Serve,
    ResetDb,
    /// Offline ranking of local files with the deterministic scorer; prints JSON.
    Rank {
        job_description: PathBuf,
        resumes: Vec<PathBuf>,
    },
}

fn parse_command(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve),
        Some("reset-db") => Ok(Command::ResetDb),
        Some("rank") => match &args[1..] {
            [jd, resumes @ ..] if !resumes.is_empty() => Ok(Command::Rank {
                job_description: PathBuf::from(jd),
                resumes: resumes.iter().map(PathBuf::from).collect(),
            }),
            _ => bail!("rank needs a job description file and at least one résumé. {USAGE}"),
        },
        Some(other) => bail!("Unknown command '{other}'. {USAGE}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset_only = match parse_command(&args)? {
        Command::Rank {
            job_description,
            resumes,
        } => {
            init_tracing("warn");
            return rank_files(job_description, resumes);
        }
        Command::ResetDb => true,
        Command::Serve => false,
    };

    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    let db = create_pool(&config.database_url).await?;

    if reset_only {
        reset_schema(&db).await?;
        info!("Database reset complete");
        return Ok(());
    }

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));
    ensure_schema(&db).await?;

    let scorer = build_scorer(&config);
    info!("Match scorer: {}", scorer.backend());

    let state = AppState {
        db,
        config: config.clone(),
        scorer,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize structured logging
fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), default_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Deterministic scoring unless LLM scoring is enabled and its client can be built.
fn build_scorer(config: &Config) -> Arc<dyn MatchScorer> {
    let api_key = match (&config.anthropic_api_key, config.enable_llm_scoring) {
        (Some(key), true) => key.clone(),
        _ => return Arc::new(DeterministicScorer),
    };
    match LlmClient::new(api_key) {
        Ok(llm) => {
            info!("LLM scoring enabled (model: {})", llm_client::MODEL);
            Arc::new(LlmMatchScorer(llm))
        }
        Err(e) => {
            warn!("LLM client unavailable ({e}); using deterministic scorer");
            Arc::new(DeterministicScorer)
        }
    }
}

fn rank_files(job_description: PathBuf, resumes: Vec<PathBuf>) -> Result<()> {
    let jd_text = std::fs::read_to_string(&job_description)
        .with_context(|| format!("Failed to read {}", job_description.display()))?;

    let mut batch = Vec::with_capacity(resumes.len());
    for path in &resumes {
        let name = path.display().to_string();
        let kind = detect_kind(&name, None)
            .with_context(|| format!("{name} is not a .pdf or .txt file"))?;
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {name}"))?;
        let text = extract_text(kind, &bytes)?;
        batch.push((extract_profile(&text), text));
    }

    let ranked = rank(&jd_text, batch)?;
    let report: Vec<_> = ranked
        .iter()
        .map(|c| {
            serde_json::json!({
                "file": resumes[c.batch_index].display().to_string(),
                "profile": c.profile,
                "result": c.result,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_serves() {
        assert_eq!(parse_command(&[]).unwrap(), Command::Serve);
        assert_eq!(parse_command(&args(&["serve"])).unwrap(), Command::Serve);
    }

    #[test]
    fn test_reset_db_command() {
        assert_eq!(parse_command(&args(&["reset-db"])).unwrap(), Command::ResetDb);
    }

    #[test]
    fn test_rank_command_collects_paths() {
        let command = parse_command(&args(&["rank", "jd.txt", "a.pdf", "b.txt"])).unwrap();
        assert_eq!(
            command,
            Command::Rank {
                job_description: PathBuf::from("jd.txt"),
                resumes: vec![PathBuf::from("a.pdf"), PathBuf::from("b.txt")],
            }
        );
    }

    #[test]
    fn test_rank_without_resumes_is_an_error() {
        assert!(parse_command(&args(&["rank", "jd.txt"])).is_err());
        assert!(parse_command(&args(&["rank"])).is_err());
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        assert!(parse_command(&args(&["migrate"])).is_err());
    }
}
