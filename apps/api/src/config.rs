use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Only required when `enable_llm_scoring` is set.
    pub anthropic_api_key: Option<String>,
    pub enable_llm_scoring: bool,
    pub max_upload_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let enable_llm_scoring = parse_flag(optional_env("ENABLE_LLM_SCORING").as_deref())
            .context("ENABLE_LLM_SCORING must be true or false")?;
        let anthropic_api_key = optional_env("ANTHROPIC_API_KEY");
        if enable_llm_scoring && anthropic_api_key.is_none() {
            bail!("ENABLE_LLM_SCORING is set but 'ANTHROPIC_API_KEY' is not");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key,
            enable_llm_scoring,
            max_upload_mb: optional_env("MAX_UPLOAD_MB")
                .unwrap_or_else(|| "20".to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_MB must be a whole number of megabytes")?,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => bail!("unrecognised flag value '{v}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_to_false() {
        assert!(!parse_flag(None).unwrap());
    }

    #[test]
    fn test_flag_accepts_common_spellings() {
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some(" 1 ")).unwrap());
        assert!(!parse_flag(Some("off")).unwrap());
    }

    #[test]
    fn test_flag_rejects_garbage() {
        assert!(parse_flag(Some("maybe")).is_err());
    }
}
