use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::detectors::remote::{huggingface, perspective};

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars (never hardcoded). The .env file is loaded
/// at startup via dotenvy. User-facing detection settings are not here;
/// they live in the settings store (see `steering`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Enables the hosted spam, scam and deepfake classifiers
    pub hugging_face_api_key: Option<String>,
    /// Enables the hosted toxicity classifier
    pub perspective_api_key: Option<String>,
    pub hugging_face_api_url: String,
    pub perspective_api_url: String,
    pub db_path: String,
    /// Owner recorded on history rows and notifications
    pub user_id: String,
    /// Upper bound on any single hosted classifier call
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hugging_face_api_key: None,
            perspective_api_key: None,
            hugging_face_api_url: huggingface::DEFAULT_API_URL.to_string(),
            perspective_api_url: perspective::DEFAULT_API_URL.to_string(),
            db_path: default_db_path(),
            user_id: "local".to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; a missing API key just means that detector
    /// runs its local heuristic.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let http_timeout = match env::var("TRUST_GUARDIAN_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid TRUST_GUARDIAN_HTTP_TIMEOUT_SECS: {raw}"))?,
            ),
            Err(_) => defaults.http_timeout,
        };

        Ok(Self {
            hugging_face_api_key: non_empty_var("HUGGING_FACE_API_KEY"),
            perspective_api_key: non_empty_var("PERSPECTIVE_API_KEY"),
            hugging_face_api_url: env::var("HUGGING_FACE_API_URL")
                .unwrap_or(defaults.hugging_face_api_url),
            perspective_api_url: env::var("PERSPECTIVE_API_URL")
                .unwrap_or(defaults.perspective_api_url),
            db_path: env::var("TRUST_GUARDIAN_DB_PATH").unwrap_or(defaults.db_path),
            user_id: non_empty_var("TRUST_GUARDIAN_USER").unwrap_or(defaults.user_id),
            http_timeout,
        })
    }

    /// Short description of which detectors will use hosted classifiers.
    pub fn remote_summary(&self) -> String {
        match (&self.hugging_face_api_key, &self.perspective_api_key) {
            (Some(_), Some(_)) => "hosted: spam, scam, deepfake, toxicity".to_string(),
            (Some(_), None) => "hosted: spam, scam, deepfake; local: toxicity".to_string(),
            (None, Some(_)) => "hosted: toxicity; local: spam, scam, deepfake".to_string(),
            (None, None) => "local heuristics only".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform data dir (e.g. ~/.local/share/trust-guardian/), or the working
/// directory if the platform has none.
pub fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("trust-guardian").join("trust_guardian.db"))
        .unwrap_or_else(|| PathBuf::from("./trust_guardian.db"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_path_ends_with_file_name() {
        assert!(default_db_path().ends_with("trust_guardian.db"));
    }

    #[test]
    fn remote_summary_reflects_keys() {
        let mut config = Config::default();
        assert_eq!(config.remote_summary(), "local heuristics only");
        config.perspective_api_key = Some("k".to_string());
        assert_eq!(
            config.remote_summary(),
            "hosted: toxicity; local: spam, scam, deepfake"
        );
    }
}
