use std::path::PathBuf;

use crate::store;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = match var("DREAM_NOTEBOOK_DB") {
            Some(path) => PathBuf::from(path),
            None => store::default_db_path().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to notebook.db in the working directory");
                PathBuf::from("notebook.db")
            }),
        };

        Self {
            db_path,
            ai: AiConfig {
                api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
                model: var("DREAM_NOTEBOOK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: var("DREAM_NOTEBOOK_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn explicit_values_win() {
        let config = config_from(&[
            ("DREAM_NOTEBOOK_DB", "/tmp/nb.db"),
            ("GEMINI_API_KEY", "k1"),
            ("API_KEY", "k2"),
            ("DREAM_NOTEBOOK_MODEL", "gemini-2.5-flash"),
            ("DREAM_NOTEBOOK_API_BASE", "http://localhost:8080"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/nb.db"));
        assert_eq!(config.ai.api_key.as_deref(), Some("k1"));
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert_eq!(config.ai.base_url, "http://localhost:8080");
    }

    #[test]
    fn falls_back_to_api_key_and_defaults() {
        let config = config_from(&[("DREAM_NOTEBOOK_DB", "nb.db"), ("API_KEY", "legacy")]);
        assert_eq!(config.ai.api_key.as_deref(), Some("legacy"));
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert_eq!(config.ai.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("DREAM_NOTEBOOK_DB", "nb.db"), ("GEMINI_API_KEY", "  ")]);
        assert_eq!(config.ai.api_key, None);
    }
}
