//! TripPlanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmError;
use crate::pipeline::Stage;

/// Main TripPlanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Preference file location
    #[serde(rename = "preferences-path")]
    pub preferences_path: PathBuf,

    /// Directory holding `{stage}.pmt` prompt overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: PathBuf,

    /// Per-stage generation backends
    pub stages: StagesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            preferences_path: PathBuf::from(prefstore::DEFAULT_FILE_NAME),
            prompts_dir: PathBuf::from(".tripplanner/prompts"),
            stages: StagesConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration before any backend is built
    ///
    /// Checks that every stage's API key environment variable is set.
    pub fn validate(&self) -> Result<()> {
        for stage in Stage::ALL {
            let llm = self.stages.get(stage);
            if llm.api_key().is_err() {
                return Err(eyre::eyre!(
                    "API key for the {} stage not found. Set the {} environment variable.",
                    stage,
                    llm.api_key_env
                ));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .tripplanner.yml
        let local_config = PathBuf::from(".tripplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/tripplanner/tripplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripplanner").join("tripplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed: a broken config is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".tripplanner.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("tripplanner").join("tripplanner.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// One backend per pipeline stage
///
/// A stage block that is present replaces that stage's defaults wholesale;
/// keys missing inside it fall back to `StageLlmConfig::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    pub outline: StageLlmConfig,
    pub itinerary: StageLlmConfig,
    pub packing: StageLlmConfig,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            outline: StageLlmConfig::groq("llama-3.1-8b-instant", 0.7),
            itinerary: StageLlmConfig::gemini("gemini-1.5-flash", 0.6),
            packing: StageLlmConfig::groq("llama-3.1-8b-instant", 0.5),
        }
    }
}

impl StagesConfig {
    /// Backend settings for a stage
    pub fn get(&self, stage: Stage) -> &StageLlmConfig {
        match stage {
            Stage::Outline => &self.outline,
            Stage::Itinerary => &self.itinerary,
            Stage::Packing => &self.packing,
        }
    }
}

/// Generation backend configuration for a single stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageLlmConfig {
    /// Provider name ("openai", "groq" or "gemini")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for StageLlmConfig {
    fn default() -> Self {
        Self::groq("llama-3.1-8b-instant", 0.7)
    }
}

impl StageLlmConfig {
    fn groq(model: &str, temperature: f32) -> Self {
        Self {
            provider: "groq".to_string(),
            model: model.to_string(),
            temperature,
            api_key_env: "GROQ_API_KEY".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }

    fn gemini(model: &str, temperature: f32) -> Self {
        Self {
            provider: "gemini".to_string(),
            model: model.to_string(),
            temperature,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, LlmError> {
        std::env::var(&self.api_key_env).map_err(|_| LlmError::MissingApiKey(self.api_key_env.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_stages_follow_provider_split() {
        let config = Config::default();
        assert_eq!(config.stages.outline.provider, "groq");
        assert_eq!(config.stages.itinerary.provider, "gemini");
        assert_eq!(config.stages.packing.provider, "groq");
        assert_eq!(config.stages.get(Stage::Packing).temperature, 0.5);
        assert_eq!(config.preferences_path, PathBuf::from("user_preferences.json"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tp.yml");
        fs::write(
            &path,
            r#"
log-level: debug
preferences-path: /tmp/prefs.json
stages:
  itinerary:
    provider: openai
    model: gpt-4o-mini
    api-key-env: OPENAI_API_KEY
    base-url: https://api.openai.com/v1
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.preferences_path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(config.stages.itinerary.provider, "openai");
        assert_eq!(config.stages.itinerary.model, "gpt-4o-mini");
        // Untouched stages keep their defaults
        assert_eq!(config.stages.outline.model, "llama-3.1-8b-instant");
        assert_eq!(config.prompts_dir, PathBuf::from(".tripplanner/prompts"));
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_log_level_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tp.yml");
        fs::write(&path, "log-level: warn\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    #[serial]
    fn test_validate_requires_api_keys() {
        let mut config = Config::default();
        config.stages.outline.api_key_env = "TP_TEST_OUTLINE_KEY".to_string();
        config.stages.itinerary.api_key_env = "TP_TEST_OUTLINE_KEY".to_string();
        config.stages.packing.api_key_env = "TP_TEST_PACKING_KEY".to_string();

        unsafe {
            std::env::set_var("TP_TEST_OUTLINE_KEY", "k");
            std::env::remove_var("TP_TEST_PACKING_KEY");
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TP_TEST_PACKING_KEY"));

        unsafe {
            std::env::set_var("TP_TEST_PACKING_KEY", "k");
        }
        assert!(config.validate().is_ok());

        unsafe {
            std::env::remove_var("TP_TEST_OUTLINE_KEY");
            std::env::remove_var("TP_TEST_PACKING_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_api_key_reads_configured_variable() {
        let llm = StageLlmConfig {
            api_key_env: "TP_TEST_STAGE_KEY".to_string(),
            ..StageLlmConfig::default()
        };

        unsafe {
            std::env::remove_var("TP_TEST_STAGE_KEY");
        }
        match llm.api_key() {
            Err(LlmError::MissingApiKey(var)) => assert_eq!(var, "TP_TEST_STAGE_KEY"),
            other => panic!("expected MissingApiKey, got {:?}", other),
        }

        unsafe {
            std::env::set_var("TP_TEST_STAGE_KEY", "secret");
        }
        assert_eq!(llm.api_key().unwrap(), "secret");

        unsafe {
            std::env::remove_var("TP_TEST_STAGE_KEY");
        }
    }
}
