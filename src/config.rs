use crate::defaults;
use crate::vocab::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub subtitle: SubtitleConfig,
}

/// Which detection backend the pipeline runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendMode {
    /// Landmark rules, fully local.
    #[default]
    LocalRules,
    /// Hosted classification endpoint.
    Remote,
    /// Local image model.
    LocalModel,
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub backend: BackendMode,
    pub min_confidence: f32,
    pub language: Language,
    pub remote: RemoteConfig,
    pub model: ModelConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

/// Local model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Label metadata file for the local-model backend.
    pub metadata_path: Option<String>,
}

/// Subtitle assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubtitleConfig {
    pub silence_timeout_ms: u64,
    pub history_capacity: usize,
    pub show_confidence: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            backend: BackendMode::LocalRules,
            min_confidence: defaults::MIN_CONFIDENCE,
            language: Language::English,
            remote: RemoteConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: defaults::SILENCE_TIMEOUT_MS,
            history_capacity: defaults::SUBTITLE_HISTORY_CAPACITY,
            show_confidence: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an
    /// error the caller sees.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNSUB_BACKEND → detection.backend
    /// - SIGNSUB_LANGUAGE → detection.language
    /// - SIGNSUB_API_KEY → detection.remote.api_key
    /// - SIGNSUB_ENDPOINT → detection.remote.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(backend) = std::env::var("SIGNSUB_BACKEND")
            && !backend.is_empty()
        {
            match backend.as_str() {
                "local-rules" => self.detection.backend = BackendMode::LocalRules,
                "remote" => self.detection.backend = BackendMode::Remote,
                "local-model" => self.detection.backend = BackendMode::LocalModel,
                other => eprintln!("ignoring unknown SIGNSUB_BACKEND value '{other}'"),
            }
        }

        if let Ok(language) = std::env::var("SIGNSUB_LANGUAGE")
            && !language.is_empty()
        {
            match language.as_str() {
                "english" => self.detection.language = Language::English,
                "spanish" => self.detection.language = Language::Spanish,
                "khmer" => self.detection.language = Language::Khmer,
                other => eprintln!("ignoring unknown SIGNSUB_LANGUAGE value '{other}'"),
            }
        }

        if let Ok(api_key) = std::env::var("SIGNSUB_API_KEY")
            && !api_key.is_empty()
        {
            self.detection.remote.api_key = Some(api_key);
        }

        if let Ok(endpoint) = std::env::var("SIGNSUB_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.detection.remote.endpoint = Some(endpoint);
        }

        self
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            anyhow::bail!(
                "detection.min_confidence must be within [0, 1], got {}",
                self.detection.min_confidence
            );
        }
        if self.subtitle.history_capacity == 0 {
            anyhow::bail!("subtitle.history_capacity must be at least 1");
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signsub/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("signsub")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_signsub_env() {
        remove_env("SIGNSUB_BACKEND");
        remove_env("SIGNSUB_LANGUAGE");
        remove_env("SIGNSUB_API_KEY");
        remove_env("SIGNSUB_ENDPOINT");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.detection.backend, BackendMode::LocalRules);
        assert_eq!(config.detection.min_confidence, defaults::MIN_CONFIDENCE);
        assert_eq!(config.detection.language, Language::English);
        assert_eq!(config.detection.remote.endpoint, None);
        assert_eq!(config.detection.remote.api_key, None);

        assert_eq!(
            config.subtitle.silence_timeout_ms,
            defaults::SILENCE_TIMEOUT_MS
        );
        assert_eq!(
            config.subtitle.history_capacity,
            defaults::SUBTITLE_HISTORY_CAPACITY
        );
        assert!(config.subtitle.show_confidence);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [detection]
            backend = "remote"
            min_confidence = 0.5
            language = "spanish"

            [detection.remote]
            endpoint = "https://example.test/classify"
            api_key = "secret"

            [detection.model]
            metadata_path = "/models/metadata.json"

            [subtitle]
            silence_timeout_ms = 5000
            history_capacity = 10
            show_confidence = false
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.detection.backend, BackendMode::Remote);
        assert_eq!(config.detection.min_confidence, 0.5);
        assert_eq!(config.detection.language, Language::Spanish);
        assert_eq!(
            config.detection.remote.endpoint,
            Some("https://example.test/classify".to_string())
        );
        assert_eq!(config.detection.remote.api_key, Some("secret".to_string()));
        assert_eq!(
            config.detection.model.metadata_path,
            Some("/models/metadata.json".to_string())
        );

        assert_eq!(config.subtitle.silence_timeout_ms, 5000);
        assert_eq!(config.subtitle.history_capacity, 10);
        assert!(!config.subtitle.show_confidence);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [detection]
            backend = "local-model"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.detection.backend, BackendMode::LocalModel);
        assert_eq!(config.detection.min_confidence, defaults::MIN_CONFIDENCE);
        assert_eq!(
            config.subtitle.silence_timeout_ms,
            defaults::SILENCE_TIMEOUT_MS
        );
    }

    #[test]
    fn test_load_rejects_out_of_range_confidence() {
        let toml_content = r#"
            [detection]
            min_confidence = 1.5
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid toml [[[").unwrap();
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_env_override_backend() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsub_env();

        set_env("SIGNSUB_BACKEND", "remote");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.detection.backend, BackendMode::Remote);

        clear_signsub_env();
    }

    #[test]
    fn test_env_override_language_and_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsub_env();

        set_env("SIGNSUB_LANGUAGE", "khmer");
        set_env("SIGNSUB_API_KEY", "hf_token");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.detection.language, Language::Khmer);
        assert_eq!(config.detection.remote.api_key, Some("hf_token".to_string()));

        clear_signsub_env();
    }

    #[test]
    fn test_env_override_unknown_backend_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsub_env();

        set_env("SIGNSUB_BACKEND", "hologram");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.detection.backend, BackendMode::LocalRules);

        clear_signsub_env();
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_signsub_env();

        set_env("SIGNSUB_API_KEY", "");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.detection.remote.api_key, None);

        clear_signsub_env();
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = Config::default();
        config.detection.backend = BackendMode::Remote;
        config.subtitle.history_capacity = 5;

        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
