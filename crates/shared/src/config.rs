//! Application configuration for askglean.
//!
//! User config lives at `~/.askglean/askglean.toml`. CLI flags override
//! environment variables, which override config file values, which override
//! defaults. The bearer token is only ever read from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AskGleanError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "askglean.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".askglean";

// ---------------------------------------------------------------------------
// Config structs (matching askglean.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run behavior defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Glean instance settings.
    #[serde(default)]
    pub glean: GleanConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Minimum ms between consecutive API calls.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Re-ask questions that already carry an answer.
    #[serde(default)]
    pub reprocess_answered: bool,

    /// Rewrite the output file after every successful answer.
    #[serde(default)]
    pub sync_incremental: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout_secs(),
            reprocess_answered: false,
            sync_incremental: false,
        }
    }
}

fn default_rate_limit() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[glean]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GleanConfig {
    /// Name of the env var holding the bearer token (never the token itself).
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Instance name, the `{instance}` in `{instance}-be.glean.com`.
    #[serde(default)]
    pub instance: Option<String>,

    /// Email address to act as on API calls.
    #[serde(default)]
    pub user: Option<String>,

    /// Application id attached to chat requests.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Default questions CSV path.
    #[serde(default)]
    pub questions_csv: Option<String>,
}

impl Default for GleanConfig {
    fn default() -> Self {
        Self {
            api_token_env: default_api_token_env(),
            instance: None,
            user: None,
            app_id: None,
            questions_csv: None,
        }
    }
}

fn default_api_token_env() -> String {
    "GLEAN_API_TOKEN".into()
}

// ---------------------------------------------------------------------------
// Runtime config (merged from CLI flags + env + config file)
// ---------------------------------------------------------------------------

/// CLI-provided overrides fed into [`RunConfig::resolve`].
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub debug: Option<bool>,
    pub questions_csv: Option<PathBuf>,
    pub user: Option<String>,
    pub app_id: Option<String>,
}

/// Runtime configuration, read-only after resolution.
#[derive(Clone)]
pub struct RunConfig {
    /// Glean instance name.
    pub instance: String,
    /// Bearer token presented on every API call.
    pub api_token: String,
    /// Input CSV path.
    pub questions_csv: PathBuf,
    /// Dry-run mode: log requests without calling the API.
    pub debug: bool,
    /// Email address to act as, if any.
    pub user: Option<String>,
    /// Application id attached to chat requests, if any.
    pub app_id: Option<String>,
    /// Minimum ms between consecutive API calls.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Re-ask questions that already carry an answer.
    pub reprocess_answered: bool,
    /// Rewrite the output file after every successful answer.
    pub sync_incremental: bool,
}

// Manual impl so the token never ends up in logs or error reports.
impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("instance", &self.instance)
            .field("api_token", &"<redacted>")
            .field("questions_csv", &self.questions_csv)
            .field("debug", &self.debug)
            .field("user", &self.user)
            .field("app_id", &self.app_id)
            .field("rate_limit_ms", &self.rate_limit_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("reprocess_answered", &self.reprocess_answered)
            .field("sync_incremental", &self.sync_incremental)
            .finish()
    }
}

impl RunConfig {
    /// Merge CLI flags > environment variables > config file > defaults.
    ///
    /// Fails with a config error when the token, instance, or input path
    /// cannot be resolved. Reads nothing but the environment.
    pub fn resolve(config: &AppConfig, overrides: &CliOverrides) -> Result<Self> {
        let api_token = match std::env::var(&config.glean.api_token_env) {
            Ok(v) if !v.is_empty() => v,
            _ => {
                return Err(AskGleanError::config(format!(
                    "Glean API token not found. Set the {} environment variable.",
                    config.glean.api_token_env
                )));
            }
        };

        let instance = env_nonempty("GLEAN_INSTANCE")
            .or_else(|| config.glean.instance.clone())
            .ok_or_else(|| {
                AskGleanError::config(
                    "Glean instance not set. Set GLEAN_INSTANCE or [glean].instance.",
                )
            })?;

        let questions_csv = overrides
            .questions_csv
            .clone()
            .or_else(|| env_nonempty("QUESTIONS_CSV").map(PathBuf::from))
            .or_else(|| config.glean.questions_csv.as_deref().map(PathBuf::from))
            .ok_or_else(|| {
                AskGleanError::config(
                    "questions CSV not set. Pass --questions-csv, set QUESTIONS_CSV, \
                     or set [glean].questions_csv.",
                )
            })?;

        let debug = overrides.debug.unwrap_or_else(|| {
            std::env::var("DEBUG").map(|v| truthy(&v)).unwrap_or(false)
        });

        let user = overrides
            .user
            .clone()
            .or_else(|| env_nonempty("GLEAN_USER"))
            .or_else(|| config.glean.user.clone());

        let app_id = overrides
            .app_id
            .clone()
            .or_else(|| env_nonempty("GLEAN_AI_APP_ID"))
            .or_else(|| config.glean.app_id.clone());

        Ok(Self {
            instance,
            api_token,
            questions_csv,
            debug,
            user,
            app_id,
            rate_limit_ms: config.defaults.rate_limit_ms,
            timeout_secs: config.defaults.timeout_secs,
            reprocess_answered: config.defaults.reprocess_answered,
            sync_incremental: config.defaults.sync_incremental,
        })
    }
}

/// Read an env var, treating unset and empty values the same.
fn env_nonempty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Boolean env/flag parsing. Anything unrecognized is false.
fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "t" | "y" | "yes"
    )
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.askglean/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AskGleanError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.askglean/askglean.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AskGleanError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AskGleanError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AskGleanError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AskGleanError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AskGleanError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("rate_limit_ms"));
        assert!(toml_str.contains("GLEAN_API_TOKEN"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.rate_limit_ms, 1000);
        assert_eq!(parsed.defaults.timeout_secs, 30);
        assert_eq!(parsed.glean.api_token_env, "GLEAN_API_TOKEN");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[glean]
instance = "acme"
questions_csv = "/data/questions.csv"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.glean.instance.as_deref(), Some("acme"));
        assert_eq!(config.defaults.rate_limit_ms, 1000);
        assert!(!config.defaults.reprocess_answered);
    }

    #[test]
    fn load_config_from_reads_toml_file() {
        let path = std::env::temp_dir().join("askglean-config-test-71933.toml");
        std::fs::write(
            &path,
            "[defaults]\nrate_limit_ms = 50\n\n[glean]\ninstance = \"acme\"\n",
        )
        .unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.rate_limit_ms, 50);
        assert_eq!(config.glean.instance.as_deref(), Some("acme"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_from_rejects_invalid_toml() {
        let path = std::env::temp_dir().join("askglean-config-test-71934.toml");
        std::fs::write(&path, "not valid toml [").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, AskGleanError::Config { .. }), "got {err}");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn truthy_parsing() {
        for v in ["true", "TRUE", "1", "t", "y", "Yes"] {
            assert!(truthy(v), "{v} should be truthy");
        }
        for v in ["false", "0", "no", "maybe", ""] {
            assert!(!truthy(v), "{v} should be falsy");
        }
    }

    #[test]
    fn resolve_fails_without_token() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.glean.api_token_env = "ASKGLEAN_TEST_NONEXISTENT_TOKEN_48151".into();
        config.glean.instance = Some("acme".into());
        config.glean.questions_csv = Some("/data/questions.csv".into());

        let result = RunConfig::resolve(&config, &CliOverrides::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API token"));
    }

    #[test]
    fn resolve_merges_file_and_overrides() {
        let mut config = AppConfig::default();
        config.glean.api_token_env = "ASKGLEAN_TEST_TOKEN_62342".into();
        config.glean.instance = Some("acme".into());
        config.glean.user = Some("file-user@acme.com".into());
        config.defaults.rate_limit_ms = 250;
        unsafe { std::env::set_var("ASKGLEAN_TEST_TOKEN_62342", "tok-123") };

        let overrides = CliOverrides {
            debug: Some(false),
            questions_csv: Some(PathBuf::from("/tmp/q.csv")),
            user: Some("flag-user@acme.com".into()),
            app_id: Some("app-9".into()),
        };

        let resolved = RunConfig::resolve(&config, &overrides).expect("resolve");
        assert_eq!(resolved.instance, "acme");
        assert_eq!(resolved.api_token, "tok-123");
        assert_eq!(resolved.questions_csv, PathBuf::from("/tmp/q.csv"));
        assert!(!resolved.debug);
        // Flag wins over the config file value
        assert_eq!(resolved.user.as_deref(), Some("flag-user@acme.com"));
        assert_eq!(resolved.app_id.as_deref(), Some("app-9"));
        assert_eq!(resolved.rate_limit_ms, 250);
    }

    #[test]
    fn run_config_debug_redacts_token() {
        let mut config = AppConfig::default();
        config.glean.api_token_env = "ASKGLEAN_TEST_TOKEN_77120".into();
        config.glean.instance = Some("acme".into());
        config.glean.questions_csv = Some("/data/q.csv".into());
        unsafe { std::env::set_var("ASKGLEAN_TEST_TOKEN_77120", "super-secret") };

        let resolved = RunConfig::resolve(
            &config,
            &CliOverrides {
                debug: Some(false),
                ..Default::default()
            },
        )
        .expect("resolve");

        let printed = format!("{resolved:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
