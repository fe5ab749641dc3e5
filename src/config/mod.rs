//! Configuration module for the content store.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Hex SHA-256 digest of the bundled backoffice password.
pub const DEFAULT_ADMIN_DIGEST: &str =
    "e5083db09ff0d1f0ddf63741b04cfec424c966e09fc40a67625c56cacad63974";

pub const DEFAULT_AUTOSAVE_MS: u64 = 1000;
pub const DEFAULT_HISTORY_MS: u64 = 1500;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Seed file replacing the bundled dataset
    pub seed_path: Option<PathBuf>,
    /// Hex SHA-256 digest of the backoffice password
    pub admin_digest: String,
    /// Editor timing and history depth
    pub editor: EditorConfig,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Timers and limits of an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Delay between the last mutation and the autosave write
    pub autosave_delay: Duration,
    /// Window in which keystroke edits coalesce into one history entry
    pub history_delay: Duration,
    /// Maximum number of snapshots kept
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
            history_delay: Duration::from_millis(DEFAULT_HISTORY_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("RUIDOS_DB_PATH")
            .unwrap_or_else(|_| "./data/ruidos.sqlite".to_string())
            .into();

        let seed_path = env::var("RUIDOS_SEED_PATH").ok().map(PathBuf::from);

        let admin_digest =
            env::var("RUIDOS_ADMIN_DIGEST").unwrap_or_else(|_| DEFAULT_ADMIN_DIGEST.to_string());

        let editor = EditorConfig {
            autosave_delay: Duration::from_millis(parse_var(
                "RUIDOS_AUTOSAVE_MS",
                DEFAULT_AUTOSAVE_MS,
            )),
            history_delay: Duration::from_millis(parse_var("RUIDOS_HISTORY_MS", DEFAULT_HISTORY_MS)),
            history_limit: parse_var("RUIDOS_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT),
        };

        let log_level = env::var("RUIDOS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            seed_path,
            admin_digest,
            editor,
            log_level,
        }
    }
}

/// Read a numeric variable, keeping the default when it is missing or malformed.
fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // Clear any existing env vars
        env::remove_var("RUIDOS_DB_PATH");
        env::remove_var("RUIDOS_SEED_PATH");
        env::remove_var("RUIDOS_ADMIN_DIGEST");
        env::remove_var("RUIDOS_AUTOSAVE_MS");
        env::remove_var("RUIDOS_HISTORY_MS");
        env::remove_var("RUIDOS_HISTORY_LIMIT");
        env::remove_var("RUIDOS_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/ruidos.sqlite"));
        assert!(config.seed_path.is_none());
        assert_eq!(config.admin_digest, DEFAULT_ADMIN_DIGEST);
        assert_eq!(config.editor, EditorConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_editor_overrides_from_env() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("RUIDOS_AUTOSAVE_MS", "250");
        env::set_var("RUIDOS_HISTORY_MS", "not-a-number");
        env::set_var("RUIDOS_HISTORY_LIMIT", "20");

        let editor = Config::from_env().editor;

        env::remove_var("RUIDOS_AUTOSAVE_MS");
        env::remove_var("RUIDOS_HISTORY_MS");
        env::remove_var("RUIDOS_HISTORY_LIMIT");

        assert_eq!(editor.autosave_delay, Duration::from_millis(250));
        assert_eq!(editor.history_delay, Duration::from_millis(DEFAULT_HISTORY_MS));
        assert_eq!(editor.history_limit, 20);
    }

    #[test]
    fn test_history_window_outlasts_autosave() {
        let editor = EditorConfig::default();
        assert!(editor.history_delay > editor.autosave_delay);
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("RUIDOS_TEST_PARSE_VAR", "soon");
        assert_eq!(parse_var("RUIDOS_TEST_PARSE_VAR", 42u64), 42);
        env::set_var("RUIDOS_TEST_PARSE_VAR", " 7 ");
        assert_eq!(parse_var("RUIDOS_TEST_PARSE_VAR", 42u64), 7);
        env::remove_var("RUIDOS_TEST_PARSE_VAR");
    }
}
