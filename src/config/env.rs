//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::{
    ENV_COLOR, ENV_CONCURRENCY, ENV_DEADLINE_SECS, ENV_FETCH_TIMEOUT_SECS, ENV_NO_COLOR, ENV_TIMEOUT_MS,
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if it exists.
    ///
    /// Returns whether a file was loaded. Variables already present in the
    /// process environment win over the file.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::validation(format!("Failed to load {}: {}", path.display(), e)))?;

        Ok(true)
    }

    /// All supported environment variables with descriptions and examples
    pub fn supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (ENV_TIMEOUT_MS, "Per-probe timeout in milliseconds (1-60000)", "1000"),
            (ENV_DEADLINE_SECS, "Deadline for all probes in seconds, 0 disables", "120"),
            (ENV_CONCURRENCY, "Maximum concurrent probes, 0 for one per endpoint", "0"),
            (ENV_FETCH_TIMEOUT_SECS, "Timeout for remote config downloads (1-300)", "10"),
            (ENV_COLOR, "Enable colored output", "true"),
            (ENV_NO_COLOR, "Disable colored output when set to any value", "1"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let loaded = EnvManager::load_env_file_from(Path::new("/nonexistent/adnlctl/.env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_env_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ADNLCTL_TEST_ONLY_MARKER=loaded").unwrap();

        let loaded = EnvManager::load_env_file_from(file.path()).unwrap();
        assert!(loaded);
        assert_eq!(std::env::var("ADNLCTL_TEST_ONLY_MARKER").unwrap(), "loaded");
    }

    #[test]
    fn test_env_help_lists_every_variable() {
        let help = EnvManager::display_env_help();
        for (var, _, _) in EnvManager::supported_env_vars() {
            assert!(help.contains(var));
        }
    }
}
