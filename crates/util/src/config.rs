//! Discovery of the Latch CLI configuration directory.
//!
//! The Latch CLI keeps the logged-in user's token and the active workspace in
//! plain files under `~/.latch`. The directory can be relocated with
//! [`LATCH_CONFIG_DIR_ENV`], which is mostly useful in tests and CI.

use std::env;
use std::path::PathBuf;

use dirs_next::home_dir;

/// Environment variable allowing callers to override the `~/.latch` directory.
pub const LATCH_CONFIG_DIR_ENV: &str = "LATCH_CONFIG_DIR";

/// File holding the logged-in user's API token.
pub const TOKEN_FILE_NAME: &str = "token";

/// File holding the active workspace.
pub const WORKSPACE_FILE_NAME: &str = "workspace";

/// Get the Latch configuration directory.
pub fn latch_config_dir() -> PathBuf {
    if let Ok(path) = env::var(LATCH_CONFIG_DIR_ENV)
        && !path.trim().is_empty()
    {
        return expand_home(path.trim());
    }

    home().join(".latch")
}

fn home() -> PathBuf {
    home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve `~` and `~/..` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home(),
        Some(rest) if rest.starts_with(['/', '\\']) => home().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

pub fn token_path() -> PathBuf {
    latch_config_dir().join(TOKEN_FILE_NAME)
}

pub fn workspace_path() -> PathBuf {
    latch_config_dir().join(WORKSPACE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_honors_env_override() {
        temp_env::with_var(LATCH_CONFIG_DIR_ENV, Some("/opt/latch-config"), || {
            assert_eq!(latch_config_dir(), PathBuf::from("/opt/latch-config"));
            assert_eq!(token_path(), PathBuf::from("/opt/latch-config/token"));
            assert_eq!(workspace_path(), PathBuf::from("/opt/latch-config/workspace"));
        });
    }

    #[test]
    fn override_expands_home_prefix() {
        temp_env::with_var(LATCH_CONFIG_DIR_ENV, Some(" ~/ci/latch "), || {
            assert_eq!(latch_config_dir(), home().join("ci/latch"));
        });
        temp_env::with_var(LATCH_CONFIG_DIR_ENV, Some("~"), || {
            assert_eq!(latch_config_dir(), home());
        });
    }

    #[test]
    fn blank_override_falls_back_to_home() {
        temp_env::with_var(LATCH_CONFIG_DIR_ENV, Some("   "), || {
            assert!(latch_config_dir().ends_with(".latch"));
        });
    }
}
