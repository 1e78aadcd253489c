//! Runtime configuration for the `repertoire` binary.
//!
//! Every value has a default and can be overridden with an environment
//! variable:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `REPERTOIRE_DATA_DIR` | platform data dir, else `./data` |
//! | `REPERTOIRE_EXPLORER_URL` | `https://explorer.lichess.ovh` |
//! | `REPERTOIRE_EXPLORER_TIMEOUT_SECS` | `10` |
//! | `REPERTOIRE_EXPLORER_SPEEDS` | `rapid` |
//! | `REPERTOIRE_LOG_DIR` | unset (stderr only) |

use std::path::PathBuf;
use std::time::Duration;

use repertoire::explorer::{DEFAULT_EXPLORER_URL, DEFAULT_FETCH_TIMEOUT};

const DEV_DATA_DIR: &str = "./data";

const DB_FILE_NAME: &str = "repertoire.db";

/// Get the directory holding the database.
///
/// Priority:
/// 1. `REPERTOIRE_DATA_DIR` env variable if set
/// 2. the platform data directory (e.g. `~/.local/share/repertoire`)
/// 3. `./data` as fallback
pub fn get_data_dir() -> PathBuf {
    data_dir_from(std::env::var("REPERTOIRE_DATA_DIR").ok())
}

fn data_dir_from(env: Option<String>) -> PathBuf {
    if let Some(dir) = env.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "repertoire") {
        return dirs.data_dir().to_path_buf();
    }

    PathBuf::from(DEV_DATA_DIR)
}

pub fn get_database_path() -> PathBuf {
    get_data_dir().join(DB_FILE_NAME)
}

/// Base URL of the opening explorer.
pub fn get_explorer_url() -> String {
    std::env::var("REPERTOIRE_EXPLORER_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string())
}

/// Time budget for one explorer request. Unparseable values fall back to the default.
pub fn get_explorer_timeout() -> Duration {
    timeout_from(std::env::var("REPERTOIRE_EXPLORER_TIMEOUT_SECS").ok())
}

fn timeout_from(env: Option<String>) -> Duration {
    env.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT)
}

/// Time controls to draw statistics from, comma separated.
pub fn get_explorer_speeds() -> Vec<String> {
    speeds_from(std::env::var("REPERTOIRE_EXPLORER_SPEEDS").ok())
}

fn speeds_from(env: Option<String>) -> Vec<String> {
    let speeds: Vec<String> = env
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if speeds.is_empty() {
        repertoire::explorer::DEFAULT_SPEEDS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        speeds
    }
}

/// Directory for daily rolling log files, if file logging is wanted.
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var("REPERTOIRE_LOG_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir();
        match std::env::var("REPERTOIRE_DATA_DIR") {
            Ok(val) if !val.trim().is_empty() => assert_eq!(dir, PathBuf::from(val)),
            _ => assert!(!dir.as_os_str().is_empty()),
        }
    }

    #[test]
    fn test_data_dir_env_wins() {
        assert_eq!(
            data_dir_from(Some("/tmp/reps".to_string())),
            PathBuf::from("/tmp/reps")
        );
        assert_ne!(data_dir_from(Some("  ".to_string())), PathBuf::from("  "));
    }

    #[test]
    fn test_database_path_file_name() {
        assert!(get_database_path().ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(timeout_from(Some("3".into())), Duration::from_secs(3));
        assert_eq!(timeout_from(Some("soon".into())), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(timeout_from(Some("0".into())), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(timeout_from(None), DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_speeds_parsing() {
        assert_eq!(speeds_from(Some("blitz, rapid,".into())), vec!["blitz", "rapid"]);
        assert_eq!(speeds_from(Some(" , ".into())), vec!["rapid"]);
        assert_eq!(speeds_from(None), vec!["rapid"]);
    }

    #[test]
    fn test_get_explorer_url() {
        let url = get_explorer_url();
        match std::env::var("REPERTOIRE_EXPLORER_URL") {
            Ok(val) if !val.trim().is_empty() => assert_eq!(url, val),
            _ => assert_eq!(url, DEFAULT_EXPLORER_URL),
        }
    }
}
