// src/roster.rs

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::RosterRecord;

/// Fatal configuration problems: the run aborts before any audit
/// begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read roster file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse roster file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads the roster: a JSON array of team records.
pub fn load_roster(path: &Path) -> Result<Vec<RosterRecord>, ConfigError> {
    let body = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cicd-auditor-{name}-{}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_valid_roster() {
        let path = write_temp(
            "valid",
            r#"[{"team": "A", "members": ["ada", "grace"], "repo": "org/a", "deploy_url": "https://a.test"},
                {"team": "B", "members": [], "repo": "org/b"}]"#,
        );
        let roster = load_roster(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].team, "A");
        assert_eq!(roster[0].deploy_url.as_deref(), Some("https://a.test"));
        assert!(roster[1].deploy_url.is_none());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_roster(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let path = write_temp("invalid", "not json");
        let err = load_roster(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
