use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "recall";

/// Centralized application directory resolution
#[derive(Debug, Clone)]
pub struct AppDirs {
    data_dir: PathBuf,
}

impl AppDirs {
    /// `$HOME/.local/state/recall`, or the platform data dir without a HOME
    pub fn resolve() -> Self {
        let data_dir = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("state").join(APP_NAME)
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            proj_dirs.data_local_dir().to_path_buf()
        } else {
            PathBuf::from(".").join(APP_NAME)
        };
        Self { data_dir }
    }

    pub fn with_data_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            data_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("sessions.db")
    }

    /// Per-session CSV exports
    pub fn csv_dir(&self) -> PathBuf {
        self.data_dir.join("data")
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("recall_config.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_data_dir() {
        let dirs = AppDirs::with_data_dir("/tmp/recall-test");
        assert_eq!(dirs.db_path(), PathBuf::from("/tmp/recall-test/sessions.db"));
        assert_eq!(dirs.csv_dir(), PathBuf::from("/tmp/recall-test/data"));
    }
}
