use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keyshooter";

/// Where keyshooter keeps its files on this platform.
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// The state dir where the platform has one (Linux), else local data.
    pub fn log_path() -> Option<PathBuf> {
        let dirs = Self::project()?;
        let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
        Some(dir.join(format!("{APP_NAME}.log")))
    }
}
