use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::session::{
    SessionSettings, DEFAULT_STAY, DEFAULT_WORDS_PER_MINUTE, DEFAULT_WPM_WARMUP,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub words_per_minute: u32,
    pub stay_duration_secs: u64,
    pub wpm_warmup_secs: f64,
    pub exact_spawn_interval: bool,
    pub words_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            stay_duration_secs: DEFAULT_STAY.as_secs(),
            wpm_warmup_secs: DEFAULT_WPM_WARMUP.as_secs_f64(),
            exact_spawn_interval: false,
            words_file: None,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        SessionSettings {
            words_per_minute: cfg.words_per_minute,
            stay_duration: Duration::from_secs(cfg.stay_duration_secs),
            wpm_warmup: Duration::try_from_secs_f64(cfg.wpm_warmup_secs)
                .unwrap_or(DEFAULT_WPM_WARMUP),
            exact_spawn_interval: cfg.exact_spawn_interval,
        }
        .normalized()
    }
}

impl Config {
    /// Copies the live settings back, e.g. after the player adjusted them.
    pub fn update_from(&mut self, settings: &SessionSettings) {
        self.words_per_minute = settings.words_per_minute;
        self.stay_duration_secs = settings.stay_duration.as_secs();
        self.wpm_warmup_secs = settings.wpm_warmup.as_secs_f64();
        self.exact_spawn_interval = settings.exact_spawn_interval;
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("keyshooter_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!(
                    "ignoring invalid config {}: {e}",
                    self.path.display()
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
