use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::{AudioPlayer, BellPlayer, CommandPlayer, SilentPlayer};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SoundBackend {
    /// external player process (falls back to the bell without a sound file)
    Command,
    /// terminal bell
    Bell,
    /// no sound at all
    Silent,
}

pub fn default_player() -> String {
    if cfg!(target_os = "macos") {
        "afplay".to_string()
    } else {
        "paplay".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub shuffle_interval_ms: u64,
    pub sound: SoundBackend,
    pub player: String,
    pub sound_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shuffle_interval_ms: 2000,
            sound: SoundBackend::Command,
            player: default_player(),
            sound_path: None,
        }
    }
}

impl Config {
    pub fn shuffle_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shuffle_interval_ms)
    }

    pub fn build_player(&self) -> Box<dyn AudioPlayer> {
        match (self.sound, &self.sound_path) {
            (SoundBackend::Command, Some(path)) => {
                Box::new(CommandPlayer::new(self.player.clone(), path.clone()))
            }
            (SoundBackend::Command, None) => {
                tracing::info!("no sound file configured, using the terminal bell");
                Box::new(BellPlayer::stdout())
            }
            (SoundBackend::Bell, _) => Box::new(BellPlayer::stdout()),
            (SoundBackend::Silent, _) => Box::new(SilentPlayer::default()),
        }
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
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "alarmhunt") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("alarmhunt_config.json")
        };
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
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
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
