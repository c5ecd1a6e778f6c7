use crate::calendar::CalendarSystem;
use crate::storage::LocalStorage;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CALENDAR_API: &str = "https://orthocal.info/api";
pub const DEFAULT_BIBLE_API: &str = "https://bible-api.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HymnConfig {
    /// Directory scanned for audio files. Defaults to `<data dir>/hymns`.
    pub dir: Option<PathBuf>,
    /// External player; the track path is appended to `player_args`.
    pub player: String,
    /// `{volume}` is replaced with the current volume in percent.
    pub player_args: Vec<String>,
    pub volume: f32,
}

impl Default for HymnConfig {
    fn default() -> Self {
        Self {
            dir: None,
            player: "mpv".to_string(),
            player_args: vec![
                "--no-video".to_string(),
                "--really-quiet".to_string(),
                "--volume={volume}".to_string(),
            ],
            volume: 0.2,
        }
    }
}

impl HymnConfig {
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(|| {
            ProjectDirs::from("org", "typikon", "typikon").map(|p| p.data_dir().join("hymns"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarSystem,
    pub calendar_api_url: String,
    pub bible_api_url: String,
    pub translation: String,
    pub allow_insecure_certs: bool,
    pub offline_cache: bool,
    pub prefetch_concurrency: usize,
    pub hymns: HymnConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: CalendarSystem::Julian,
            calendar_api_url: DEFAULT_CALENDAR_API.to_string(),
            bible_api_url: DEFAULT_BIBLE_API.to_string(),
            translation: "kjv".to_string(),
            allow_insecure_certs: false,
            offline_cache: true,
            prefetch_concurrency: 4,
            hymns: HymnConfig::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "typikon", "typikon").map(|p| p.config_dir().join("config.toml"))
    }

    /// Loads the default config file, or the defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        LocalStorage::atomic_write(path, toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.calendar, CalendarSystem::Julian);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "calendar = \"gregorian\"\ntranslation = \"web\"\n[hymns]\nvolume = 0.5\n",
        )
        .unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.calendar, CalendarSystem::Gregorian);
        assert_eq!(cfg.translation, "web");
        assert_eq!(cfg.hymns.volume, 0.5);
        assert_eq!(cfg.hymns.player, "mpv");
        assert_eq!(cfg.calendar_api_url, DEFAULT_CALENDAR_API);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "calendar = \"byzantine\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut cfg = Config::default();
        cfg.offline_cache = false;
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}
