use crate::calendar::CalendarSystem;
use crate::storage::LocalStorage;
use anyhow::Result;
use chrono::NaiveDate;
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Raw day payloads, kept so a day seen once can be shown offline.
#[derive(Debug, Clone)]
pub struct DayCache {
    dir: PathBuf,
}

impl DayCache {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("org", "typikon", "typikon").map(|proj| Self::at(proj.cache_dir().join("days")))
    }

    fn path(&self, calendar: CalendarSystem, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", calendar.as_path(), date.format("%Y-%m-%d")))
    }

    pub fn save(&self, calendar: CalendarSystem, date: NaiveDate, json: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.path(calendar, date);
        LocalStorage::with_lock(&path, || LocalStorage::atomic_write(&path, json))
    }

    pub fn load(&self, calendar: CalendarSystem, date: NaiveDate) -> Result<Option<String>> {
        let path = self.path(calendar, date);
        if !path.exists() {
            return Ok(None);
        }
        let json = LocalStorage::with_lock(&path, || Ok(fs::read_to_string(&path)?))?;
        Ok(Some(json))
    }
}
