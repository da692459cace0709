use crate::model::TaskCollection;
use crate::streak::StreakRecord;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROJECT_DIR: &str = ".orbit";
const TASKS_KEY: &str = "tasks";
const STREAK_KEY: &str = "streak";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Project,
    Global,
    Explicit,
}

/// A directory holding one YAML document per record key.
#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub dir: PathBuf,
    pub scope: StoreScope,
}

impl StoreScope {
    pub fn label(&self) -> &'static str {
        match self {
            StoreScope::Project => "project",
            StoreScope::Global => "global",
            StoreScope::Explicit => "custom",
        }
    }
}

impl StoreLocation {
    pub fn explicit(dir: impl Into<PathBuf>) -> Self {
        StoreLocation {
            dir: dir.into(),
            scope: StoreScope::Explicit,
        }
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.yml"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join("orbit.log")
    }
}

pub fn init_project_store() -> Result<StoreLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .orbit directory")?;
    let location = StoreLocation {
        dir,
        scope: StoreScope::Project,
    };
    if !location.record_path(TASKS_KEY).exists() {
        save_tasks(&location, &TaskCollection::new())?;
    }
    Ok(location)
}

pub fn locate_store(start: &Path, override_dir: Option<&Path>) -> Result<StoreLocation> {
    if let Some(dir) = override_dir {
        return Ok(StoreLocation::explicit(dir));
    }
    if let Some(dir) = find_project_store(start) {
        return Ok(StoreLocation {
            dir,
            scope: StoreScope::Project,
        });
    }
    Ok(StoreLocation {
        dir: global_store_dir()?,
        scope: StoreScope::Global,
    })
}

pub fn load_tasks(location: &StoreLocation) -> Result<TaskCollection> {
    let mut tasks: TaskCollection = read_record(location, TASKS_KEY)?.unwrap_or_default();
    let dropped = tasks.prune_out_of_range();
    if dropped > 0 {
        warn!(dropped, "ignoring stored items beyond their task total");
    }
    Ok(tasks)
}

pub fn save_tasks(location: &StoreLocation, tasks: &TaskCollection) -> Result<()> {
    write_record(location, TASKS_KEY, tasks)
}

pub fn load_streak(location: &StoreLocation) -> Result<StreakRecord> {
    Ok(read_record(location, STREAK_KEY)?.unwrap_or_default())
}

pub fn save_streak(location: &StoreLocation, streak: &StreakRecord) -> Result<()> {
    write_record(location, STREAK_KEY, streak)
}

fn read_record<T: DeserializeOwned>(location: &StoreLocation, key: &str) -> Result<Option<T>> {
    let path = location.record_path(key);
    if !path.exists() {
        debug!(key, path = %path.display(), "record missing, using default");
        return Ok(None);
    }
    let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    if data.trim().is_empty() {
        return Ok(None);
    }
    let value =
        serde_yaml::from_str(&data).with_context(|| format!("parsing {} file {:?}", key, path))?;
    debug!(key, path = %path.display(), "loaded record");
    Ok(Some(value))
}

fn write_record<T: Serialize>(location: &StoreLocation, key: &str, value: &T) -> Result<()> {
    fs::create_dir_all(&location.dir).with_context(|| format!("creating {:?}", location.dir))?;
    let path = location.record_path(key);
    let serialized = serde_yaml::to_string(value).with_context(|| format!("serializing {key}"))?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    debug!(key, path = %path.display(), "saved record");
    Ok(())
}

fn find_project_store(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_store_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "orbit").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
