use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use crate::error::{EditError, Result};
use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::store::FileStore;
use crate::style_map::StyleMap;

const QUALIFIER: &str = "net.richpad";
const ORGANIZATION: &str = "Richpad";
const APPLICATION: &str = "richpad";
const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key the document is persisted under
    pub storage_key: String,
    /// Directory for the file store; the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub styles: StyleMap,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: None,
            styles: StyleMap::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

pub fn settings_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
}

impl Settings {
    /// Load settings from the platform config directory, using defaults when
    /// the file is missing or unreadable
    pub fn load() -> Self {
        settings_file_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Option<Settings> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!("No settings at {}: {err}", path.display());
                return None;
            }
        };
        match toml::from_str::<Settings>(&contents) {
            Ok(settings) => Some(settings),
            Err(err) => {
                warn!("Failed to parse settings file {}: {err}", path.display());
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self).map_err(|err| {
            io::Error::new(ErrorKind::Other, format!("toml serialization error: {err}"))
        })?;

        fs::write(path, toml)
    }

    /// Directory the document store writes to
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .ok_or_else(|| EditError::store("no data directory available"))
    }

    pub fn open_store(&self) -> Result<FileStore> {
        Ok(FileStore::new(self.data_dir()?))
    }
}
