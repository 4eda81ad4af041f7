use crate::context::View;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SETTINGS_FILE: &str = "settings.toml";

/// User-tunable behavior, read from a TOML file.  Every key is optional.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Base URL of the optimizer backend
    pub(crate) server: String,
    /// Whether navigating between periods shows a slide marker
    pub(crate) animations: bool,
    /// Whether single-key shortcuts are active
    pub(crate) shortcuts: bool,
    pub(crate) default_view: View,
    /// Choices offered by the configuration panel's semester selector
    pub(crate) semesters: Vec<String>,
    /// First hour drawn in the day & week grids
    pub(crate) first_hour: u8,
    /// Last hour drawn in the day & week grids
    pub(crate) last_hour: u8,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            server: String::from("http://localhost:8080"),
            animations: true,
            shortcuts: true,
            default_view: View::Week,
            semesters: vec![String::from("24S"), String::from("23W")],
            first_hour: 5,
            last_hour: 22,
        }
    }
}

impl Settings {
    /// Load settings from `path` if given, otherwise from the per-user
    /// config directory.  A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub(crate) fn load(path: Option<&Path>) -> Result<Settings, SettingsError> {
        let settings = match path {
            Some(p) => Settings::from_file(p)?,
            None => match default_path() {
                Some(p) if p.exists() => Settings::from_file(&p)?,
                _ => Settings::default(),
            },
        };
        Ok(settings.normalized())
    }

    fn from_file(path: &Path) -> Result<Settings, SettingsError> {
        tracing::debug!(path = %path.display(), "Reading settings");
        let src = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&src).map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    // Keep the hour range drawable
    fn normalized(mut self) -> Settings {
        self.last_hour = self.last_hour.min(23);
        self.first_hour = self.first_hour.min(self.last_hour);
        self
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(env!("CARGO_PKG_NAME")).join(SETTINGS_FILE))
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings from {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings in {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
