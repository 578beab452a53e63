use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "file-converter-ui";
const SETTINGS_FILE: &str = "settings.json";

/// User preferences, persisted as JSON in the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// FFmpeg executable, a bare name is looked up on PATH
    pub ffmpeg_path: String,
    /// Generic converter executable, looked up on PATH then the working directory
    pub fileconvert_path: String,
    /// Where converted files are written
    pub output_dir: PathBuf,
    /// Backend timeout in seconds, `None` waits forever
    pub timeout_secs: Option<u64>,
    /// Treat a missing generic-backend output as a failure
    pub strict_output: bool,
    /// Offer to open the output once a conversion succeeds
    pub offer_open_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            fileconvert_path: "fileconvert".to_string(),
            output_dir: default_output_dir(),
            timeout_secs: Some(600),
            strict_output: false,
            offer_open_output: true,
        }
    }
}

impl Settings {
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_DIR);
            p.push(SETTINGS_FILE);
            p
        })
    }

    /// Load settings from the config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("No config directory available, using default settings");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Save settings to the config directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("no config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// The user's desktop, then `~/Desktop`, then the working directory.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = Settings {
            ffmpeg_path: "/opt/ffmpeg/bin/ffmpeg".to_string(),
            output_dir: PathBuf::from("/tmp/out"),
            timeout_secs: None,
            strict_output: true,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "strict_output": true }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.strict_output);
        assert_eq!(settings.ffmpeg_path, "ffmpeg");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse"));
    }
}
