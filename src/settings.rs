use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::decoder::{Symbology, DEFAULT_FPS, DEFAULT_SYMBOLOGIES};
use crate::scanner::{Locale, ScannerOptions};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    pub symbologies: Vec<Symbology>,
    pub fps: u32,
    pub locale: Locale,
    pub chime_enabled: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            symbologies: DEFAULT_SYMBOLOGIES.to_vec(),
            fps: DEFAULT_FPS,
            locale: Locale::default(),
            chime_enabled: true,
        }
    }
}

impl ScannerSettings {
    pub fn scanner_options(&self) -> ScannerOptions {
        ScannerOptions {
            symbologies: self.symbologies.clone(),
            fps: self.fps.max(1),
            locale: self.locale,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    scanner: ScannerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn scanner(&self) -> ScannerSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .scanner
            .clone()
    }

    pub fn update_scanner(&self, settings: ScannerSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.scanner = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
