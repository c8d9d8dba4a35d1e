use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::assign::{HardwareKind, Override};
use crate::error::SettingsError;

/// Everything the dashboard persists between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub pco_app_id: String,
    pub pco_secret: String,
    pub service_type_id: String,
    pub service_type_name: String,
    /// Minutes between automatic refreshes
    pub refresh_interval: u64,
    pub cors_proxy: String,

    pub mic_count: u32,
    pub monitor_count: u32,
    pub mic_labels: BTreeMap<u32, String>,
    pub monitor_labels: BTreeMap<u32, String>,

    pub mic_range: (u32, u32),
    pub monitor_range: (u32, u32),
    pub card_width: u32,
    pub grid_columns: u32,

    pub device_hostname: String,
    pub wifi_ssid: String,
    pub wifi_password: Option<String>,
    pub ui_scale: f64,
    pub auto_boot: bool,

    pub person_overrides: Vec<Override>,
    pub show_photos: bool,
    pub show_rf_meters: bool,
    pub show_battery: bool,
    pub show_tech_details: bool,
    pub brightness: u32,
}

fn labels(names: [&str; 8]) -> BTreeMap<u32, String> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| (idx as u32 + 1, name.to_string()))
        .collect()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pco_app_id: String::new(),
            pco_secret: String::new(),
            service_type_id: String::new(),
            service_type_name: String::new(),
            refresh_interval: 5,
            cors_proxy: String::new(),
            mic_count: 8,
            monitor_count: 8,
            mic_labels: labels(["Vocal 1", "Vocal 2", "Vocal 3", "Vocal 4", "Music Dir", "Host", "Speaker", "Wireless GT"]),
            monitor_labels: labels(["Vocal 1", "Vocal 2", "Vocal 3", "Vocal 4", "Acoustic", "Electric", "Keys", "Bass"]),
            mic_range: (1, 8),
            monitor_range: (1, 8),
            card_width: 180,
            grid_columns: 0,
            device_hostname: "church-production-01.local".to_string(),
            wifi_ssid: String::new(),
            wifi_password: None,
            ui_scale: 1.0,
            auto_boot: true,
            person_overrides: Vec::new(),
            show_photos: true,
            show_rf_meters: true,
            show_battery: true,
            show_tech_details: true,
            brightness: 100,
        }
    }
}

impl AppSettings {
    /// Builds settings from a stored object: defaults first, then every
    /// top-level key the stored object carries. A key whose value does not
    /// fit keeps its default; the other stored keys still apply.
    pub fn from_stored(stored: Value) -> Self {
        let defaults = Self::default();
        let Value::Object(stored) = stored else {
            warn!("stored settings are not an object, using defaults");
            return defaults;
        };
        let mut merged = match serde_json::to_value(&defaults) {
            Ok(Value::Object(map)) => map,
            _ => return defaults,
        };

        for (key, value) in stored {
            let previous = merged.insert(key.clone(), value);
            if let Err(err) = serde_json::from_value::<Self>(Value::Object(merged.clone())) {
                warn!(key = %key, error = %err, "stored setting does not fit, keeping default");
                match previous {
                    Some(default) => merged.insert(key, default),
                    None => merged.remove(&key),
                };
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
    }

    pub fn has_credentials(&self) -> bool {
        !self.pco_app_id.trim().is_empty() && !self.pco_secret.trim().is_empty()
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(1) * 60)
    }

    /// Inclusive slot range shown for a hardware kind
    pub fn visible_range(&self, kind: HardwareKind) -> (u32, u32) {
        match kind {
            HardwareKind::Mic => self.mic_range,
            HardwareKind::Monitor => self.monitor_range,
        }
    }

    /// Whether moving from `self` to `next` calls for a fresh plan fetch
    /// rather than re-resolving the plan already held
    pub fn refetch_required(&self, next: &AppSettings) -> bool {
        self.service_type_id != next.service_type_id
            || self.refresh_interval != next.refresh_interval
            || self.pco_app_id != next.pco_app_id
            || self.pco_secret != next.pco_secret
            || self.cors_proxy != next.cors_proxy
            || self.mic_count != next.mic_count
            || self.monitor_count != next.monitor_count
            || self.mic_range != next.mic_range
            || self.monitor_range != next.monitor_range
    }
}

/// Settings persisted as one JSON document on disk
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored settings. A missing or unreadable file is not an
    /// error, the defaults are used instead.
    pub fn load(&self) -> AppSettings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no stored settings");
                return AppSettings::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => AppSettings::from_stored(value),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding unparseable settings");
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
