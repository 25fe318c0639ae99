use crate::core::constants::{LEGACY_3D_ENABLED_KEY, LEGACY_TOOLTIP_SHOWN_KEY};
use crate::data::storage::KeyValueStorage;
use crate::Result;
use serde::{Deserialize, Serialize};

/// 3D rendering preferences, persisted next to the filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceSettings {
    #[serde(rename = "is3DEnabled")]
    pub is_3d_enabled: bool,
    /// Pitch to restore when 3D is switched back on
    pub previous_pitch: f64,
    pub tooltip_shown: bool,
    pub warning_shown: bool,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            is_3d_enabled: true,
            previous_pitch: 45.0,
            tooltip_shown: false,
            warning_shown: false,
        }
    }
}

impl PerformanceSettings {
    /// Reads the settings. Older deployments stored two loose keys; those are
    /// used when the combined key is absent.
    pub fn load(storage: &dyn KeyValueStorage, key: &str) -> Self {
        match storage.get_item(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("resetting malformed performance settings: {}", e);
                Self::default()
            }),
            Ok(None) => Self::load_legacy(storage),
            Err(e) => {
                log::error!("could not read performance settings: {}", e);
                Self::default()
            }
        }
    }

    fn load_legacy(storage: &dyn KeyValueStorage) -> Self {
        let read = |key: &str| storage.get_item(key).ok().flatten();
        Self {
            is_3d_enabled: read(LEGACY_3D_ENABLED_KEY).as_deref() != Some("false"),
            tooltip_shown: read(LEGACY_TOOLTIP_SHOWN_KEY).as_deref() == Some("true"),
            ..Self::default()
        }
    }

    pub fn save(&self, storage: &dyn KeyValueStorage, key: &str) -> Result<()> {
        let payload = serde_json::to_string(self)?;
        storage.set_item(key, &payload)
    }
}
