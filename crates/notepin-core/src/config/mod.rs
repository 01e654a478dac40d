//! Application configuration shared by every Notepin front end.
//!
//! All fields carry defaults so a partial (or missing) config file still
//! yields a usable [`AppConfig`]. The map overlay and cloud backup are
//! feature flags on a single application rather than separate builds.

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, non_empty_trimmed};
use crate::{Error, Location, Result};

const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_IMAGE_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_IMAGE_MAX_WIDTH: u32 = 800;
const DEFAULT_JPEG_QUALITY: u8 = 70;
const DEFAULT_AUTOSAVE_SECS: u64 = 30;
pub const DEFAULT_GIST_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_BACKUP_FILE_NAME: &str = "notes-backup.json";

/// Optional application features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Map overlay with one pin per located note
    pub map: bool,
    /// Gist backup/restore
    pub cloud: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            map: true,
            cloud: true,
        }
    }
}

/// Local storage limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Total bytes (keys plus values) the store may hold
    pub quota_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Image attachment limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Largest accepted source file
    pub max_bytes: u64,
    /// Wider images are scaled down to this width
    pub max_width: u32,
    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_IMAGE_MAX_BYTES,
            max_width: DEFAULT_IMAGE_MAX_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Map view defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub default_center: Location,
    pub default_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: Location {
                lat: 37.7749,
                lng: -122.4194,
            },
            default_zoom: 19,
        }
    }
}

/// Gist backup endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    pub api_base_url: String,
    pub file_name: String,
    pub description: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_GIST_API_BASE_URL.to_string(),
            file_name: DEFAULT_BACKUP_FILE_NAME.to_string(),
            description: "Notepin notes backup".to_string(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub features: Features,
    pub storage: StorageSettings,
    pub image: ImageSettings,
    pub map: MapSettings,
    pub cloud: CloudSettings,
    /// Seconds between autosave ticks while a note is being edited
    pub autosave_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            features: Features::default(),
            storage: StorageSettings::default(),
            image: ImageSettings::default(),
            map: MapSettings::default(),
            cloud: CloudSettings::default(),
            autosave_interval_secs: DEFAULT_AUTOSAVE_SECS,
        }
    }
}

impl AppConfig {
    /// Parse a JSON config document, then normalize and validate it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Trim text fields and fall back to defaults for blank ones.
    pub fn normalize(&mut self) {
        let defaults = CloudSettings::default();
        self.cloud.api_base_url = non_empty_trimmed(&self.cloud.api_base_url)
            .map_or(defaults.api_base_url, |url| {
                url.trim_end_matches('/').to_string()
            });
        self.cloud.file_name = non_empty_trimmed(&self.cloud.file_name)
            .unwrap_or(defaults.file_name);
        self.cloud.description = non_empty_trimmed(&self.cloud.description)
            .unwrap_or(defaults.description);
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.storage.quota_bytes == 0 {
            return Err(Error::InvalidInput(
                "storage.quota_bytes must be greater than zero".to_string(),
            ));
        }
        if self.image.max_bytes == 0 || self.image.max_width == 0 {
            return Err(Error::InvalidInput(
                "image limits must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.image.jpeg_quality) {
            return Err(Error::InvalidInput(
                "image.jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        if !is_http_url(&self.cloud.api_base_url) {
            return Err(Error::InvalidInput(
                "cloud.api_base_url must include http:// or https://".to_string(),
            ));
        }
        if self.autosave_interval_secs == 0 {
            return Err(Error::InvalidInput(
                "autosave_interval_secs must be greater than zero".to_string(),
            ));
        }
        Location::new(self.map.default_center.lat, self.map.default_center.lng)?;
        Ok(())
    }
}
