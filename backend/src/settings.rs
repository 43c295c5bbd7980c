//! CleanTrack configuration loaded via OrthoConfig.
//!
//! Every key is optional at load time so commands that do not touch a
//! backend can run without it. Scalar defaults live in the defaults layer;
//! accessors report missing required keys as [`SettingsError`].
//!
//! Configuration names the acting user but never their role: that comes
//! from the stored profile (see [`crate::domain::SessionResolver`]).

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_UPLOAD_CONCURRENCY, UserId};
use crate::outbound::cloudinary::{CloudinaryConfig, DEFAULT_CLOUDINARY_API};
use crate::outbound::firestore::FirestoreConfig;

const DEFAULT_STORE: &str = "firestore";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_UPLOAD_PRESET: &str = "cleantrack_uploads";
const DEFAULT_FOLDER: &str = "cleantrack";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Errors raised when settings are missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A key required by the selected backend was not set.
    #[error("missing setting `{key}` (set CLEANTRACK_{env})", env = .key.to_ascii_uppercase())]
    Missing {
        /// Settings key.
        key: &'static str,
    },
    /// A key was set to a value that could not be used.
    #[error("invalid setting `{key}`: {reason}")]
    Invalid {
        /// Settings key.
        key: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
}

/// Where complaint records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Firestore over REST.
    Firestore,
    /// Process-local memory; nothing survives the process.
    Memory,
}

/// Configuration values for the CleanTrack command-line client.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLEANTRACK")]
pub struct CleanTrackSettings {
    /// Record store backend: `firestore` (default) or `memory`.
    #[ortho_config(default = String::from(DEFAULT_STORE))]
    pub store: Option<String>,
    /// Firestore project id.
    pub firestore_project_id: Option<String>,
    /// Firestore web API key.
    pub firestore_api_key: Option<String>,
    /// Firebase ID token for authenticated security rules.
    pub firestore_id_token: Option<String>,
    /// Firestore REST root override.
    pub firestore_base_url: Option<String>,
    /// Cloudinary cloud name.
    pub cloudinary_cloud_name: Option<String>,
    /// Cloudinary unsigned upload preset.
    pub cloudinary_upload_preset: Option<String>,
    /// Cloudinary destination folder.
    pub cloudinary_folder: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: Option<u64>,
    /// Maximum parallel image uploads.
    #[ortho_config(default = DEFAULT_UPLOAD_CONCURRENCY)]
    pub upload_concurrency: Option<usize>,
    /// Acting user id; the profile stored under it decides the role.
    pub user_id: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|error| SettingsError::Invalid {
        key,
        reason: error.to_string(),
    })
}

impl CleanTrackSettings {
    /// Selected record store backend.
    pub fn store_backend(&self) -> Result<StoreBackend, SettingsError> {
        match non_blank(self.store.as_ref()) {
            None | Some(DEFAULT_STORE) => Ok(StoreBackend::Firestore),
            Some("memory") => Ok(StoreBackend::Memory),
            Some(other) => Err(SettingsError::Invalid {
                key: "store",
                reason: format!("expected `firestore` or `memory`, got `{other}`"),
            }),
        }
    }

    /// Timeout applied to every outbound HTTP request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    /// Number of uploads allowed in flight, at least one.
    pub fn upload_concurrency(&self) -> usize {
        self.upload_concurrency
            .unwrap_or(DEFAULT_UPLOAD_CONCURRENCY)
            .max(1)
    }

    /// Firestore adapter configuration.
    pub fn firestore_config(&self) -> Result<FirestoreConfig, SettingsError> {
        let project_id = non_blank(self.firestore_project_id.as_ref()).ok_or(
            SettingsError::Missing {
                key: "firestore_project_id",
            },
        )?;
        let base_url = parse_url(
            "firestore_base_url",
            non_blank(self.firestore_base_url.as_ref()).unwrap_or(DEFAULT_FIRESTORE_BASE_URL),
        )?;
        Ok(FirestoreConfig {
            base_url,
            project_id: project_id.to_owned(),
            api_key: non_blank(self.firestore_api_key.as_ref()).map(str::to_owned),
            id_token: non_blank(self.firestore_id_token.as_ref()).map(str::to_owned),
            timeout: self.http_timeout(),
        })
    }

    /// Cloudinary adapter configuration.
    pub fn cloudinary_config(&self) -> Result<CloudinaryConfig, SettingsError> {
        let cloud_name = non_blank(self.cloudinary_cloud_name.as_ref()).ok_or(
            SettingsError::Missing {
                key: "cloudinary_cloud_name",
            },
        )?;
        Ok(CloudinaryConfig {
            api_base: parse_url("cloudinary_api", DEFAULT_CLOUDINARY_API)?,
            cloud_name: cloud_name.to_owned(),
            upload_preset: non_blank(self.cloudinary_upload_preset.as_ref())
                .unwrap_or(DEFAULT_UPLOAD_PRESET)
                .to_owned(),
            folder: non_blank(self.cloudinary_folder.as_ref())
                .unwrap_or(DEFAULT_FOLDER)
                .to_owned(),
            timeout: self.http_timeout(),
        })
    }

    /// Id of the acting user.
    pub fn user_id(&self) -> Result<UserId, SettingsError> {
        let raw_id =
            non_blank(self.user_id.as_ref()).ok_or(SettingsError::Missing { key: "user_id" })?;
        UserId::new(raw_id).map_err(|error| SettingsError::Invalid {
            key: "user_id",
            reason: error.to_string(),
        })
    }
}
