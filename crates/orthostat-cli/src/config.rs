use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use orthostat_export::capture::CaptureOptions;
use orthostat_export::styles::{ClinicInfo, ReportOptions};
use orthostat_session::config::ProtocolConfig;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthostatConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    pub config_version: u32,
    pub protocol: ProtocolConfig,
    pub clinic: ClinicInfo,
    pub report: ReportOptions,
    pub capture: CaptureOptions,
    /// Where exports are written. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for OrthostatConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            protocol: ProtocolConfig::default(),
            clinic: ClinicInfo::default(),
            report: ReportOptions::default(),
            capture: CaptureOptions::default(),
            output_dir: None,
        }
    }
}

impl OrthostatConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("orthostat"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the user's config, falling back to defaults when none was saved.
pub fn load_config() -> eyre::Result<OrthostatConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok(OrthostatConfig::default());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> eyre::Result<OrthostatConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: OrthostatConfig = serde_json::from_value(migrated)?;
    config
        .protocol
        .validate()
        .map_err(|e| eyre::eyre!("config at {}: {e}", path.display()))?;
    config
        .capture
        .validate()
        .map_err(|e| eyre::eyre!("config at {}: {e}", path.display()))?;

    tracing::info!(path = %path.display(), version = on_disk_version, "config loaded");
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update orthostat."
        ));
    }

    // v0 → v1: flat clinic_name/clinic_address/clinic_phone move under `clinic`.
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;

        let mut clinic = serde_json::Map::new();
        for (old, new) in [
            ("clinic_name", "name"),
            ("clinic_address", "address"),
            ("clinic_phone", "phone"),
        ] {
            if let Some(value) = obj.remove(old) {
                clinic.insert(new.to_string(), value);
            }
        }
        if !clinic.is_empty() {
            obj.entry("clinic")
                .or_insert(serde_json::Value::Object(clinic));
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (grouped clinic fields)");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

pub fn save_config(config: &OrthostatConfig) -> eyre::Result<()> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &OrthostatConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Clinic details stay private to the user on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
