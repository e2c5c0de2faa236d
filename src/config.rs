//! Application paths and designer settings.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entities::keys::{LOG_FILE, SETTINGS_FILE, STORE_FILE};
use crate::entities::{PlacementConfig, SceneConfig, TransformLimits};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "DRAPE_CONFIG_DIR";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (DRAPE_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));

        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. DRAPE_CONFIG_DIR environment variable
/// 3. Local folder IF any drape files exist (drape.json, drape_store.json, drape.log)
/// 4. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/drape/{name}
/// - macOS: ~/Library/Application Support/drape/{name}
/// - Windows: %APPDATA%\drape\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_dir(config, dirs_next::config_dir).join(name)
}

/// Get path to a data file (color store, logs)
///
/// Same priority as [`config_file`], falling back to the platform data directory.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_dir(config, dirs_next::data_dir).join(name)
}

/// Ensure that configuration and data directories exist
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_dir(config, dirs_next::config_dir);
    let data_dir = get_dir(config, dirs_next::data_dir);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Check if any drape files exist in the given directory
fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, STORE_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn get_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    // Priority 1: Custom directory from CLI or ENV
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    // Priority 2: Local folder IF drape files exist there
    if let Ok(current_dir) = std::env::current_dir()
        && has_local_files(&current_dir)
    {
        return current_dir;
    }

    // Priority 3: Platform-specific directory
    if let Some(dir) = platform() {
        return dir.join("drape");
    }

    PathBuf::from(".")
}

/// User-editable designer settings (`drape.json`).
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerSettings {
    /// Mapping constants (divisors, repeat floor)
    pub placement: PlacementConfig,
    /// Scale/rotation ranges and crop geometry
    pub limits: TransformLimits,
    /// Scene presets applied at startup
    pub scene: SceneConfig,
}

impl DesignerSettings {
    /// Load settings; a missing file gives defaults, a broken one logs a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{:#}; using default settings", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings.sanitized())
    }

    /// Repair values that would break clamping or the mapping.
    pub fn sanitized(self) -> Self {
        let limits = self.limits.sanitized();
        if limits != self.limits {
            warn!("Settings: transform limits out of order or invalid, repaired to {:?}", limits);
        }
        Self {
            placement: self.placement.sanitized(),
            limits,
            scene: self.scene,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write settings: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FabricPreset, RotationRange};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("drape-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config_file("drape.json", &config), PathBuf::from("/custom/drape.json"));
        assert_eq!(data_file("drape.log", &config), PathBuf::from("/custom/drape.log"));
    }

    #[test]
    fn test_cli_dir_wins() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_settings_round_trip_file() {
        let dir = temp_dir();
        let path = dir.join(SETTINGS_FILE);
        let mut settings = DesignerSettings::default();
        settings.placement.min_repeat = 0.1;
        settings.limits.rotation = RotationRange::Free;
        settings.scene.fabric = FabricPreset::Cotton;
        settings.save(&path).unwrap();

        assert_eq!(DesignerSettings::load(&path), settings);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "placement": { "scale_divisor": 50.0 } }"#).unwrap();

        let settings = DesignerSettings::load(&path);
        assert_eq!(settings.placement.scale_divisor, 50.0);
        assert_eq!(settings.placement.position_divisor, 100.0);
        assert_eq!(settings.limits, TransformLimits::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_inverted_limits_in_file_are_repaired() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(
            &path,
            r#"{ "limits": { "scale": { "min": 300.0, "max": 20.0 },
                             "rotation": { "kind": "clamped", "min": 180.0, "max": -180.0 } } }"#,
        )
        .unwrap();

        let settings = DesignerSettings::load(&path);
        assert_eq!(settings.limits.scale.min, 20.0);
        assert_eq!(settings.limits.scale.max, 300.0);
        assert_eq!(settings.limits.rotation, RotationRange::Clamped { min: -180.0, max: 180.0 });

        // startup path: building the design clamps every region default
        let design = crate::entities::Design::new(crate::entities::RegionRegistry::garment(), settings.limits);
        assert_eq!(design.transform(crate::entities::Region::Front).scale, 100.0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_broken_or_missing_settings_fall_back() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        assert_eq!(DesignerSettings::load(&path), DesignerSettings::default());
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(DesignerSettings::load(&path), DesignerSettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
