use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "attrform";
/// Persisted app state (document, settings, panel layout).
pub const STATE_FILE: &str = "attrform.json";
/// Default log file for `--log` without a value.
pub const LOG_FILE: &str = "attrform.log";
/// Environment override for the config directory.
pub const CONFIG_DIR_ENV: &str = "ATTRFORM_CONFIG_DIR";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (ATTRFORM_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));

        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. ATTRFORM_CONFIG_DIR environment variable
/// 3. Local folder IF any config files exist (attrform.json, attrform.log)
/// 4. Platform-specific config directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.config/attrform/{name}
/// - macOS: ~/Library/Application Support/attrform/{name}
/// - Windows: %APPDATA%\attrform\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Get path to a data file (logs)
///
/// Same priority as [`config_file`], falling back to the platform data
/// directory (`~/.local/share/attrform` on Linux).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Ensure that configuration and data directories exist
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }

    // Only create data_dir if it's different from config_dir
    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

/// Check if any config files exist in the given directory
fn has_local_config_files(dir: &Path) -> bool {
    [STATE_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

/// Custom dir, else `local` if it holds our files, else the platform dir.
fn resolve_dir(config: &PathConfig, local: Option<PathBuf>, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Some(local) = local.filter(|dir| has_local_config_files(dir)) {
        return local;
    }

    platform
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, std::env::current_dir().ok(), dirs_next::config_dir())
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, std::env::current_dir().ok(), dirs_next::data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };

        assert_eq!(config_file("test.json", &config), PathBuf::from("/custom/test.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/attrform.log"));
    }

    #[test]
    fn test_cli_dir_beats_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_platform_dir_used_without_local_files() {
        let temp = tempfile::tempdir().unwrap();
        let config = PathConfig::default();

        let dir = resolve_dir(
            &config,
            Some(temp.path().to_path_buf()),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(dir, PathBuf::from("/platform/attrform"));
    }

    #[test]
    fn test_local_files_priority() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(STATE_FILE), "{}").unwrap();
        let config = PathConfig::default();

        let dir = resolve_dir(
            &config,
            Some(temp.path().to_path_buf()),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(dir, temp.path());
    }

    #[test]
    fn test_fallback_to_current_dir() {
        let dir = resolve_dir(&PathConfig::default(), None, None);
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn test_ensure_dirs_creates_custom_dir() {
        let temp = tempfile::tempdir().unwrap();
        let custom = temp.path().join("nested").join("cfg");
        let config = PathConfig {
            config_dir: Some(custom.clone()),
        };

        ensure_dirs(&config).unwrap();
        assert!(custom.is_dir());
    }
}
