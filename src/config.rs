//! Configuration for eloquent.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ELOQUENT_HOME)
//! 2. Config file (.eloquent/config.yaml)
//! 3. Defaults (~/.eloquent)
//!
//! Config file discovery:
//! - Searches current directory and parents for .eloquent/config.yaml
//! - A relative `paths.home` is resolved against the .eloquent/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::card::DEFAULT_HIGHLIGHT_COLOR;
use crate::core::SafetyLimits;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".eloquent";
const CONFIG_FILE: &str = "config.yaml";
const HOME_ENV: &str = "ELOQUENT_HOME";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cutting: Option<CuttingConfig>,
    #[serde(default)]
    pub safety: Option<SafetyConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .eloquent/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuttingConfig {
    /// Initials appended to citations (e.g. "shaan")
    pub cutter_initials: Option<String>,
    /// Highlight background color for HTML export
    pub highlight_color: Option<String>,
    /// Fabric pattern to run; unset sends the prompt as-is
    pub pattern: Option<String>,
    /// Fabric binary path
    pub fabric_binary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SafetyConfig {
    pub timeout_seconds: Option<u64>,
    pub max_input_size_bytes: Option<u64>,
    pub max_output_size_bytes: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to eloquent home (history, state)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Card cutting settings
    pub cutting: CuttingSettings,
    /// Safety settings
    pub safety: SafetyLimits,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuttingSettings {
    pub cutter_initials: Option<String>,
    pub highlight_color: String,
    pub pattern: Option<String>,
    pub fabric_binary: Option<String>,
}

impl Default for CuttingSettings {
    fn default() -> Self {
        Self {
            cutter_initials: None,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            pattern: None,
            fabric_binary: None,
        }
    }
}

impl CuttingSettings {
    fn from_config(config: Option<&CuttingConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };

        Self {
            cutter_initials: config.cutter_initials.clone(),
            highlight_color: config
                .highlight_color
                .clone()
                .unwrap_or(defaults.highlight_color),
            pattern: config.pattern.clone(),
            fabric_binary: config.fabric_binary.clone(),
        }
    }
}

fn safety_from_config(config: Option<&SafetyConfig>) -> SafetyLimits {
    let defaults = SafetyLimits::default();
    let Some(config) = config else {
        return defaults;
    };

    SafetyLimits {
        timeout_seconds: config.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        max_input_bytes: config
            .max_input_size_bytes
            .unwrap_or(defaults.max_input_bytes),
        max_output_bytes: config
            .max_output_size_bytes
            .unwrap_or(defaults.max_output_bytes),
        ..defaults
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Build resolved configuration from an optional config file
fn resolve(config_path: Option<PathBuf>, default_home: PathBuf) -> Result<ResolvedConfig> {
    let env_home = std::env::var(HOME_ENV).ok().map(PathBuf::from);

    let Some(path) = config_path else {
        return Ok(ResolvedConfig {
            home: env_home.unwrap_or(default_home),
            config_file: None,
            cutting: CuttingSettings::default(),
            safety: SafetyLimits::default(),
        });
    };

    let config = load_config_file(&path)?;
    let config_dir = path.parent().unwrap_or(Path::new("."));

    let home = match (env_home, &config.paths.home) {
        (Some(home), _) => home,
        (None, Some(home_path)) => resolve_path(config_dir, home_path),
        (None, None) => default_home,
    };

    Ok(ResolvedConfig {
        home,
        cutting: CuttingSettings::from_config(config.cutting.as_ref()),
        safety: safety_from_config(config.safety.as_ref()),
        config_file: Some(path),
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    resolve(find_config_file(), default_home)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the card history path ($ELOQUENT_HOME/history.jsonl)
pub fn history_path() -> Result<PathBuf> {
    Ok(config()?.home.join("history.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        path
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r##"
version: "1.0"
paths:
  home: ./state
cutting:
  cutter_initials: shaan
  highlight_color: "#FFFF00"
safety:
  timeout_seconds: 60
"##,
        );

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./state".to_string()));
        let cutting = config.cutting.unwrap();
        assert_eq!(cutting.cutter_initials, Some("shaan".to_string()));
        assert_eq!(cutting.highlight_color, Some("#FFFF00".to_string()));
        assert_eq!(cutting.pattern, None);
        assert_eq!(config.safety.unwrap().timeout_seconds, Some(60));
    }

    #[test]
    fn test_resolve_from_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
cutting:
  cutter_initials: shaan
safety:
  timeout_seconds: 60
  max_input_size_bytes: 2048
"#,
        );

        let resolved = resolve(Some(path.clone()), PathBuf::from("/default/.eloquent")).unwrap();
        assert_eq!(resolved.config_file, Some(path));
        assert_eq!(resolved.cutting.cutter_initials, Some("shaan".to_string()));
        assert_eq!(resolved.cutting.highlight_color, DEFAULT_HIGHLIGHT_COLOR);
        assert_eq!(resolved.safety.timeout_seconds, 60);
        assert_eq!(resolved.safety.max_input_bytes, 2048);
        assert_eq!(
            resolved.safety.max_output_bytes,
            SafetyLimits::default().max_output_bytes
        );
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let resolved = resolve(None, PathBuf::from("/default/.eloquent")).unwrap();
        assert!(resolved.config_file.is_none());
        assert_eq!(resolved.cutting, CuttingSettings::default());
        assert_eq!(resolved.safety.timeout_seconds, 300);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "version: [unterminated");
        assert!(resolve(Some(path), PathBuf::from("/tmp")).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.eloquent");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            resolve_path(&base, "./missing-subdir"),
            PathBuf::from("/home/user/project/.eloquent/./missing-subdir")
        );
    }
}
