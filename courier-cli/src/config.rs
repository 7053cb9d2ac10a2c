//! Configuration loading for the COURIER CLI.
//!
//! The file is TOML matching [`CourierConfig`]. All fields are required.
//! No defaults.

use std::path::{Path, PathBuf};

use courier_core::{ConfigError, CourierConfig};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "COURIER_CONFIG";

/// Load and validate the configuration from `--config` or `COURIER_CONFIG`.
pub fn load(cli_path: Option<&Path>) -> Result<CourierConfig, ConfigError> {
    let env_path = std::env::var(CONFIG_ENV).ok();
    let path = resolve_path(cli_path, env_path.as_deref())?;
    from_path(&path)
}

/// The explicit path wins over the environment.
pub fn resolve_path(cli_path: Option<&Path>, env_path: Option<&str>) -> Result<PathBuf, ConfigError> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| {
            env_path
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
        })
        .ok_or(ConfigError::MissingConfigPath)
}

pub fn from_path(path: &Path) -> Result<CourierConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    from_toml(&contents)
}

pub fn from_toml(contents: &str) -> Result<CourierConfig, ConfigError> {
    let config: CourierConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"
app_id = "com.example.shop"

[cache]
path = "/var/lib/courier/cache"
map_size_mb = 16

[assets]
resource_root = "/opt/courier/res"
image_timeout_ms = 10000
max_image_bytes = 10485760
"#;

    #[test]
    fn test_parse_valid_config() {
        let config = from_toml(VALID).unwrap();
        assert_eq!(config.app_id, "com.example.shop");
        assert_eq!(config.cache.map_size_mb, 16);
        assert_eq!(config.assets.image_timeout().as_secs(), 10);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let contents = VALID.replace("map_size_mb = 16", "map_size_mb = 16\nttl_secs = 5");
        assert!(matches!(
            from_toml(&contents),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_field_rejected() {
        let contents = VALID.replace("max_image_bytes = 10485760\n", "");
        assert!(matches!(
            from_toml(&contents),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_value_rejected() {
        let contents = VALID.replace("image_timeout_ms = 10000", "image_timeout_ms = 0");
        assert!(matches!(
            from_toml(&contents),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_resolve_path_precedence() {
        let cli = Path::new("/from/cli.toml");
        assert_eq!(
            resolve_path(Some(cli), Some("/from/env.toml")).unwrap(),
            PathBuf::from("/from/cli.toml")
        );
        assert_eq!(
            resolve_path(None, Some("/from/env.toml")).unwrap(),
            PathBuf::from("/from/env.toml")
        );
        assert!(matches!(
            resolve_path(None, Some("  ")),
            Err(ConfigError::MissingConfigPath)
        ));
        assert!(matches!(
            resolve_path(None, None),
            Err(ConfigError::MissingConfigPath)
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courier.toml");
        std::fs::write(&path, VALID).unwrap();
        assert!(from_path(&path).is_ok());
        assert!(matches!(
            from_path(&dir.path().join("missing.toml")),
            Err(ConfigError::Unreadable { .. })
        ));
    }
}
