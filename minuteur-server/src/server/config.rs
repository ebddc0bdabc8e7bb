use serde::Deserialize;
use std::{env, fs, path::Path};

pub const DEFAULT_PORT: u16 = 5161;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Notification title and embedded page heading.
    pub app_name: String,
    /// Body of the completion notification.
    pub completion_message: String,
    /// URL opened by the notification's "open app" action. Defaults to the
    /// daemon's own page on the listen port.
    pub app_url: Option<String>,
    /// Desktop notification on expiry. The countdown broadcast is unaffected
    /// when disabled.
    pub notifications_enabled: bool,
    pub dev_cors_origin: Option<String>,
    pub listen_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: minuteur_shared::APP_NAME.to_string(),
            completion_message: minuteur_shared::COMPLETION_BODY.to_string(),
            app_url: None,
            notifications_enabled: true,
            dev_cors_origin: None,
            listen_port: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Yaml(value)
    }
}

impl AppConfig {
    /// Load from `CONFIG_PATH` when set (missing file is then an error);
    /// otherwise from `./config.yaml` when present, else built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("CONFIG_PATH") {
            Ok(path) => Self::load_from_path(path),
            Err(_) => {
                let default = Path::new("config.yaml");
                if default.exists() {
                    Self::load_from_path(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("listen_port: 9000\n").unwrap();
        assert_eq!(cfg.listen_port, Some(9000));
        assert_eq!(cfg.app_name, "Minuteur");
        assert!(cfg.notifications_enabled);
    }
}
