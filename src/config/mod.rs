use crate::global;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";

pub const ENV_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_PHONE_NUMBER: &str = "TWILIO_PHONE_NUMBER";
pub const ENV_API_BASE_URL: &str = "TWILIO_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Twilio credentials are missing: set TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN (e.g. in a .env file)")]
    MissingCredentials,
    #[error("failed to read settings file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk settings, all optional. Environment variables win over these.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub twilio: TwilioSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub phone_number: Option<String>,
    pub api_base_url: Option<String>,
}

impl SettingsFile {
    /// Reads the settings file if it exists. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {:?}", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }
}

/// Credentials and endpoint for the telephony provider.
///
/// Built once at process start and passed by reference to everything that
/// talks to the provider. Only the credentials are required; a missing
/// source number is left for the provider to reject when the call is placed.
#[derive(Clone)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: Option<String>,
    pub api_base_url: String,
}

impl fmt::Debug for TelephonyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelephonyConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl TelephonyConfig {
    /// Loads `.env`, the optional settings file, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {:?}", path),
            Err(err) if err.not_found() => debug!("No .env file found"),
            Err(err) => debug!("Ignoring unreadable .env file: {}", err),
        }

        let settings = match global::config_file() {
            Ok(path) => SettingsFile::load_from(&path),
            Err(err) => {
                debug!("Skipping settings file: {}", err);
                Ok(SettingsFile::default())
            }
        };

        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    /// Like [`Self::from_sources`], but an unreadable settings file is only
    /// fatal when the environment cannot supply the credentials by itself.
    pub fn resolve<F>(settings: Result<SettingsFile, ConfigError>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match settings {
            Ok(settings) => Self::from_sources(settings.twilio, env),
            Err(file_err) => match Self::from_sources(TwilioSettings::default(), env) {
                Ok(config) => {
                    warn!("Ignoring settings file, environment is used instead: {}", file_err);
                    Ok(config)
                }
                Err(_) => Err(file_err),
            },
        }
    }

    /// Merges file settings with an environment lookup. Empty values count
    /// as absent.
    pub fn from_sources<F>(file: TwilioSettings, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, fallback: Option<String>| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback.filter(|value| !value.trim().is_empty()))
        };

        let account_sid = pick(ENV_ACCOUNT_SID, file.account_sid);
        let auth_token = pick(ENV_AUTH_TOKEN, file.auth_token);
        let (Some(account_sid), Some(auth_token)) = (account_sid, auth_token) else {
            return Err(ConfigError::MissingCredentials);
        };

        let from_number = pick(ENV_PHONE_NUMBER, file.phone_number);
        if from_number.is_none() {
            warn!("TWILIO_PHONE_NUMBER is not set; call creation will be rejected by the provider");
        }

        let api_base_url = pick(ENV_API_BASE_URL, file.api_base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            api_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_only() {
        let config = TelephonyConfig::from_sources(
            TwilioSettings::default(),
            env_of(&[
                (ENV_ACCOUNT_SID, "AC123"),
                (ENV_AUTH_TOKEN, "secret"),
                (ENV_PHONE_NUMBER, "+15005550006"),
            ]),
        )
        .unwrap();

        assert_eq!(config.account_sid, "AC123");
        assert_eq!(config.auth_token, "secret");
        assert_eq!(config.from_number.as_deref(), Some("+15005550006"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = TwilioSettings {
            account_sid: Some("ACfile".to_string()),
            auth_token: Some("file-token".to_string()),
            phone_number: Some("+15005550001".to_string()),
            api_base_url: Some("http://localhost:9000/".to_string()),
        };
        let config =
            TelephonyConfig::from_sources(file, env_of(&[(ENV_AUTH_TOKEN, "env-token")])).unwrap();

        assert_eq!(config.account_sid, "ACfile");
        assert_eq!(config.auth_token, "env-token");
        assert_eq!(config.from_number.as_deref(), Some("+15005550001"));
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_missing_token_is_credentials_error() {
        let err = TelephonyConfig::from_sources(
            TwilioSettings::default(),
            env_of(&[(ENV_ACCOUNT_SID, "AC123"), (ENV_PHONE_NUMBER, "+1")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let err = TelephonyConfig::from_sources(
            TwilioSettings::default(),
            env_of(&[(ENV_ACCOUNT_SID, ""), (ENV_AUTH_TOKEN, "secret")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn test_missing_from_number_is_not_fatal() {
        let config = TelephonyConfig::from_sources(
            TwilioSettings::default(),
            env_of(&[(ENV_ACCOUNT_SID, "AC123"), (ENV_AUTH_TOKEN, "secret")]),
        )
        .unwrap();
        assert_eq!(config.from_number, None);
    }

    fn unparsable_settings() -> Result<SettingsFile, ConfigError> {
        Err(ConfigError::Parse {
            path: PathBuf::from("config.toml"),
            source: toml::from_str::<SettingsFile>("[twilio").unwrap_err(),
        })
    }

    #[test]
    fn test_bad_settings_file_ignored_when_env_has_credentials() {
        let config = TelephonyConfig::resolve(
            unparsable_settings(),
            env_of(&[
                (ENV_ACCOUNT_SID, "AC123"),
                (ENV_AUTH_TOKEN, "secret"),
                (ENV_PHONE_NUMBER, "+15005550006"),
            ]),
        )
        .unwrap();
        assert_eq!(config.account_sid, "AC123");
        assert_eq!(config.from_number.as_deref(), Some("+15005550006"));
    }

    #[test]
    fn test_bad_settings_file_fatal_without_env_credentials() {
        let err = TelephonyConfig::resolve(unparsable_settings(), env_of(&[(ENV_ACCOUNT_SID, "AC123")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelephonyConfig {
            account_sid: "AC123".to_string(),
            auth_token: "super-secret".to_string(),
            from_number: Some("+1".to_string()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_settings_file_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsFile::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(settings.twilio.account_sid.is_none());
    }

    #[test]
    fn test_settings_file_parses_twilio_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[twilio]\naccount_sid = \"ACfile\"\nphone_number = \"+15005550006\"\n",
        )
        .unwrap();

        let settings = SettingsFile::load_from(&path).unwrap();
        assert_eq!(settings.twilio.account_sid.as_deref(), Some("ACfile"));
        assert_eq!(settings.twilio.phone_number.as_deref(), Some("+15005550006"));
        assert!(settings.twilio.auth_token.is_none());
    }

    #[test]
    fn test_settings_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[twilio\naccount_sid = 1").unwrap();

        let err = SettingsFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
