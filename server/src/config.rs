use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read {key} from {path}: {source}")]
    Secret {
        key: &'static str,
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub bot_api_key: Option<String>,
    pub store_timeout: Duration,
    pub view_refresh_secs: u32,
    pub discord_invite: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_timeout_ms: u64 = try_load(&lookup, "STORE_TIMEOUT_MS", "5000")?;
        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "3001")?,
            database_path: try_load(&lookup, "DATABASE_PATH", "neontiers.db")?,
            bot_api_key: load_api_key(&lookup)?,
            store_timeout: Duration::from_millis(store_timeout_ms),
            view_refresh_secs: try_load(&lookup, "VIEW_REFRESH_SECS", "10")?,
            discord_invite: non_empty(lookup("DISCORD_INVITE")),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = non_empty(lookup(key)).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

/// `BOT_API_KEY` wins over `BOT_API_KEY_FILE`. Neither set leaves ingest closed.
fn load_api_key<F>(lookup: &F) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = non_empty(lookup("BOT_API_KEY")) {
        return Ok(Some(key));
    }
    if let Some(path) = non_empty(lookup("BOT_API_KEY_FILE")) {
        let secret = read_to_string(&path).map_err(|source| ConfigError::Secret {
            key: "BOT_API_KEY_FILE",
            path: path.clone(),
            source,
        })?;
        return Ok(non_empty(Some(secret)));
    }
    warn!("BOT_API_KEY not set, all test submissions will be rejected");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_path, "neontiers.db");
        assert_eq!(config.bot_api_key, None);
        assert_eq!(config.store_timeout, Duration::from_millis(5000));
        assert_eq!(config.view_refresh_secs, 10);
        assert_eq!(config.discord_invite, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("BOT_API_KEY", " s3cret "),
            ("STORE_TIMEOUT_MS", "250"),
            ("DISCORD_INVITE", "https://discord.gg/example"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bot_api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.discord_invite.as_deref(), Some("https://discord.gg/example"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup(&[("BOT_API_KEY", "   ")])).unwrap();
        assert_eq!(config.bot_api_key, None);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_missing_secret_file_is_rejected() {
        let err =
            Config::from_lookup(lookup(&[("BOT_API_KEY_FILE", "/nonexistent/secret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Secret { .. }));
    }
}
