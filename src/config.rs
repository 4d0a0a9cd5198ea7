/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, DATABASE_URL, JWT 署名鍵, トークン有効期限など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::services::auth::jwt::MIN_SIGNING_KEY_BYTES;

// 10 years
const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None only outside production; identities are then kept in memory.
    pub database_url: Option<String>,
    // HS256 signing key, decoded from base64
    pub jwt_secret_key: Vec<u8>,
    pub token_ttl_seconds: i64,
    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing key or database credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.is_some())
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("request_timeout", &self.request_timeout)
            .field("request_body_limit_bytes", &self.request_body_limit_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = lookup("PORT")
            .map(|s| s.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT")))
            .transpose()?
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret_key = lookup("JWT_SECRET_KEY")
            .ok_or(ConfigError::Missing("JWT_SECRET_KEY"))
            .and_then(|raw| {
                STANDARD
                    .decode(raw.trim())
                    .map_err(|_| ConfigError::Invalid("JWT_SECRET_KEY"))
            })?;
        if jwt_secret_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::Invalid("JWT_SECRET_KEY"));
        }

        let token_ttl_seconds = lookup("TOKEN_TTL_SECONDS")
            .map(|s| s.parse::<i64>().map_err(|_| ConfigError::Invalid("TOKEN_TTL_SECONDS")))
            .transpose()?
            .unwrap_or(86_400); // 24 h
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&token_ttl_seconds) {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }

        let request_timeout = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let request_body_limit_bytes = lookup("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            database_url,
            jwt_secret_key,
            token_ttl_seconds,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // base64 of 32 ASCII bytes
    const KEY_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = load(&[("JWT_SECRET_KEY", KEY_B64)]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_secret_key, b"0123456789abcdef0123456789abcdef");
        assert_eq!(config.token_ttl_seconds, 86_400);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.request_body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn signing_key_is_required_and_must_be_strong() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("JWT_SECRET_KEY"))
        ));
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "not base64!")]),
            Err(ConfigError::Invalid("JWT_SECRET_KEY"))
        ));
        // "short" in base64
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "c2hvcnQ=")]),
            Err(ConfigError::Invalid("JWT_SECRET_KEY"))
        ));
    }

    #[test]
    fn production_requires_a_database() {
        let result = load(&[("APP_ENV", "production"), ("JWT_SECRET_KEY", KEY_B64)]);
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));

        let config = load(&[
            ("APP_ENV", "prod"),
            ("JWT_SECRET_KEY", KEY_B64),
            ("DATABASE_URL", "postgres://localhost/auth"),
        ])
        .unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        for ttl in ["0", "-5", "soon", "315360001", "10000000000000"] {
            assert!(matches!(
                load(&[("JWT_SECRET_KEY", KEY_B64), ("TOKEN_TTL_SECONDS", ttl)]),
                Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"))
            ));
        }
    }

    #[test]
    fn ttl_up_to_ten_years_is_accepted() {
        let config = load(&[
            ("JWT_SECRET_KEY", KEY_B64),
            ("TOKEN_TTL_SECONDS", "315360000"),
        ])
        .unwrap();
        assert_eq!(config.token_ttl_seconds, MAX_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn debug_output_hides_key() {
        let config = load(&[("JWT_SECRET_KEY", KEY_B64)]).unwrap();
        assert!(!format!("{config:?}").contains("0123456789abcdef"));
    }
}
