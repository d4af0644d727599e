use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::api::policy::TimePolicy;
use crate::auth::Credentials;
use crate::error::Error;

pub const SECRET_KEY_VAR: &str = "SUMSUB_SECRET_KEY";
pub const APP_TOKEN_VAR: &str = "SUMSUB_APP_TOKEN";
pub const BASE_URL_VAR: &str = "SUMSUB_BASE_URL";
pub const TIMEOUT_SECS_VAR: &str = "SUMSUB_TIMEOUT_SECS";

/// Raw credential values typically read from app-level settings.
#[derive(Clone, Debug)]
pub struct RawConfig {
    pub base_url: String,
    pub app_token: SecretString,
    pub secret_key: SecretString,
}

/// Client configuration. Built once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: Url,
    pub credentials: Credentials,
    pub time: TimePolicy,
    pub timeout: Option<Duration>,
}

impl Config {
    #[must_use]
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            time: TimePolicy::default(),
            timeout: None,
        }
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let base_url = Url::parse(&raw.base_url)
            .map_err(|e| Error::config(format!("invalid base url `{}`: {e}", raw.base_url)))?;

        Ok(Self::new(
            base_url,
            Credentials::new(raw.app_token, raw.secret_key),
        ))
    }

    /// Loads configuration from the process environment.
    ///
    /// `SUMSUB_SECRET_KEY`, `SUMSUB_APP_TOKEN` and `SUMSUB_BASE_URL` are required.
    /// `SUMSUB_TIMEOUT_SECS` optionally sets a transport timeout.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::config(format!("{name} is not set")))
        };

        let raw = RawConfig {
            secret_key: SecretString::from(required(SECRET_KEY_VAR)?),
            app_token: SecretString::from(required(APP_TOKEN_VAR)?),
            base_url: required(BASE_URL_VAR)?,
        };
        let mut config = Self::from_raw(raw)?;

        if let Some(secs) = lookup(TIMEOUT_SECS_VAR) {
            let secs = secs
                .parse::<u64>()
                .map_err(|e| Error::config(format!("invalid {TIMEOUT_SECS_VAR} `{secs}`: {e}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_time_policy(mut self, time: TimePolicy) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::error::Kind;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_required_values() {
        let config = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, "secret"),
            (APP_TOKEN_VAR, "token"),
            (BASE_URL_VAR, "https://api.sumsub.com"),
        ]))
        .expect("config");

        assert_eq!(config.base_url.as_str(), "https://api.sumsub.com/");
        assert_eq!(config.credentials.app_token().expose_secret(), "token");
        assert_eq!(config.credentials.secret_key().expose_secret(), "secret");
        assert_eq!(config.time, TimePolicy::Local);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn missing_value_is_config_error() {
        let err = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, "secret"),
            (BASE_URL_VAR, "https://api.sumsub.com"),
        ]))
        .expect_err("missing token");

        assert_eq!(err.kind(), Kind::Config);
        assert!(err.to_string().contains(APP_TOKEN_VAR), "{err}");
    }

    #[test]
    fn empty_value_is_config_error() {
        let err = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, ""),
            (APP_TOKEN_VAR, "token"),
            (BASE_URL_VAR, "https://api.sumsub.com"),
        ]))
        .expect_err("empty secret");

        assert_eq!(err.kind(), Kind::Config);
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, "secret"),
            (APP_TOKEN_VAR, "token"),
            (BASE_URL_VAR, "not a url"),
        ]))
        .expect_err("bad url");

        assert_eq!(err.kind(), Kind::Config);
    }

    #[test]
    fn optional_timeout() {
        let config = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, "secret"),
            (APP_TOKEN_VAR, "token"),
            (BASE_URL_VAR, "https://api.sumsub.com"),
            (TIMEOUT_SECS_VAR, "15"),
        ]))
        .expect("config");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        let err = Config::from_lookup(env(&[
            (SECRET_KEY_VAR, "secret"),
            (APP_TOKEN_VAR, "token"),
            (BASE_URL_VAR, "https://api.sumsub.com"),
            (TIMEOUT_SECS_VAR, "soon"),
        ]))
        .expect_err("bad timeout");
        assert_eq!(err.kind(), Kind::Config);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::from_raw(RawConfig {
            base_url: "https://api.sumsub.com".to_owned(),
            app_token: SecretString::from("visible-token"),
            secret_key: SecretString::from("visible-secret"),
        })
        .expect("config");

        let debug = format!("{config:?}");
        assert!(!debug.contains("visible-token"), "{debug}");
        assert!(!debug.contains("visible-secret"), "{debug}");
    }
}
