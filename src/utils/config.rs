use dotenvy::dotenv;
use secrecy::Secret;
use std::time::Duration;
use thiserror::Error;

use crate::domain::LineUserId;

use super::constants::{
    env, prod, DEFAULT_LINE_API_BASE_URL, DEFAULT_REDIS_HOSTNAME,
};

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_address: String,
    pub database_url: Secret<String>,
    pub redis_host_name: String,
    pub line_api_base_url: String,
    pub line_channel_access_token: Secret<String>,
    pub admin_line_user_ids: Vec<LineUserId>,
    pub notification_timeout: Duration,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let line_channel_access_token = non_empty(
            env::LINE_CHANNEL_ACCESS_TOKEN_ENV_VAR,
        )
        .map(Secret::new)
        .ok_or(ConfigError::Missing(env::LINE_CHANNEL_ACCESS_TOKEN_ENV_VAR))?;

        let database_url = non_empty(env::DATABASE_URL_ENV_VAR)
            .map(Secret::new)
            .ok_or(ConfigError::Missing(env::DATABASE_URL_ENV_VAR))?;

        let admin_line_user_ids = non_empty(env::ADMIN_LINE_USER_IDS_ENV_VAR)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                LineUserId::parse(id).map_err(|e| ConfigError::Invalid {
                    var: env::ADMIN_LINE_USER_IDS_ENV_VAR,
                    reason: e.as_ref().to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let notification_timeout =
            match non_empty(env::NOTIFICATION_TIMEOUT_SECS_ENV_VAR) {
                Some(value) => value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::Invalid {
                        var: env::NOTIFICATION_TIMEOUT_SECS_ENV_VAR,
                        reason: format!("{value:?} is not a positive number of seconds"),
                    })?,
                None => prod::line_client::TIMEOUT,
            };

        Ok(Self {
            app_address: non_empty(env::APP_ADDRESS_ENV_VAR)
                .unwrap_or_else(|| prod::APP_ADDRESS.to_owned()),
            database_url,
            redis_host_name: non_empty(env::REDIS_HOST_NAME_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_REDIS_HOSTNAME.to_owned()),
            line_api_base_url: non_empty(env::LINE_API_BASE_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_owned()),
            line_channel_access_token,
            admin_line_user_ids,
            notification_timeout,
        })
    }

    pub fn is_admin(&self, line_user_id: &LineUserId) -> bool {
        self.admin_line_user_ids.contains(line_user_id)
    }
}
