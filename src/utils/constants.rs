pub mod env {
    pub const APP_ADDRESS_ENV_VAR: &str = "APP_ADDRESS";
    pub const ADMIN_LINE_USER_IDS_ENV_VAR: &str = "ADMIN_LINE_USER_IDS";
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const LINE_API_BASE_URL_ENV_VAR: &str = "LINE_API_BASE_URL";
    pub const LINE_CHANNEL_ACCESS_TOKEN_ENV_VAR: &str =
        "LINE_CHANNEL_ACCESS_TOKEN";
    pub const NOTIFICATION_TIMEOUT_SECS_ENV_VAR: &str =
        "NOTIFICATION_TIMEOUT_SECS";
    pub const REDIS_HOST_NAME_ENV_VAR: &str = "REDIS_HOST_NAME";
}

pub const DEFAULT_REDIS_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";
pub const LINE_PUSH_PATH: &str = "/v2/bot/message/push";

/// How far ahead "query overtime" looks, in days.
pub const UPCOMING_OPPORTUNITY_DAYS: i64 = 7;

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub mod line_client {
        use std::time::Duration;

        pub const TIMEOUT: Duration = std::time::Duration::from_secs(10);
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
    pub mod line_client {
        use std::time::Duration;

        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
