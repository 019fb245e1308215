use std::env;

/// Runtime settings, read once from the environment at startup.
///
/// The binaries call `dotenv::dotenv().ok()` before this, so a local
/// `.env` file works the same as real environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub mail: MailSettings,
    /// Base URL used when rendering links in outgoing mail.
    pub site_url: String,
    /// Bind address for the web frontend.
    pub bind_addr: String,
    /// Digest scheduler period, in days.
    pub digest_period_days: u64,
    /// Worker poll interval for the task queue, in seconds.
    pub worker_poll_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Remote Turso URL (`libsql://...`) or a local file path.
    pub url: String,
    pub auth_token: Option<String>,
}

impl DatabaseSettings {
    pub fn is_remote(&self) -> bool {
        self.url.starts_with("libsql://")
            || self.url.starts_with("http://")
            || self.url.starts_with("https://")
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    /// One of `smtp`, `console`, `memory`.
    pub backend: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database: DatabaseSettings {
                url: env_or("NEWSROOM_DB_URL", "newsroom.db"),
                auth_token: env::var("NEWSROOM_DB_AUTH_TOKEN").ok(),
            },
            mail: MailSettings {
                backend: env_or("NEWSROOM_MAIL_BACKEND", "console"),
                smtp_host: env_or("NEWSROOM_SMTP_HOST", "localhost"),
                smtp_port: parse_env("NEWSROOM_SMTP_PORT", 587),
                smtp_username: env::var("NEWSROOM_SMTP_USERNAME").ok(),
                smtp_password: env::var("NEWSROOM_SMTP_PASSWORD").ok(),
                from_email: env_or("NEWSROOM_FROM_EMAIL", "newsroom@localhost"),
            },
            site_url: env_or("NEWSROOM_SITE_URL", "http://127.0.0.1:3000"),
            bind_addr: env_or("NEWSROOM_BIND_ADDR", "0.0.0.0:3000"),
            digest_period_days: parse_env("NEWSROOM_DIGEST_PERIOD_DAYS", 7),
            worker_poll_secs: parse_env("NEWSROOM_WORKER_POLL_SECS", 1),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
