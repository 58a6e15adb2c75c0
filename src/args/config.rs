use crate::notify::SmtpSettings;
use crate::notify::email::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = ".rusty-tee-times.db";
pub const DEFAULT_POLL_MIN_SLEEP_SECS: u64 = 420;
pub const DEFAULT_POLL_MAX_SLEEP_SECS: u64 = 900;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

pub const ENV_SMTP_ACCOUNT: &str = "GMAIL_ACCOUNT";
pub const ENV_SMTP_PASSWORD: &str = "GMAIL_PASSWORD";
pub const ENV_DEFAULT_DESTINATION: &str = "DEFAULT_EMAIL_DESTINATION";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_account: Option<String>,
    pub smtp_password: Option<String>,
    pub default_email_destination: Option<String>,
    pub poll_min_sleep_secs: Option<u64>,
    pub poll_max_sleep_secs: Option<u64>,
    pub source_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid TOML for this shape.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config toml {}", path.display()))?;
        toml::from_str::<FileConfig>(&contents)
            .with_context(|| format!("parse config toml {}", path.display()))
    }
}

/// Settings after layering CLI over file over environment over defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_account: Option<String>,
    pub smtp_password: Option<String>,
    pub default_email_destination: Option<String>,
    pub poll_sleep_secs: RangeInclusive<u64>,
    pub source_timeout: Duration,
}

impl AppConfig {
    /// `env` looks up an environment variable; pass `|k| std::env::var(k).ok()` outside tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll sleep bounds are inverted or the source
    /// timeout is zero.
    pub fn resolve(
        cli_db_path: Option<PathBuf>,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let min_sleep = file.poll_min_sleep_secs.unwrap_or(DEFAULT_POLL_MIN_SLEEP_SECS);
        let max_sleep = file.poll_max_sleep_secs.unwrap_or(DEFAULT_POLL_MAX_SLEEP_SECS);
        if min_sleep > max_sleep {
            return Err(anyhow!(
                "poll_min_sleep_secs ({min_sleep}) exceeds poll_max_sleep_secs ({max_sleep})"
            ));
        }
        let source_timeout_secs = file.source_timeout_secs.unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
        if source_timeout_secs == 0 {
            return Err(anyhow!("source_timeout_secs must be at least 1"));
        }

        Ok(Self {
            db_path: cli_db_path
                .or(file.db_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            smtp_host: file
                .smtp_host
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: file.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            smtp_account: file.smtp_account.or_else(|| env(ENV_SMTP_ACCOUNT)),
            smtp_password: file.smtp_password.or_else(|| env(ENV_SMTP_PASSWORD)),
            default_email_destination: file
                .default_email_destination
                .or_else(|| env(ENV_DEFAULT_DESTINATION)),
            poll_sleep_secs: min_sleep..=max_sleep,
            source_timeout: Duration::from_secs(source_timeout_secs),
        })
    }

    /// # Errors
    ///
    /// Returns an error naming whichever credential is missing.
    pub fn smtp_settings(&self) -> Result<SmtpSettings> {
        let account = self
            .smtp_account
            .clone()
            .ok_or_else(|| anyhow!("missing smtp account, set smtp_account or {ENV_SMTP_ACCOUNT}"))?;
        let password = self.smtp_password.clone().ok_or_else(|| {
            anyhow!("missing smtp password, set smtp_password or {ENV_SMTP_PASSWORD}")
        })?;
        Ok(SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            account,
            password,
        })
    }
}
