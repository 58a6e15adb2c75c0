pub mod email;

use crate::error::CoreError;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use email::{EmailNotifier, SmtpSettings};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMethod {
    Email,
}

impl NotificationMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationMethod::Email => "email",
        }
    }
}

impl fmt::Display for NotificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(NotificationMethod::Email),
            other => Err(format!("unknown notification method '{other}'")),
        }
    }
}

/// Delivers a message to one or more addresses.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Will return `Err` if the message could not be handed off for delivery.
    async fn notify(
        &self,
        method: NotificationMethod,
        destination: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), CoreError>;
}
