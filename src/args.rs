pub mod config;
pub mod types;
pub mod validation;

use clap::Parser;

pub use config::{AppConfig, FileConfig};
pub use types::{Cli, Command, DateOrDateTime, SearchArgs};

#[must_use]
pub fn args_checks() -> Cli {
    Cli::parse()
}
