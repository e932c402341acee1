//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// shortpath - a small URL shortener with self-expiring links
#[derive(Parser, Debug)]
#[command(name = "shortpath")]
#[command(version)]
#[command(about = "A small URL shortener with self-expiring links", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Add a short link
    Add {
        /// Destination URL (http or https)
        url: String,

        /// Custom path instead of a generated one
        #[arg(long, short = 's')]
        short: Option<String>,

        /// Length of the generated path
        #[arg(long, short = 'l', default_value_t = 0)]
        length: i64,

        /// Relative expiry such as "90m", "12h" or "2w"
        #[arg(long)]
        expire_after: Option<String>,

        /// Explicit expiry date, "YYYY-MM-DDTHH:MM" (UTC)
        #[arg(long)]
        expire_date: Option<String>,

        /// Password protection
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Remove a short link
    Remove {
        /// Path of the link to remove
        short: String,
    },

    /// Delete every expired link once and exit
    Cleanup,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a sample configuration file
    Generate {
        /// Output path
        #[arg(default_value = crate::config::DEFAULT_CONFIG_PATH)]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
