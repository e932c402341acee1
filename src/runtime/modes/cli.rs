//! CLI mode
//!
//! One-shot link management against the configured store. The server does not
//! need to be running.

use colored::Colorize;

use crate::api::InstanceContext;
use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::{Result, ShortpathError};
use crate::runtime::lifetime;
use crate::services::{CreateLinkRequest, ExpiryInput, GarbageCollector};

/// Run a CLI command from clap-parsed input
///
/// `Commands::Serve` is dispatched by the caller.
pub async fn run_cli(cmd: Commands, config: &StaticConfig) -> Result<()> {
    // Generate doesn't need a store
    if let Commands::Config {
        action: ConfigCommands::Generate { path, force },
    } = cmd
    {
        return generate_config(&path, force);
    }

    let service = lifetime::startup::prepare_cli_startup(config)
        .await
        .map_err(|e| ShortpathError::database_connection(format!("{:#}", e)))?;

    match cmd {
        Commands::Add {
            url,
            short,
            length,
            expire_after,
            expire_date,
            password,
        } => {
            let request = CreateLinkRequest {
                url,
                custom_path: short,
                length,
                expiry: ExpiryInput::Fields {
                    expire_date,
                    expire_after,
                },
                password,
            };
            let created = service.create_link(request).await?;
            let link = &created.link;
            let instance = InstanceContext::from_config(config);

            if created.length_changed {
                println!(
                    "{} Path space was crowded, used length {}",
                    "ℹ".bold().blue(),
                    link.short.len().to_string().magenta()
                );
            }

            let expiry = if link.never_expires() {
                "never".to_string()
            } else {
                link.expire_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
            };
            println!(
                "{} Added short link: {} -> {} (expires: {})",
                "✓".bold().green(),
                instance.shortened_link(&link.short).cyan(),
                link.url.blue().underline(),
                expiry.yellow()
            );
            if link.is_protected() {
                println!("  {}", "Password protected".yellow());
            }
            Ok(())
        }

        Commands::Remove { short } => {
            service.remove_link(&short).await?;
            println!("{} Deleted short link: {}", "✓".bold().green(), short.cyan());
            Ok(())
        }

        Commands::Cleanup => {
            let gc = GarbageCollector::from_minutes(
                service.store().clone(),
                config.links.cleanup_interval_minutes,
            );
            let deleted = gc.sweep_once().await?;
            println!(
                "{} Removed {} expired links",
                "✓".bold().green(),
                deleted.to_string().cyan()
            );
            Ok(())
        }

        Commands::Serve | Commands::Config { .. } => Err(ShortpathError::internal(
            "command is not handled by the CLI runner",
        )),
    }
}

/// Write a sample configuration file
fn generate_config(path: &str, force: bool) -> Result<()> {
    if std::path::Path::new(path).exists() && !force {
        return Err(ShortpathError::config(format!(
            "{} already exists, pass --force to overwrite it",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| ShortpathError::config(format!("Unable to write configuration file: {}", e)))?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Please edit the configuration file and restart the service".yellow()
    );
    Ok(())
}
