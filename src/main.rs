use clap::Parser;

use shortpath::cli::{Cli, Commands, ConfigCommands};
use shortpath::config::init_config;
use shortpath::errors::ShortpathError;
use shortpath::runtime::modes;
use shortpath::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Serve);

    // 生成配置文件不需要加载现有配置
    if let Commands::Config {
        action: ConfigCommands::Generate { .. },
    } = command
    {
        let config = shortpath::config::StaticConfig::default();
        return finish_cli(modes::run_cli(command, &config).await);
    }

    let config = match init_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // guard 必须活到进程结束，否则缓冲的日志会丢失
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => exit_with(&e),
    };

    match command {
        Commands::Serve => modes::run_server(&config).await,
        other => finish_cli(modes::run_cli(other, &config).await),
    }
}

fn finish_cli(result: shortpath::errors::Result<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) => exit_with(&e),
    }
}

fn exit_with(err: &ShortpathError) -> ! {
    if colored::control::SHOULD_COLORIZE.should_colorize() {
        eprintln!("{}", err.format_colored());
    } else {
        eprintln!("{}", err.format_simple());
    }
    std::process::exit(1);
}
