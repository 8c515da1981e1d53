mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    // 初始化日志系统
    testpilot::logger::init_logger(cli.verbose());

    let passed = match &cli.command {
        Commands::Run {
            files,
            env,
            config,
            verbose,
        } => cli::run_files(files, env.as_deref(), config.as_deref(), *verbose).await?,
        Commands::Check { files } => cli::check_files(files),
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
