use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use testpilot::config::ConfigLoader;
use testpilot::http::HttpTransport;
use testpilot::runner::{PlanFile, TestReporter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行测试计划文件，每个文件是一个独立的计划
    Run {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 使用配置文件中的环境（如 dev, prod）
        #[arg(short, long)]
        env: Option<String>,

        /// 配置文件路径，默认查找 testpilot.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 显示存储的响应和调试日志
        #[arg(short, long)]
        verbose: bool,
    },

    /// 校验计划文件并列出请求，不发送任何请求
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        matches!(self.command, Commands::Run { verbose: true, .. })
    }
}

/// 依次执行计划文件，全部通过时返回 true
pub async fn run_files(
    files: &[PathBuf],
    env: Option<&str>,
    config: Option<&Path>,
    verbose: bool,
) -> Result<bool> {
    let config = match config {
        Some(path) => Some(
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
        ),
        None => ConfigLoader::find_and_load()?,
    };
    let settings = ConfigLoader::settings(config.as_ref(), env)?;
    let transport = HttpTransport::with_timeout(settings.timeout)?;
    let reporter = TestReporter::new(verbose);

    let mut all_passed = true;
    for file in files {
        let plan = PlanFile::load(file)
            .with_context(|| format!("failed to load plan {}", file.display()))?
            .into_plan(transport.clone(), settings.clone())?;

        // Ctrl-C 取消当前计划
        let handle = plan.cancel_handle();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });
        let report = plan.run().await;
        watcher.abort();

        reporter.print_report(&report);
        all_passed &= report.is_success();

        if report.summary().cancelled > 0 {
            println!("{}", "Cancelled, remaining plans skipped".yellow());
            return Ok(false);
        }
    }

    Ok(all_passed)
}

/// 校验计划文件，全部有效时返回 true
pub fn check_files(files: &[PathBuf]) -> bool {
    let mut all_valid = true;

    for file in files {
        match PlanFile::load(file).and_then(|plan| plan.specs().map(|_| plan)) {
            Ok(plan) => {
                println!(
                    " {} {} ({} requests)",
                    "✓".green(),
                    file.display().to_string().bold(),
                    plan.steps.len()
                );
                for (index, step) in plan.steps.iter().enumerate() {
                    let store = step
                        .store
                        .as_ref()
                        .map(|key| format!(" → {}", key))
                        .unwrap_or_default();
                    println!(
                        "   [{}] {} {}{}",
                        index + 1,
                        step.method.to_string().cyan(),
                        step.url,
                        store.dimmed()
                    );
                }
            }
            Err(e) => {
                all_valid = false;
                println!(" {} {}", "✗".red(), file.display().to_string().bold());
                println!("   {}: {}", "Error".red().bold(), e);
            }
        }
    }

    all_valid
}
