use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: warn，verbose 时为 testpilot=debug
///
/// 日志写到 stderr，stdout 留给测试报告。重复初始化时静默忽略。
///
/// 示例:
/// - RUST_LOG=testpilot=trace testpilot run users.toml
pub fn init_logger(verbose: bool) {
    let default = if verbose { "testpilot=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let initialized = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if initialized {
        tracing::debug!("Logger initialized");
    }
}
