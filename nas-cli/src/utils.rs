use nas_core::constants::logging;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;

/// # NAS CLI 日志系统使用说明
///
/// 库代码只使用 `tracing` 宏，日志配置由 `main.rs` 调用 `setup_logging()` 完成。
///
/// ## 日志配置选项
/// - `-v, --verbose`：启用详细日志模式（DEBUG 级别）
/// - `RUST_LOG`：标准的 Rust 日志级别控制（如 `debug`, `info`, `warn`, `error`）
/// - `NAS_LOG_FILE`：日志文件路径，设置后日志只追加写入该文件
///
/// 默认情况下终端输出简洁格式，同时按天滚动写入 `<log_dir>/anytime-nas.log.YYYY-MM-DD`。
///
/// ```bash
/// RUST_LOG=nas_core::nas=debug nas-cli start
/// NAS_LOG_FILE=nas.log nas-cli status
/// ```
///
/// 返回的 guard 需要持有到程序退出，否则文件日志可能丢失。
pub fn setup_logging(verbose: bool, log_dir: &Path) -> Option<WorkerGuard> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // 根据verbose参数和环境变量确定日志级别
    let default_level = if verbose {
        "debug"
    } else {
        logging::DEFAULT_LOG_LEVEL
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 检查环境变量，决定是否只输出到单个文件
    if let Ok(log_file) = std::env::var("NAS_LOG_FILE") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
        {
            Ok(file) => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .init();
                return None;
            }
            Err(e) => eprintln!("无法打开日志文件 {log_file}: {e}，改为输出到终端"),
        }
    }

    // 终端输出 - 使用简洁格式，用户友好
    let terminal_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, logging::LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(terminal_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(terminal_layer)
                .init();
            warn!("无法创建日志目录 {}: {}，仅输出到终端", log_dir.display(), e);
            None
        }
    }
}
