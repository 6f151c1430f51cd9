//! 日志初始化
//!
//! 配置tracing日志框架。`RUST_LOG` 环境变量优先，其次使用配置文件中的级别。

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, LoggingConfig};

/// 日志目标名
pub const LOG_TARGET: &str = "pose_pebbles";

impl LogLevel {
    /// 转换为 `EnvFilter` 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 构建过滤器：`RUST_LOG` 存在时使用它，否则使用配置级别
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}

/// 初始化日志系统
///
/// 重复调用是安全的：全局订阅者只会被安装一次。
/// 返回是否由本次调用完成安装。
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);

    let installed = if config.log_to_file {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file_path)
        {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok(),
            Err(e) => {
                let ok = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .try_init()
                    .is_ok();
                tracing::warn!(
                    target: LOG_TARGET,
                    "Cannot open log file {}: {}, logging to console",
                    config.log_file_path,
                    e
                );
                ok
            }
        }
    } else if config.log_to_console {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    } else {
        false
    };

    tracing::info!(target: LOG_TARGET, "Sketch starting");
    installed
}
