//! 核心模块
//!
//! 包含草图的基础设施：
//! - `error` - 错误类型定义
//! - `logging` - tracing 日志初始化
//! - `slot` - 单槽最新值容器
//! - `runner` - 无头运行循环

pub mod error;
pub mod logging;
pub mod runner;
pub mod slot;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    PhysicsError, PhysicsResult, PoseError, PoseResult, RenderError, RenderResult, SketchError,
    SketchResult,
};

pub use logging::{init_logging, LOG_TARGET};
pub use runner::{PoseInput, RunOptions, RunSummary, SketchRunner, FRAME_MS};
pub use slot::LatestSlot;
