//! 统一错误处理模块
//!
//! 提供草图范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析与验证
//! - **子系统错误** (本模块): 姿态数据源、物理世界、渲染输出
//!
//! 每帧的更新路径不返回错误：相机缺失、模型未加载、已回收的刚体等情况一律按空操作处理。
//! 只有构造阶段和无头运行器会返回 `SketchError`。

use thiserror::Error;

use crate::config::ConfigError;

/// 草图顶层错误类型
#[derive(Error, Debug)]
pub enum SketchError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pose source error: {0}")]
    Pose(#[from] PoseError),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// 姿态数据源错误
#[derive(Error, Debug)]
pub enum PoseError {
    #[error("Failed to read pose script {path}: {source}")]
    ScriptIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pose script: {0}")]
    InvalidScript(String),
}

/// 物理世界错误
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// 渲染输出错误
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write snapshot: {0}")]
    Snapshot(#[from] image::ImageError),

    #[error("Unbalanced transform stack: {0} push without pop")]
    UnbalancedTransform(usize),
}

/// 草图结果类型别名
pub type SketchResult<T> = Result<T, SketchError>;
pub type PoseResult<T> = Result<T, PoseError>;
pub type PhysicsResult<T> = Result<T, PhysicsError>;
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let pose_err = PoseError::InvalidScript("missing frames".to_string());
        let sketch_err: SketchError = pose_err.into();
        assert!(matches!(sketch_err, SketchError::Pose(_)));
    }

    #[test]
    fn test_error_display() {
        let err = PhysicsError::InvalidConfig("pixels_per_meter must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid physics configuration: pixels_per_meter must be positive"
        );

        let err = RenderError::UnbalancedTransform(2);
        assert_eq!(
            err.to_string(),
            "Unbalanced transform stack: 2 push without pop"
        );
    }
}
