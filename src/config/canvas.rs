use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::render::Color;
use serde::{Deserialize, Serialize};

/// 画布配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// 宽度（像素）
    pub width: u32,

    /// 高度（像素）
    pub height: u32,

    /// 水平镜像相机画面和粒子
    pub mirror: bool,

    /// 没有相机画面时的背景色
    pub background: Color,

    /// 是否在每个生成点留下关键点标记，标记从不擦除
    #[serde(default)]
    pub draw_keypoints: bool,

    /// 关键点标记直径
    #[serde(default = "default_marker")]
    pub keypoint_marker: f32,

    /// 标记轨迹最多保留的点数，超出时丢弃最旧的
    #[serde(default = "default_marker_limit")]
    pub marker_limit: usize,
}

fn default_marker() -> f32 {
    10.0
}

fn default_marker_limit() -> usize {
    4096
}

impl_default!(CanvasConfig {
    width: 640,
    height: 480,
    mirror: true,
    background: Color::BLACK,
    draw_keypoints: false,
    keypoint_marker: default_marker(),
    marker_limit: default_marker_limit(),
});

impl CanvasConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(format!(
                "Canvas must have a non-zero size, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.keypoint_marker.is_finite() || self.keypoint_marker < 0.0 {
            return Err(ConfigError::ValidationError(
                "Keypoint marker size must be non-negative".to_string(),
            ));
        }
        if self.marker_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Marker trail must keep at least one marker".to_string(),
            ));
        }
        Ok(())
    }
}
