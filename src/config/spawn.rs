use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::pose::BodyPart;
use crate::render::Color;
use serde::{Deserialize, Serialize};

/// 哪些关键点会生成石子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeypointFilter {
    /// 每个姿态只取第一个关键点
    First,
    /// 所有关键点
    All,
    /// 指定部位
    Parts { parts: Vec<BodyPart> },
}

/// 石子颜色策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMode {
    /// 固定颜色
    Fixed { color: Color },
    /// 随机色相，饱和度与亮度取 0–100
    RandomHue { saturation: f32, brightness: f32 },
}

/// 生成配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// 两批生成之间的最短间隔，0 表示每帧都可以生成
    pub debounce_ms: u64,

    /// 关键点过滤方式
    pub filter: KeypointFilter,

    /// 置信度阈值（严格大于才生成）
    pub min_score: f32,

    /// 石子最小直径
    pub size_min: f32,

    /// 石子最大直径
    pub size_max: f32,

    /// 颜色策略
    pub color: ColorMode,

    /// 存活数量上限，超出时按先进先出淘汰
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_live: Option<usize>,

    /// 启动时随机撒下的石子数
    #[serde(default)]
    pub initial_pebbles: usize,

    /// 随机数种子，不设置时使用系统熵
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl_default!(SpawnConfig {
    debounce_ms: 150,
    filter: KeypointFilter::All,
    min_score: 0.5,
    size_min: 10.0,
    size_max: 40.0,
    color: ColorMode::RandomHue {
        saturation: 80.0,
        brightness: 100.0,
    },
    max_live: None,
    initial_pebbles: 0,
    seed: None,
});

impl SpawnConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        // NaN 不落在任何区间内
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::ValidationError(format!(
                "Spawn score threshold must be within [0, 1], got {}",
                self.min_score
            )));
        }
        if !self.size_min.is_finite()
            || !self.size_max.is_finite()
            || self.size_min <= 0.0
            || self.size_max < self.size_min
        {
            return Err(ConfigError::ValidationError(format!(
                "Invalid pebble size range [{}, {}]",
                self.size_min, self.size_max
            )));
        }
        if self.max_live == Some(0) {
            return Err(ConfigError::ValidationError(
                "Live pebble cap must be at least 1".to_string(),
            ));
        }
        if let ColorMode::RandomHue {
            saturation,
            brightness,
        } = self.color
        {
            if !saturation.is_finite() || !brightness.is_finite() {
                return Err(ConfigError::ValidationError(
                    "Hue saturation and brightness must be finite".to_string(),
                ));
            }
        }
        if let KeypointFilter::Parts { parts } = &self.filter {
            if parts.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Part filter needs at least one body part".to_string(),
                ));
            }
        }
        Ok(())
    }
}
