/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量和变体预设
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod canvas;
pub mod motion;
pub mod spawn;
pub mod variant;

pub use canvas::CanvasConfig;
pub use motion::{
    FloorBehavior, GravityConfig, LimbConfig, LimbShape, MotionConfig, PhysicsConfig,
};
pub use spawn::{ColorMode, KeypointFilter, SpawnConfig};
pub use variant::Variant;

use crate::core::LOG_TARGET;
use crate::impl_default;

/// 配置文件名（不含扩展名）
const CONFIG_STEM: &str = "pose_pebbles";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 草图主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// 由哪个预设生成（仅作记录）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,

    /// 画布配置
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// 生成配置
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// 运动配置
    #[serde(default)]
    pub motion: MotionConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

impl SketchConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用变体预设
    pub fn preset(variant: Variant) -> Self {
        variant.config()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 按扩展名加载（`.json` 走JSON，其余走TOML）
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        // 画布配置
        if let Ok(val) = env::var("POSE_PEBBLES_WIDTH") {
            if let Ok(width) = val.parse() {
                self.canvas.width = width;
            }
        }
        if let Ok(val) = env::var("POSE_PEBBLES_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.canvas.height = height;
            }
        }

        // 生成配置
        if let Ok(val) = env::var("POSE_PEBBLES_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.spawn.debounce_ms = ms;
            }
        }
        if let Ok(val) = env::var("POSE_PEBBLES_MIN_SCORE") {
            if let Ok(score) = val.parse() {
                self.spawn.min_score = score;
            }
        }

        // 日志配置
        if let Ok(val) = env::var("POSE_PEBBLES_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.canvas.validate()?;
        self.spawn.validate()?;
        self.motion.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./pose_pebbles.toml
    /// 2. ./pose_pebbles.json
    /// 3. <config_dir>/pose_pebbles/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        let local_toml = PathBuf::from(format!("{}.toml", CONFIG_STEM));
        if let Ok(config) = Self::from_toml_file(&local_toml) {
            tracing::info!(target: LOG_TARGET, "Loaded config from {:?}", local_toml);
            return config;
        }

        let local_json = PathBuf::from(format!("{}.json", CONFIG_STEM));
        if let Ok(config) = Self::from_json_file(&local_json) {
            tracing::info!(target: LOG_TARGET, "Loaded config from {:?}", local_json);
            return config;
        }

        if let Some(dir) = dirs::config_dir() {
            let config_path = dir.join(CONFIG_STEM).join("config.toml");
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: LOG_TARGET, "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::info!(target: LOG_TARGET, "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "pose_pebbles.log".to_string(),
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 宽松解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SketchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.variant, Some(Variant::Sweep));
    }

    #[test]
    fn test_toml_serialization() {
        for variant in Variant::ALL {
            let config = SketchConfig::preset(variant);
            let toml_str = toml::to_string(&config).unwrap();
            let parsed: SketchConfig = toml::from_str(&toml_str).unwrap();
            assert_eq!(config, parsed);
        }
    }

    #[test]
    fn test_json_serialization() {
        let config = SketchConfig::preset(Variant::Catch);
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: SketchConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SketchConfig::from_toml_str(
            r#"
            [canvas]
            width = 320
            height = 240
            mirror = false
            background = { r = 0, g = 0, b = 0 }

            [motion]
            kind = "gravity"
            multiplier = 1.1
            floor = "retire"
            "#,
        )
        .unwrap();

        assert_eq!(config.canvas.width, 320);
        assert_eq!(config.spawn, SpawnConfig::default());
        assert_eq!(
            config.motion,
            MotionConfig::Gravity(GravityConfig {
                multiplier: 1.1,
                floor: FloorBehavior::Retire,
            })
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = SketchConfig::preset(Variant::Bounce);

        let toml_path = dir.path().join("sketch.toml");
        config.save_toml(&toml_path).unwrap();
        assert_eq!(SketchConfig::from_file(&toml_path).unwrap(), config);

        let json_path = dir.path().join("sketch.json");
        config.save_json(&json_path).unwrap();
        assert_eq!(SketchConfig::from_file(&json_path).unwrap(), config);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SketchConfig::default();
        config.spawn.size_min = 50.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = SketchConfig::default();
        config.canvas.width = 0;
        assert!(config.validate().is_err());

        let mut config = SketchConfig::preset(Variant::Sweep);
        if let MotionConfig::Physics(p) = &mut config.motion {
            p.time_to_live_ms = 0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let config = SketchConfig::from_toml_str(
            r#"
            [spawn]
            debounce_ms = 150
            min_score = 0.5
            size_min = nan
            size_max = nan
            filter = { kind = "all" }
            color = { kind = "random_hue", saturation = 80.0, brightness = 100.0 }
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = SketchConfig::preset(Variant::Sweep);
        config.spawn.size_max = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SketchConfig::preset(Variant::Fall);
        config.spawn.min_score = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SketchConfig::preset(Variant::Fall);
        config.motion = MotionConfig::Gravity(GravityConfig {
            multiplier: f32::INFINITY,
            floor: FloorBehavior::Rest,
        });
        assert!(config.validate().is_err());

        for poison in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut config = SketchConfig::preset(Variant::Catch);
            if let MotionConfig::Physics(p) = &mut config.motion {
                p.collision_force = poison;
            }
            assert!(config.validate().is_err());

            let mut config = SketchConfig::preset(Variant::Catch);
            if let MotionConfig::Physics(p) = &mut config.motion {
                p.gravity = poison;
            }
            assert!(config.validate().is_err());

            let mut config = SketchConfig::preset(Variant::Catch);
            if let MotionConfig::Physics(p) = &mut config.motion {
                p.limbs[0] = LimbConfig::hand(crate::pose::BodyPart::LeftWrist, poison, 0.9);
            }
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_missing_file() {
        let err = SketchConfig::from_toml_file("/nonexistent/pose_pebbles.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
