use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::pose::BodyPart;
use serde::{Deserialize, Serialize};

/// 石子运动方式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionConfig {
    /// 每帧把 y 乘以固定系数，落地即停
    Gravity(GravityConfig),
    /// 交给刚体物理引擎
    Physics(PhysicsConfig),
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig::Physics(PhysicsConfig::default())
    }
}

impl MotionConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            MotionConfig::Gravity(g) => g.validate(),
            MotionConfig::Physics(p) => p.validate(),
        }
    }

    pub fn physics(&self) -> Option<&PhysicsConfig> {
        match self {
            MotionConfig::Physics(p) => Some(p),
            MotionConfig::Gravity(_) => None,
        }
    }
}

/// 石子落地后的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorBehavior {
    /// 停在地面上
    Rest,
    /// 落地即回收
    Retire,
}

/// 乘法重力配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityConfig {
    /// 每帧 y 乘数
    pub multiplier: f32,
    pub floor: FloorBehavior,
}

impl_default!(GravityConfig {
    multiplier: 1.04,
    floor: FloorBehavior::Rest,
});

impl GravityConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Gravity multiplier must be positive, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// 刚体物理配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 像素与米的换算
    pub pixels_per_meter: f32,

    /// 重力加速度（米/秒²，向下为正）
    pub gravity: f32,

    /// 石子寿命
    pub time_to_live_ms: u64,

    /// 恢复系数
    pub restitution: f32,

    /// 摩擦系数
    pub friction: f32,

    /// 石子密度
    pub density: f32,

    /// 地面与墙壁厚度（像素）
    pub wall_thickness: f32,

    /// 单步最长时间，帧间隔更长时截断
    pub max_step_ms: u64,

    /// 肢体碰撞石子时的力度系数
    pub collision_force: f32,

    /// 跟踪的肢体
    #[serde(default)]
    pub limbs: Vec<LimbConfig>,
}

impl_default!(PhysicsConfig {
    pixels_per_meter: 50.0,
    gravity: 9.81,
    time_to_live_ms: 13_000,
    restitution: 0.6,
    friction: 0.3,
    density: 1.0,
    wall_thickness: 60.0,
    max_step_ms: 50,
    collision_force: 0.2,
    limbs: Vec::new(),
});

impl PhysicsConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.pixels_per_meter.is_finite() || self.pixels_per_meter <= 0.0 {
            return Err(ConfigError::ValidationError(
                "pixels_per_meter must be positive".to_string(),
            ));
        }
        let finite = [
            ("gravity", self.gravity),
            ("restitution", self.restitution),
            ("friction", self.friction),
            ("density", self.density),
            ("wall_thickness", self.wall_thickness),
            ("collision_force", self.collision_force),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if self.restitution < 0.0 || self.friction < 0.0 {
            return Err(ConfigError::ValidationError(
                "Restitution and friction must be non-negative".to_string(),
            ));
        }
        if self.time_to_live_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Pebble time-to-live must be non-zero".to_string(),
            ));
        }
        if self.max_step_ms == 0 {
            return Err(ConfigError::ValidationError(
                "max_step_ms must be non-zero".to_string(),
            ));
        }
        if self.density <= 0.0 || self.wall_thickness <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Density and wall thickness must be positive".to_string(),
            ));
        }
        if self.collision_force < 0.0 {
            return Err(ConfigError::ValidationError(
                "Collision force multiplier must be non-negative".to_string(),
            ));
        }
        for limb in &self.limbs {
            limb.validate()?;
        }
        Ok(())
    }
}

/// 肢体形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LimbShape {
    /// 圆形手掌，跟随单个关键点
    Hand { part: BodyPart, radius: f32 },
    /// 矩形手臂，连接两个关键点
    Arm {
        from: BodyPart,
        to: BodyPart,
        thickness: f32,
    },
}

/// 肢体配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimbConfig {
    pub shape: LimbShape,
    /// 置信度阈值（严格大于才更新位置）
    pub min_score: f32,
}

impl LimbConfig {
    pub fn hand(part: BodyPart, radius: f32, min_score: f32) -> Self {
        Self {
            shape: LimbShape::Hand { part, radius },
            min_score,
        }
    }

    pub fn arm(from: BodyPart, to: BodyPart, thickness: f32, min_score: f32) -> Self {
        Self {
            shape: LimbShape::Arm {
                from,
                to,
                thickness,
            },
            min_score,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::ValidationError(format!(
                "Limb score threshold must be within [0, 1], got {}",
                self.min_score
            )));
        }
        let size = match &self.shape {
            LimbShape::Hand { radius, .. } => *radius,
            LimbShape::Arm { thickness, .. } => *thickness,
        };
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Limb size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
