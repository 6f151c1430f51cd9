//! 草图的五个变体预设

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    CanvasConfig, ColorMode, ConfigError, FloorBehavior, GravityConfig, KeypointFilter,
    LimbConfig, LoggingConfig, MotionConfig, PhysicsConfig, SketchConfig, SpawnConfig,
};
use crate::pose::BodyPart;
use crate::render::Color;

/// 草图变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// 乘法重力，第一个关键点，上限 800
    Fall,
    /// 乘法重力，所有关键点，上限 8000，落地回收
    Cascade,
    /// 刚体物理，鼻子/嘴，右手
    Bounce,
    /// 刚体物理，双手接石子
    Catch,
    /// 刚体物理，双前臂横扫
    Sweep,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Fall,
        Variant::Cascade,
        Variant::Bounce,
        Variant::Catch,
        Variant::Sweep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Fall => "fall",
            Variant::Cascade => "cascade",
            Variant::Bounce => "bounce",
            Variant::Catch => "catch",
            Variant::Sweep => "sweep",
        }
    }

    /// 是否使用刚体物理
    pub fn uses_physics(&self) -> bool {
        matches!(self, Variant::Bounce | Variant::Catch | Variant::Sweep)
    }

    /// 构建完整配置
    pub fn config(&self) -> SketchConfig {
        let random_hue = ColorMode::RandomHue {
            saturation: 80.0,
            brightness: 100.0,
        };
        let face = KeypointFilter::Parts {
            parts: vec![BodyPart::Nose, BodyPart::Mouth],
        };

        let (spawn, motion) = match self {
            Variant::Fall => (
                SpawnConfig {
                    debounce_ms: 0,
                    filter: KeypointFilter::First,
                    min_score: 0.2,
                    size_min: 10.0,
                    size_max: 40.0,
                    color: ColorMode::Fixed { color: Color::RED },
                    max_live: Some(800),
                    initial_pebbles: 50,
                    seed: None,
                },
                MotionConfig::Gravity(GravityConfig {
                    multiplier: 1.04,
                    floor: FloorBehavior::Rest,
                }),
            ),
            Variant::Cascade => (
                SpawnConfig {
                    debounce_ms: 100,
                    filter: KeypointFilter::All,
                    min_score: 0.5,
                    size_min: 10.0,
                    size_max: 40.0,
                    color: random_hue,
                    max_live: Some(8000),
                    initial_pebbles: 0,
                    seed: None,
                },
                MotionConfig::Gravity(GravityConfig {
                    multiplier: 1.04,
                    floor: FloorBehavior::Retire,
                }),
            ),
            Variant::Bounce => (
                SpawnConfig {
                    debounce_ms: 150,
                    filter: face,
                    min_score: 0.5,
                    size_min: 10.0,
                    size_max: 40.0,
                    color: random_hue,
                    max_live: None,
                    initial_pebbles: 0,
                    seed: None,
                },
                MotionConfig::Physics(PhysicsConfig {
                    time_to_live_ms: 60_000,
                    collision_force: 0.01,
                    limbs: vec![LimbConfig::hand(BodyPart::RightWrist, 40.0, 0.5)],
                    ..PhysicsConfig::default()
                }),
            ),
            Variant::Catch => (
                SpawnConfig {
                    debounce_ms: 100,
                    filter: KeypointFilter::All,
                    min_score: 0.5,
                    size_min: 6.0,
                    size_max: 30.0,
                    color: random_hue,
                    max_live: None,
                    initial_pebbles: 0,
                    seed: None,
                },
                MotionConfig::Physics(PhysicsConfig {
                    time_to_live_ms: 30_000,
                    collision_force: 0.05,
                    limbs: vec![
                        LimbConfig::hand(BodyPart::LeftWrist, 40.0, 0.9),
                        LimbConfig::hand(BodyPart::RightWrist, 40.0, 0.9),
                    ],
                    ..PhysicsConfig::default()
                }),
            ),
            Variant::Sweep => (
                SpawnConfig {
                    debounce_ms: 150,
                    filter: face,
                    min_score: 0.5,
                    size_min: 4.0,
                    size_max: 40.0,
                    color: random_hue,
                    max_live: None,
                    initial_pebbles: 0,
                    seed: None,
                },
                MotionConfig::Physics(PhysicsConfig {
                    time_to_live_ms: 13_000,
                    collision_force: 0.2,
                    limbs: vec![
                        LimbConfig::arm(BodyPart::LeftElbow, BodyPart::LeftWrist, 24.0, 0.5),
                        LimbConfig::arm(BodyPart::RightElbow, BodyPart::RightWrist, 24.0, 0.5),
                    ],
                    ..PhysicsConfig::default()
                }),
            ),
        };

        let canvas = CanvasConfig {
            // 第一个草图会留下关键点标记的轨迹
            draw_keypoints: matches!(self, Variant::Fall),
            ..CanvasConfig::default()
        };

        SketchConfig {
            variant: Some(*self),
            canvas,
            spawn,
            motion,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Sweep
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(n) = lower.parse::<usize>() {
            if (1..=Variant::ALL.len()).contains(&n) {
                return Ok(Variant::ALL[n - 1]);
            }
        }
        Variant::ALL
            .iter()
            .find(|v| v.name() == lower)
            .copied()
            .ok_or_else(|| ConfigError::ParseError(format!("Unknown variant: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_validate() {
        for variant in Variant::ALL {
            let config = variant.config();
            assert!(config.validate().is_ok(), "{} preset invalid", variant);
            assert_eq!(
                config.motion.physics().is_some(),
                variant.uses_physics()
            );
        }
    }

    #[test]
    fn test_parse_by_name_and_number() {
        assert_eq!("sweep".parse::<Variant>().unwrap(), Variant::Sweep);
        assert_eq!("Fall".parse::<Variant>().unwrap(), Variant::Fall);
        assert_eq!("3".parse::<Variant>().unwrap(), Variant::Bounce);
        assert!("6".parse::<Variant>().is_err());
        assert!("wave".parse::<Variant>().is_err());
    }

    #[test]
    fn test_preset_caps_and_ttls() {
        assert_eq!(Variant::Fall.config().spawn.max_live, Some(800));
        assert_eq!(Variant::Cascade.config().spawn.max_live, Some(8000));

        let ttls: Vec<u64> = [Variant::Bounce, Variant::Catch, Variant::Sweep]
            .iter()
            .filter_map(|v| v.config().motion.physics().map(|p| p.time_to_live_ms))
            .collect();
        assert_eq!(ttls, vec![60_000, 30_000, 13_000]);
    }
}
