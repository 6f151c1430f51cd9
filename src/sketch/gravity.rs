//! 乘法重力
//!
//! 不用物理引擎的早期变体：每帧把 y 乘以固定系数，石子底边碰到地面时
//! 停在地面上或直接回收。

use crate::config::{FloorBehavior, GravityConfig};
use crate::render::Viewport;

use super::pebble::{NoBodies, PebbleStore};

/// 乘法重力运动
#[derive(Debug, Clone, PartialEq)]
pub struct GravityMotion {
    config: GravityConfig,
}

impl GravityMotion {
    pub fn new(config: GravityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    /// 推进一帧，返回因落地被回收的数量
    pub fn advance(&self, store: &mut PebbleStore, viewport: Viewport) -> usize {
        let ground = viewport.height;
        for pebble in store.iter_mut() {
            pebble.position.y *= self.config.multiplier;
            if pebble.position.y + pebble.size / 2.0 >= ground
                && self.config.floor == FloorBehavior::Rest
            {
                pebble.position.y = ground - pebble.size / 2.0;
            }
        }

        match self.config.floor {
            FloorBehavior::Rest => 0,
            FloorBehavior::Retire => store.retire_where(&mut NoBodies, |p| {
                p.position.y + p.size / 2.0 >= ground
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;
    use glam::Vec2;

    fn motion(floor: FloorBehavior) -> GravityMotion {
        GravityMotion::new(GravityConfig {
            multiplier: 1.04,
            floor,
        })
    }

    #[test]
    fn test_multiplies_y() {
        let mut store = PebbleStore::new();
        store.add(Vec2::new(10.0, 100.0), 10.0, Color::RED, 0, None);

        motion(FloorBehavior::Rest).advance(&mut store, Viewport::new(640, 480));

        let p = store.oldest().unwrap();
        assert!((p.position.y - 104.0).abs() < 1e-3);
        assert_eq!(p.position.x, 10.0);
    }

    #[test]
    fn test_rests_on_ground() {
        let mut store = PebbleStore::new();
        store.add(Vec2::new(10.0, 470.0), 20.0, Color::RED, 0, None);

        let retired = motion(FloorBehavior::Rest).advance(&mut store, Viewport::new(640, 480));

        assert_eq!(retired, 0);
        assert_eq!(store.oldest().unwrap().position.y, 470.0);
    }

    #[test]
    fn test_retires_on_ground() {
        let mut store = PebbleStore::new();
        store.add(Vec2::new(10.0, 470.0), 20.0, Color::RED, 0, None);
        store.add(Vec2::new(10.0, 10.0), 20.0, Color::RED, 0, None);

        let retired = motion(FloorBehavior::Retire).advance(&mut store, Viewport::new(640, 480));

        assert_eq!(retired, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pebble_at_top_never_falls() {
        // y = 0 乘以任何系数仍是 0
        let mut store = PebbleStore::new();
        store.add(Vec2::new(10.0, 0.0), 10.0, Color::RED, 0, None);

        for _ in 0..100 {
            motion(FloorBehavior::Rest).advance(&mut store, Viewport::new(640, 480));
        }

        assert_eq!(store.oldest().unwrap().position.y, 0.0);
    }
}
