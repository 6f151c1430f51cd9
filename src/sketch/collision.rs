//! 碰撞响应
//!
//! 所有物理变体共用一个处理函数：肢体与石子开始接触时，对石子施加
//! `(肢体速度 - 石子速度) * 石子质量 * 力度系数` 的冲量。
//! 涉及已回收刚体的通知直接忽略。

use glam::Vec2;

use crate::physics::{ContactStart, PhysicsWorld};

use super::limbs::LimbTracker;
use super::pebble::PebbleStore;

/// 冲量公式
pub fn response_impulse(
    limb_velocity: Vec2,
    pebble_velocity: Vec2,
    mass: f32,
    multiplier: f32,
) -> Vec2 {
    (limb_velocity - pebble_velocity) * mass * multiplier
}

/// 碰撞响应
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResponse {
    multiplier: f32,
}

impl CollisionResponse {
    pub fn new(multiplier: f32) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// 处理一批接触事件，返回施加冲量的次数
    pub fn respond(
        &self,
        contacts: &[ContactStart],
        limbs: &LimbTracker,
        pebbles: &PebbleStore,
        world: &mut PhysicsWorld,
    ) -> usize {
        let mut applied = 0;
        for contact in contacts {
            let Some((pebble, limb_velocity, pebble_velocity)) = limbs
                .limbs()
                .iter()
                .find_map(|limb| contact.involving(limb.body()))
            else {
                continue;
            };

            if !pebbles.owns_body(pebble) {
                continue;
            }
            let Some(mass) = world.mass(pebble) else {
                continue;
            };

            let impulse = response_impulse(limb_velocity, pebble_velocity, mass, self.multiplier);
            if world.apply_impulse(pebble, impulse) {
                applied += 1;
            }
        }
        applied
    }
}
