//! 碰撞事件收集
//!
//! rapier 在 `step` 内部回调事件处理器，这里只把"开始接触"事件连同两个刚体当时的速度
//! 推入通道，由会话在步进之后统一取出处理。

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use rapier2d::prelude::*;

use super::BodyHandle;

/// 两个刚体开始接触
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactStart {
    pub a: BodyHandle,
    pub b: BodyHandle,
    /// `a` 在接触时刻的线速度（像素/秒）
    pub velocity_a: Vec2,
    /// `b` 在接触时刻的线速度（像素/秒）
    pub velocity_b: Vec2,
}

impl ContactStart {
    /// 若 `handle` 参与了本次接触，返回另一方及双方速度 `(other, own_velocity, other_velocity)`
    pub fn involving(&self, handle: BodyHandle) -> Option<(BodyHandle, Vec2, Vec2)> {
        if self.a == handle {
            Some((self.b, self.velocity_a, self.velocity_b))
        } else if self.b == handle {
            Some((self.a, self.velocity_b, self.velocity_a))
        } else {
            None
        }
    }
}

/// rapier 事件处理器，把接触开始事件转发到通道
pub struct ContactCollector {
    sender: Sender<ContactStart>,
    pixels_per_meter: f32,
}

impl ContactCollector {
    /// 创建收集器和对应的接收端
    pub fn channel(pixels_per_meter: f32) -> (Self, Receiver<ContactStart>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                sender,
                pixels_per_meter,
            },
            receiver,
        )
    }

    fn body_of(colliders: &ColliderSet, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        colliders.get(collider).and_then(|c| c.parent())
    }

    fn velocity_of(&self, bodies: &RigidBodySet, body: RigidBodyHandle) -> Vec2 {
        bodies
            .get(body)
            .map(|rb| {
                let v = rb.linvel();
                Vec2::new(v.x, v.y) * self.pixels_per_meter
            })
            .unwrap_or(Vec2::ZERO)
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if !event.started() {
            return;
        }

        let (Some(a), Some(b)) = (
            Self::body_of(colliders, event.collider1()),
            Self::body_of(colliders, event.collider2()),
        ) else {
            return;
        };

        let contact = ContactStart {
            a: BodyHandle(a),
            b: BodyHandle(b),
            velocity_a: self.velocity_of(bodies, a),
            velocity_b: self.velocity_of(bodies, b),
        };
        // 接收端与世界同生共死，发送失败只可能发生在析构途中
        let _ = self.sender.send(contact);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
