//! 2D 刚体物理世界
//!
//! 封装 rapier2d，对外只暴露像素坐标和不透明的 [`BodyHandle`]。
//! 屏幕坐标 y 轴向下，因此重力沿 +y。内部以 `pixels_per_meter` 换算到米。

pub mod boundary;
pub mod events;

pub use boundary::Boundary;
pub use events::{ContactCollector, ContactStart};

use crossbeam_channel::Receiver;
use glam::Vec2;
use rapier2d::prelude::*;

use crate::config::PhysicsConfig;
use crate::core::error::{PhysicsError, PhysicsResult};
use crate::core::LOG_TARGET;

/// 刚体句柄
///
/// 只是世界刚体表中的索引，刚体被移除后句柄失效，所有查询返回 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// 碰撞形状（像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

/// 刚体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// 受力运动
    Dynamic,
    /// 由外部逐帧摆放，速度由位置变化推出
    Kinematic,
    /// 静止
    Fixed,
}

/// 刚体参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    pub kind: BodyKind,
    /// 中心位置（像素）
    pub position: Vec2,
    pub angle: f32,
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position: Vec2::ZERO,
            angle: 0.0,
            restitution: 0.0,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// 物理世界
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    event_handler: ContactCollector,
    contacts: Receiver<ContactStart>,
    pixels_per_meter: f32,
    max_step: f32,
}

impl PhysicsWorld {
    /// 按配置创建空世界
    pub fn new(config: &PhysicsConfig) -> PhysicsResult<Self> {
        if !(config.pixels_per_meter > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "pixels_per_meter must be positive, got {}",
                config.pixels_per_meter
            )));
        }
        if config.max_step_ms == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_step_ms must be non-zero".to_string(),
            ));
        }

        let (event_handler, contacts) = ContactCollector::channel(config.pixels_per_meter);

        tracing::debug!(
            target: LOG_TARGET,
            "Physics world created: gravity={} m/s², scale={} px/m",
            config.gravity,
            config.pixels_per_meter
        );

        Ok(Self {
            gravity: vector![0.0, config.gravity],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            event_handler,
            contacts,
            pixels_per_meter: config.pixels_per_meter,
            max_step: config.max_step_ms as f32 / 1000.0,
        })
    }

    fn to_meters(&self, v: Vec2) -> Vector<Real> {
        vector![v.x / self.pixels_per_meter, v.y / self.pixels_per_meter]
    }

    fn to_pixels(&self, v: &Vector<Real>) -> Vec2 {
        Vec2::new(v.x, v.y) * self.pixels_per_meter
    }

    /// 创建刚体并放入世界
    pub fn create_body(&mut self, shape: BodyShape, params: BodyParams) -> BodyHandle {
        let body_type = match params.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyKind::Fixed => RigidBodyType::Fixed,
        };
        let body = RigidBodyBuilder::new(body_type)
            .translation(self.to_meters(params.position))
            .rotation(params.angle)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let ppm = self.pixels_per_meter;
        let collider = match shape {
            BodyShape::Circle { radius } => ColliderBuilder::ball(radius / ppm),
            BodyShape::Rect { width, height } => {
                ColliderBuilder::cuboid(width / 2.0 / ppm, height / 2.0 / ppm)
            }
        }
        .restitution(params.restitution)
        .friction(params.friction)
        .density(params.density)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        BodyHandle(handle)
    }

    /// 移除刚体及其碰撞体，返回句柄是否有效
    pub fn remove(&mut self, handle: BodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle.0,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle.0)
    }

    /// 移动刚体中心（像素）
    ///
    /// 运动学刚体设置下一步的目标位置，由引擎推出速度；其它刚体直接瞬移。
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool {
        let translation = self.to_meters(position);
        match self.rigid_body_set.get_mut(handle.0) {
            Some(rb) if rb.is_kinematic() => {
                rb.set_next_kinematic_translation(translation);
                true
            }
            Some(rb) => {
                rb.set_translation(translation, true);
                true
            }
            None => false,
        }
    }

    /// 设置刚体朝向（弧度）
    pub fn set_angle(&mut self, handle: BodyHandle, radians: f32) -> bool {
        match self.rigid_body_set.get_mut(handle.0) {
            Some(rb) if rb.is_kinematic() => {
                rb.set_next_kinematic_rotation(Rotation::new(radians));
                true
            }
            Some(rb) => {
                rb.set_rotation(Rotation::new(radians), true);
                true
            }
            None => false,
        }
    }

    /// 替换矩形刚体的碰撞尺寸（像素）
    pub fn set_rect_size(&mut self, handle: BodyHandle, width: f32, height: f32) -> bool {
        let Some(rb) = self.rigid_body_set.get(handle.0) else {
            return false;
        };
        let colliders: Vec<ColliderHandle> = rb.colliders().to_vec();
        let hx = (width / 2.0 / self.pixels_per_meter).max(f32::EPSILON);
        let hy = (height / 2.0 / self.pixels_per_meter).max(f32::EPSILON);
        for collider in colliders {
            if let Some(c) = self.collider_set.get_mut(collider) {
                c.set_shape(SharedShape::cuboid(hx, hy));
            }
        }
        true
    }

    /// 刚体中心（像素）
    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(handle.0)
            .map(|rb| self.to_pixels(rb.translation()))
    }

    /// 刚体朝向（弧度）
    pub fn angle(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set
            .get(handle.0)
            .map(|rb| rb.rotation().angle())
    }

    /// 线速度（像素/秒）
    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(handle.0)
            .map(|rb| self.to_pixels(rb.linvel()))
    }

    /// 质量（千克）
    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle.0).map(|rb| rb.mass())
    }

    /// 施加冲量（像素·千克/秒）
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool {
        let impulse = self.to_meters(impulse);
        match self.rigid_body_set.get_mut(handle.0) {
            Some(rb) => {
                rb.apply_impulse(impulse, true);
                true
            }
            None => false,
        }
    }

    /// 推进 `dt` 秒，超过单步上限时截断
    pub fn step(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        self.integration_parameters.dt = dt.min(self.max_step);
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.event_handler,
        );
    }

    /// 取出自上次调用以来的所有接触开始事件
    pub fn drain_contacts(&mut self) -> Vec<ContactStart> {
        self.contacts.try_iter().collect()
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn pixels_per_meter(&self) -> f32 {
        self.pixels_per_meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Viewport;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default()).unwrap()
    }

    fn ball(world: &mut PhysicsWorld, position: Vec2) -> BodyHandle {
        world.create_body(
            BodyShape::Circle { radius: 10.0 },
            BodyParams {
                position,
                ..BodyParams::default()
            },
        )
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let config = PhysicsConfig {
            pixels_per_meter: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            PhysicsWorld::new(&config),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_create_and_remove() {
        let mut world = world();
        let handle = ball(&mut world, Vec2::new(100.0, 50.0));

        assert!(world.contains(handle));
        assert_eq!(world.body_count(), 1);
        let pos = world.position(handle).unwrap();
        assert!((pos - Vec2::new(100.0, 50.0)).length() < 1e-3);

        assert!(world.remove(handle));
        assert!(!world.contains(handle));
        assert!(!world.remove(handle));
        assert!(world.position(handle).is_none());
        assert!(!world.set_position(handle, Vec2::ZERO));
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut world = world();
        let handle = ball(&mut world, Vec2::new(100.0, 50.0));

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }

        assert!(world.position(handle).unwrap().y > 50.0);
        assert!(world.velocity(handle).unwrap().y > 0.0);
    }

    #[test]
    fn test_mass_scales_with_size() {
        let mut world = world();
        let small = ball(&mut world, Vec2::ZERO);
        let large = world.create_body(
            BodyShape::Circle { radius: 20.0 },
            BodyParams::default(),
        );
        // 质量属性在步进时根据碰撞体重新计算
        world.step(1.0 / 60.0);
        assert!(world.mass(large).unwrap() > world.mass(small).unwrap());
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let mut world = world();
        let handle = world.create_body(
            BodyShape::Circle { radius: 10.0 },
            BodyParams {
                kind: BodyKind::Dynamic,
                position: Vec2::new(200.0, 200.0),
                ..BodyParams::default()
            },
        );
        world.step(1.0 / 60.0);

        let mass = world.mass(handle).unwrap();
        assert!(mass > 0.0);
        assert!(world.apply_impulse(handle, Vec2::new(mass * 100.0, 0.0)));

        let v = world.velocity(handle).unwrap();
        assert!((v.x - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_ball_rests_on_floor() {
        let mut world = world();
        let mut boundary = Boundary::new();
        boundary.rebuild(&mut world, Viewport::new(640, 480), 60.0);
        let handle = ball(&mut world, Vec2::new(320.0, 400.0));

        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }

        let pos = world.position(handle).unwrap();
        assert!(pos.y < 480.0);
        assert!(pos.y > 440.0);
    }

    #[test]
    fn test_boundary_rebuild_replaces_bodies() {
        let mut world = world();
        let mut boundary = Boundary::new();
        boundary.rebuild(&mut world, Viewport::new(640, 480), 60.0);
        let old: Vec<BodyHandle> = boundary.handles().to_vec();

        boundary.rebuild(&mut world, Viewport::new(800, 600), 60.0);

        assert_eq!(world.body_count(), 3);
        assert!(old.iter().all(|h| !world.contains(*h)));
        assert_eq!(boundary.viewport(), Some(Viewport::new(800, 600)));
    }

    #[test]
    fn test_kinematic_body_reports_contact() {
        let mut world = world();
        let pebble = ball(&mut world, Vec2::new(100.0, 100.0));
        let hand = world.create_body(
            BodyShape::Circle { radius: 20.0 },
            BodyParams {
                kind: BodyKind::Kinematic,
                position: Vec2::new(40.0, 100.0),
                ..BodyParams::default()
            },
        );

        let mut contacts = Vec::new();
        for i in 1..=10 {
            world.set_position(hand, Vec2::new(40.0 + i as f32 * 8.0, 100.0));
            world.step(1.0 / 60.0);
            contacts.extend(world.drain_contacts());
        }

        let contact = contacts
            .iter()
            .find_map(|c| c.involving(hand))
            .expect("hand should touch the pebble");
        assert_eq!(contact.0, pebble);
        assert!(contact.1.x > 0.0);
    }

    #[test]
    fn test_rect_angle_and_resize() {
        let mut world = world();
        let arm = world.create_body(
            BodyShape::Rect {
                width: 100.0,
                height: 20.0,
            },
            BodyParams {
                kind: BodyKind::Kinematic,
                position: Vec2::new(300.0, 300.0),
                ..BodyParams::default()
            },
        );

        assert!(world.set_angle(arm, 0.5));
        assert!(world.set_rect_size(arm, 150.0, 20.0));
        world.step(1.0 / 60.0);

        assert!((world.angle(arm).unwrap() - 0.5).abs() < 1e-4);
    }
}
