//! 肢体跟踪
//!
//! 手是圆形运动学刚体，跟随单个关键点；前臂是矩形运动学刚体，
//! 放在两个关键点的中点，角度 `atan2(dy, dx)`，长度为两点距离。
//! 驱动关键点的置信度不超过阈值时保持上一帧姿态，不做平滑。

use glam::Vec2;

use crate::config::{LimbConfig, LimbShape, PhysicsConfig};
use crate::physics::{BodyHandle, BodyKind, BodyParams, BodyShape, PhysicsWorld};
use crate::pose::Pose;
use crate::render::Viewport;

/// 肢体当前姿态（像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbPose {
    pub center: Vec2,
    pub angle: f32,
    /// 手为直径，前臂为长度
    pub length: f32,
}

/// 一个被跟踪的肢体
#[derive(Debug, Clone)]
pub struct TrackedLimb {
    config: LimbConfig,
    body: BodyHandle,
    pose: LimbPose,
}

impl TrackedLimb {
    pub fn config(&self) -> &LimbConfig {
        &self.config
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn pose(&self) -> LimbPose {
        self.pose
    }

    /// 从姿态推导目标位置；驱动关键点不够可信时返回 `None`
    fn target(&self, pose: &Pose) -> Option<LimbPose> {
        let threshold = self.config.min_score;
        match &self.config.shape {
            LimbShape::Hand { part, .. } => {
                let center = pose.confident_position(part, threshold)?;
                Some(LimbPose {
                    center,
                    angle: 0.0,
                    length: self.pose.length,
                })
            }
            LimbShape::Arm { from, to, .. } => {
                let a = pose.confident_position(from, threshold)?;
                let b = pose.confident_position(to, threshold)?;
                Some(arm_pose(a, b))
            }
        }
    }
}

/// 两个关键点之间的前臂姿态
pub fn arm_pose(from: Vec2, to: Vec2) -> LimbPose {
    let delta = to - from;
    LimbPose {
        center: (from + to) / 2.0,
        angle: delta.y.atan2(delta.x),
        length: delta.length(),
    }
}

/// 肢体跟踪器
#[derive(Debug, Clone, Default)]
pub struct LimbTracker {
    limbs: Vec<TrackedLimb>,
}

impl LimbTracker {
    /// 为每个肢体配置创建运动学刚体，初始放在视口上方
    pub fn new(config: &PhysicsConfig, world: &mut PhysicsWorld, viewport: Viewport) -> Self {
        let parked = Vec2::new(viewport.width / 2.0, -viewport.height);
        let limbs = config
            .limbs
            .iter()
            .map(|limb| {
                let (shape, length) = match limb.shape {
                    LimbShape::Hand { radius, .. } => (BodyShape::Circle { radius }, radius * 2.0),
                    LimbShape::Arm { thickness, .. } => (
                        BodyShape::Rect {
                            width: thickness,
                            height: thickness,
                        },
                        thickness,
                    ),
                };
                let body = world.create_body(
                    shape,
                    BodyParams {
                        kind: BodyKind::Kinematic,
                        position: parked,
                        friction: config.friction,
                        ..BodyParams::default()
                    },
                );
                TrackedLimb {
                    config: limb.clone(),
                    body,
                    pose: LimbPose {
                        center: parked,
                        angle: 0.0,
                        length,
                    },
                }
            })
            .collect();
        Self { limbs }
    }

    pub fn limbs(&self) -> &[TrackedLimb] {
        &self.limbs
    }

    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    /// 刚体是否属于某个肢体
    pub fn is_limb(&self, handle: BodyHandle) -> bool {
        self.limbs.iter().any(|l| l.body == handle)
    }

    /// 根据最新姿态移动肢体，返回本帧移动的肢体数
    ///
    /// 每个肢体取第一个驱动关键点足够可信的姿态。
    pub fn update(&mut self, poses: &[Pose], world: &mut PhysicsWorld) -> usize {
        let mut moved = 0;
        for limb in &mut self.limbs {
            let Some(target) = poses.iter().find_map(|pose| limb.target(pose)) else {
                continue;
            };

            world.set_position(limb.body, target.center);
            if let LimbShape::Arm { thickness, .. } = limb.config.shape {
                world.set_angle(limb.body, target.angle);
                world.set_rect_size(limb.body, target.length, thickness);
            }
            limb.pose = target;
            moved += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{BodyPart, Keypoint};
    use std::f32::consts::FRAC_PI_2;

    fn setup(limbs: Vec<LimbConfig>) -> (LimbTracker, PhysicsWorld) {
        let config = PhysicsConfig {
            limbs,
            ..PhysicsConfig::default()
        };
        let mut world = PhysicsWorld::new(&config).unwrap();
        let tracker = LimbTracker::new(&config, &mut world, Viewport::new(640, 480));
        (tracker, world)
    }

    fn wrist(x: f32, y: f32, score: f32) -> Pose {
        Pose::new(vec![Keypoint::new(
            BodyPart::RightWrist,
            Vec2::new(x, y),
            score,
        )])
    }

    #[test]
    fn test_arm_pose_geometry() {
        let pose = arm_pose(Vec2::new(100.0, 100.0), Vec2::new(100.0, 200.0));
        assert_eq!(pose.center, Vec2::new(100.0, 150.0));
        assert!((pose.angle - FRAC_PI_2).abs() < 1e-6);
        assert!((pose.length - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_hand_follows_confident_keypoint() {
        let (mut tracker, mut world) =
            setup(vec![LimbConfig::hand(BodyPart::RightWrist, 40.0, 0.5)]);

        assert_eq!(tracker.update(&[wrist(200.0, 300.0, 0.8)], &mut world), 1);
        world.step(1.0 / 60.0);

        let limb = &tracker.limbs()[0];
        assert_eq!(limb.pose().center, Vec2::new(200.0, 300.0));
        let body = world.position(limb.body()).unwrap();
        assert!((body - Vec2::new(200.0, 300.0)).length() < 1e-2);
    }

    #[test]
    fn test_hand_holds_on_low_confidence() {
        let (mut tracker, mut world) =
            setup(vec![LimbConfig::hand(BodyPart::RightWrist, 40.0, 0.9)]);

        tracker.update(&[wrist(200.0, 300.0, 0.95)], &mut world);
        let held = tracker.limbs()[0].pose();

        assert_eq!(tracker.update(&[wrist(10.0, 10.0, 0.9)], &mut world), 0);
        assert_eq!(tracker.update(&[], &mut world), 0);
        assert_eq!(tracker.limbs()[0].pose(), held);
    }

    #[test]
    fn test_arm_needs_both_keypoints() {
        let (mut tracker, mut world) = setup(vec![LimbConfig::arm(
            BodyPart::RightElbow,
            BodyPart::RightWrist,
            24.0,
            0.5,
        )]);
        let before = tracker.limbs()[0].pose();

        let half = Pose::new(vec![
            Keypoint::new(BodyPart::RightElbow, Vec2::new(100.0, 100.0), 0.9),
            Keypoint::new(BodyPart::RightWrist, Vec2::new(200.0, 100.0), 0.2),
        ]);
        assert_eq!(tracker.update(&[half], &mut world), 0);
        assert_eq!(tracker.limbs()[0].pose(), before);

        let full = Pose::new(vec![
            Keypoint::new(BodyPart::RightElbow, Vec2::new(100.0, 100.0), 0.9),
            Keypoint::new(BodyPart::RightWrist, Vec2::new(200.0, 100.0), 0.9),
        ]);
        assert_eq!(tracker.update(&[full], &mut world), 1);
        let pose = tracker.limbs()[0].pose();
        assert_eq!(pose.center, Vec2::new(150.0, 100.0));
        assert_eq!(pose.angle, 0.0);
        assert_eq!(pose.length, 100.0);
    }

    #[test]
    fn test_limb_bodies_are_known() {
        let (tracker, world) = setup(vec![
            LimbConfig::hand(BodyPart::LeftWrist, 40.0, 0.9),
            LimbConfig::hand(BodyPart::RightWrist, 40.0, 0.9),
        ]);

        assert_eq!(tracker.len(), 2);
        assert_eq!(world.body_count(), 2);
        assert!(tracker.limbs().iter().all(|l| tracker.is_limb(l.body())));
    }
}
