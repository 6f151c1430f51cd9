//! 合成姿态数据源
//!
//! 没有相机和模型时用随机游走的人形代替推理结果。推理间隔默认比帧间隔长，
//! 所以消费方会多次读到同一个旧结果，和真实模型落后于帧率时的表现一致。

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::source::{PoseCallback, PoseEvent, PoseSource, Subscribers};
use super::{BodyPart, Keypoint, Pose};

/// 人形骨架的静止偏移（以躯干中心为原点，像素）
const SKELETON: [(BodyPart, f32, f32); 18] = [
    (BodyPart::Nose, 0.0, -110.0),
    (BodyPart::Mouth, 0.0, -95.0),
    (BodyPart::LeftEye, -12.0, -122.0),
    (BodyPart::RightEye, 12.0, -122.0),
    (BodyPart::LeftEar, -24.0, -116.0),
    (BodyPart::RightEar, 24.0, -116.0),
    (BodyPart::LeftShoulder, -50.0, -60.0),
    (BodyPart::RightShoulder, 50.0, -60.0),
    (BodyPart::LeftElbow, -85.0, -10.0),
    (BodyPart::RightElbow, 85.0, -10.0),
    (BodyPart::LeftWrist, -95.0, 45.0),
    (BodyPart::RightWrist, 95.0, 45.0),
    (BodyPart::LeftHip, -35.0, 50.0),
    (BodyPart::RightHip, 35.0, 50.0),
    (BodyPart::LeftKnee, -38.0, 130.0),
    (BodyPart::RightKnee, 38.0, 130.0),
    (BodyPart::LeftAnkle, -40.0, 205.0),
    (BodyPart::RightAnkle, 40.0, 205.0),
];

/// 随机游走的合成人形
pub struct SyntheticPoseSource {
    rng: StdRng,
    subscribers: Subscribers,
    bounds: Vec2,
    center: Vec2,
    velocity: Vec2,
    /// 模拟模型加载耗时
    load_ms: u64,
    /// 模拟推理耗时
    inference_ms: u64,
    started_at: Option<u64>,
    last_inference: Option<u64>,
    ready_sent: bool,
}

impl SyntheticPoseSource {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let bounds = Vec2::new(width as f32, height as f32);
        Self {
            rng: StdRng::seed_from_u64(seed),
            subscribers: Subscribers::new(),
            bounds,
            center: bounds * 0.5,
            velocity: Vec2::ZERO,
            load_ms: 300,
            inference_ms: 33,
            started_at: None,
            last_inference: None,
            ready_sent: false,
        }
    }

    pub fn with_load_ms(mut self, load_ms: u64) -> Self {
        self.load_ms = load_ms;
        self
    }

    pub fn with_inference_ms(mut self, inference_ms: u64) -> Self {
        self.inference_ms = inference_ms.max(1);
        self
    }

    /// 生成当前时刻的人形
    fn sample(&mut self, now_ms: u64) -> Pose {
        let jitter = Vec2::new(self.rng.gen_range(-2.0..2.0), self.rng.gen_range(-2.0..2.0));
        self.velocity = (self.velocity + jitter).clamp_length_max(6.0);
        self.center += self.velocity;

        let margin = Vec2::new(100.0, 130.0);
        let lo = margin;
        let hi = (self.bounds - margin).max(lo);
        if self.center.x < lo.x || self.center.x > hi.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.center.y < lo.y || self.center.y > hi.y {
            self.velocity.y = -self.velocity.y;
        }
        self.center = self.center.clamp(lo, hi);

        // 双臂摆动
        let phase = now_ms as f32 / 400.0;
        let keypoints = SKELETON
            .iter()
            .map(|(part, dx, dy)| {
                let mut offset = Vec2::new(*dx, *dy);
                match part {
                    BodyPart::LeftWrist | BodyPart::LeftElbow => offset.y -= 40.0 * phase.sin(),
                    BodyPart::RightWrist | BodyPart::RightElbow => offset.y += 40.0 * phase.sin(),
                    _ => {}
                }
                let score = self.rng.gen_range(0.3..1.0);
                Keypoint::new(part.clone(), self.center + offset, score)
            })
            .collect();

        Pose::new(keypoints)
    }
}

impl PoseSource for SyntheticPoseSource {
    fn subscribe(&mut self, callback: PoseCallback) {
        self.subscribers.push(callback);
    }

    fn pump(&mut self, now_ms: u64) -> usize {
        let started_at = *self.started_at.get_or_insert(now_ms);
        let mut emitted = 0;

        if !self.ready_sent {
            if now_ms.saturating_sub(started_at) < self.load_ms {
                return 0;
            }
            self.ready_sent = true;
            self.subscribers.emit(PoseEvent::ModelReady);
            emitted += 1;
        }

        let due = self
            .last_inference
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.inference_ms);
        if due {
            self.last_inference = Some(now_ms);
            let pose = self.sample(now_ms);
            self.subscribers.emit(PoseEvent::Poses(vec![pose]));
            emitted += 1;
        }

        emitted
    }
}
