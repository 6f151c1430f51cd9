//! 生成策略：从关键点推导生成请求
//!
//! 每个去抖窗口最多处理一批。窗口在 `now - last_processed >= debounce` 时打开，
//! 处理后立即以 `now` 重新计时，即使这一批没有产生任何请求。

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ColorMode, KeypointFilter, SpawnConfig};
use crate::pose::{Keypoint, Pose};
use crate::render::{Color, Viewport};

/// 一次生成请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
}

/// 生成策略
#[derive(Debug)]
pub struct SpawnPolicy {
    config: SpawnConfig,
    last_processed: Option<u64>,
    rng: StdRng,
}

impl SpawnPolicy {
    pub fn new(config: SpawnConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            last_processed: None,
            rng,
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// 上一次处理窗口的时刻
    pub fn last_processed(&self) -> Option<u64> {
        self.last_processed
    }

    /// 当前时刻是否可以处理新窗口
    pub fn window_open(&self, now_ms: u64) -> bool {
        match self.last_processed {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.debounce_ms,
        }
    }

    /// 关键点是否通过过滤和置信度阈值
    fn selected<'a>(&'a self, pose: &'a Pose) -> impl Iterator<Item = &'a Keypoint> + 'a {
        let candidates: Box<dyn Iterator<Item = &'a Keypoint> + 'a> = match &self.config.filter {
            KeypointFilter::First => Box::new(pose.keypoints.iter().take(1)),
            KeypointFilter::All => Box::new(pose.keypoints.iter()),
            KeypointFilter::Parts { parts } => {
                Box::new(pose.keypoints.iter().filter(move |k| parts.contains(&k.part)))
            }
        };
        let threshold = self.config.min_score;
        candidates.filter(move |k| k.is_confident(threshold))
    }

    /// 处理一个窗口；窗口未打开时返回空
    pub fn collect(&mut self, now_ms: u64, poses: &[Pose]) -> Vec<SpawnRequest> {
        if !self.window_open(now_ms) {
            return Vec::new();
        }
        self.last_processed = Some(now_ms);

        let positions: Vec<Vec2> = poses
            .iter()
            .flat_map(|pose| self.selected(pose))
            .map(|k| k.position)
            .collect();

        positions
            .into_iter()
            .map(|position| self.request_at(position))
            .collect()
    }

    /// 在视口内随机撒下 `count` 颗
    pub fn scatter(&mut self, count: usize, viewport: Viewport) -> Vec<SpawnRequest> {
        (0..count)
            .map(|_| {
                let position = Vec2::new(
                    self.rng.gen_range(0.0..viewport.width.max(1.0)),
                    self.rng.gen_range(0.0..viewport.height.max(1.0)),
                );
                self.request_at(position)
            })
            .collect()
    }

    fn request_at(&mut self, position: Vec2) -> SpawnRequest {
        let size = self
            .rng
            .gen_range(self.config.size_min..=self.config.size_max);
        let color = match self.config.color {
            ColorMode::Fixed { color } => color,
            ColorMode::RandomHue {
                saturation,
                brightness,
            } => Color::from_hsb(self.rng.gen_range(0.0..360.0), saturation, brightness),
        };
        SpawnRequest {
            position,
            size,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::pose::BodyPart;

    fn policy(variant: Variant) -> SpawnPolicy {
        let mut config = variant.config().spawn;
        config.seed = Some(7);
        SpawnPolicy::new(config)
    }

    fn pose(points: &[(BodyPart, f32, f32, f32)]) -> Pose {
        Pose::new(
            points
                .iter()
                .map(|(part, x, y, score)| Keypoint::new(part.clone(), Vec2::new(*x, *y), *score))
                .collect(),
        )
    }

    #[test]
    fn test_mouth_keypoint_spawns_one_pebble() {
        let mut spawner = policy(Variant::Sweep);
        spawner.last_processed = Some(1000);
        let poses = vec![pose(&[
            (BodyPart::Mouth, 320.0, 200.0, 0.9),
            (BodyPart::LeftWrist, 100.0, 100.0, 0.95),
        ])];

        let requests = spawner.collect(1200, &poses);

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].position, Vec2::new(320.0, 200.0));
        assert!((4.0..=40.0).contains(&requests[0].size));
    }

    #[test]
    fn test_debounce_window() {
        let mut spawner = policy(Variant::Bounce);
        let poses = vec![pose(&[(BodyPart::Nose, 10.0, 10.0, 0.9)])];

        assert_eq!(spawner.collect(0, &poses).len(), 1);
        assert!(spawner.collect(149, &poses).is_empty());
        assert_eq!(spawner.collect(150, &poses).len(), 1);
        assert_eq!(spawner.last_processed(), Some(150));
    }

    #[test]
    fn test_score_threshold_is_strict() {
        let mut spawner = policy(Variant::Cascade);
        let poses = vec![pose(&[
            (BodyPart::Nose, 0.0, 0.0, 0.5),
            (BodyPart::LeftEye, 0.0, 0.0, 0.51),
        ])];

        assert_eq!(spawner.collect(0, &poses).len(), 1);
    }

    #[test]
    fn test_first_filter_takes_one_per_pose() {
        let mut spawner = policy(Variant::Fall);
        let poses = vec![
            pose(&[
                (BodyPart::Nose, 1.0, 1.0, 0.9),
                (BodyPart::LeftEye, 2.0, 2.0, 0.9),
            ]),
            pose(&[(BodyPart::Nose, 3.0, 3.0, 0.9)]),
        ];

        let requests = spawner.collect(0, &poses);

        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.color == Color::RED));
    }

    #[test]
    fn test_first_filter_drops_low_score_first_keypoint() {
        let mut spawner = policy(Variant::Fall);
        let poses = vec![pose(&[
            (BodyPart::Nose, 1.0, 1.0, 0.1),
            (BodyPart::LeftEye, 2.0, 2.0, 0.9),
        ])];

        assert!(spawner.collect(0, &poses).is_empty());
    }

    #[test]
    fn test_empty_poses_still_close_window() {
        let mut spawner = policy(Variant::Catch);

        assert!(spawner.collect(0, &[]).is_empty());
        assert!(!spawner.window_open(50));
        assert!(spawner.window_open(100));
    }

    #[test]
    fn test_scatter_inside_viewport() {
        let mut spawner = policy(Variant::Fall);
        let requests = spawner.scatter(50, Viewport::new(640, 480));

        assert_eq!(requests.len(), 50);
        for r in requests {
            assert!(r.position.x >= 0.0 && r.position.x < 640.0);
            assert!(r.position.y >= 0.0 && r.position.y < 480.0);
            assert!((10.0..=40.0).contains(&r.size));
        }
    }

    #[test]
    fn test_seeded_sizes_are_reproducible() {
        let poses = vec![pose(&[(BodyPart::Nose, 0.0, 0.0, 0.9)])];
        let a = policy(Variant::Catch).collect(0, &poses);
        let b = policy(Variant::Catch).collect(0, &poses);
        assert_eq!(a, b);
    }
}
