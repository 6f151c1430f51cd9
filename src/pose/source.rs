//! 姿态数据源抽象
//!
//! 数据源在每次推理完成时调用订阅回调，回调只做一件事：覆盖"最新姿态"槽。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::slot::LatestSlot;
use crate::core::LOG_TARGET;

use super::Pose;

/// 数据源事件
#[derive(Debug, Clone, PartialEq)]
pub enum PoseEvent {
    /// 模型加载完成，只发送一次
    ModelReady,
    /// 一次推理的结果
    Poses(Vec<Pose>),
}

/// 订阅回调
pub type PoseCallback = Box<dyn FnMut(PoseEvent) + Send>;

/// 姿态数据源
///
/// 宿主事件循环每帧调用一次 `pump`，数据源借此把已完成的推理结果派发给订阅者。
/// 数据源永远不会阻塞等待推理。
pub trait PoseSource {
    /// 注册回调
    fn subscribe(&mut self, callback: PoseCallback);

    /// 派发截至 `now_ms` 已完成的事件，返回派发的事件数
    fn pump(&mut self, now_ms: u64) -> usize;
}

/// 回调列表，供数据源实现复用
#[derive(Default)]
pub struct Subscribers {
    callbacks: Vec<PoseCallback>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: PoseCallback) {
        self.callbacks.push(callback);
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// 向所有订阅者广播事件
    pub fn emit(&mut self, event: PoseEvent) {
        if let Some((last, rest)) = self.callbacks.split_last_mut() {
            for callback in rest {
                callback(event.clone());
            }
            last(event);
        }
    }
}

/// 最新姿态槽 + 模型就绪标志
#[derive(Clone, Default)]
pub struct LatestPoses {
    poses: LatestSlot<Vec<Pose>>,
    ready: Arc<AtomicBool>,
}

impl LatestPoses {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成写入本槽的回调
    pub fn callback(&self) -> PoseCallback {
        let sink = self.clone();
        Box::new(move |event| sink.accept(event))
    }

    /// 处理一个数据源事件
    pub fn accept(&self, event: PoseEvent) {
        match event {
            PoseEvent::ModelReady => {
                if !self.ready.swap(true, Ordering::SeqCst) {
                    tracing::info!(target: LOG_TARGET, "Pose model ready");
                }
            }
            PoseEvent::Poses(poses) => self.poses.write(poses),
        }
    }

    /// 最新姿态（可能是旧值）
    pub fn latest(&self) -> Option<Arc<Vec<Pose>>> {
        self.poses.read()
    }

    /// 模型是否已就绪
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 已接收的推理结果数
    pub fn generation(&self) -> u64 {
        self.poses.generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{BodyPart, Keypoint};
    use glam::Vec2;

    fn one_pose(x: f32) -> Vec<Pose> {
        vec![Pose::new(vec![Keypoint::new(
            BodyPart::Nose,
            Vec2::new(x, 0.0),
            0.9,
        )])]
    }

    #[test]
    fn test_callback_overwrites_latest() {
        let latest = LatestPoses::new();
        let mut callback = latest.callback();

        callback(PoseEvent::Poses(one_pose(1.0)));
        callback(PoseEvent::Poses(one_pose(2.0)));

        let poses = latest.latest().unwrap();
        assert_eq!(poses[0].keypoints[0].position.x, 2.0);
        assert_eq!(latest.generation(), 2);
    }

    #[test]
    fn test_ready_flag() {
        let latest = LatestPoses::new();
        assert!(!latest.is_ready());

        latest.accept(PoseEvent::ModelReady);
        latest.accept(PoseEvent::ModelReady);
        assert!(latest.is_ready());
    }

    #[test]
    fn test_subscribers_broadcast() {
        let a = LatestPoses::new();
        let b = LatestPoses::new();
        let mut subscribers = Subscribers::new();
        subscribers.push(a.callback());
        subscribers.push(b.callback());

        subscribers.emit(PoseEvent::Poses(one_pose(5.0)));

        assert!(a.latest().is_some());
        assert!(b.latest().is_some());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let mut subscribers = Subscribers::new();
        subscribers.emit(PoseEvent::ModelReady);
        assert!(subscribers.is_empty());
    }
}
