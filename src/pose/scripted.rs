//! 脚本化姿态数据源
//!
//! 从 JSON 时间线回放预先录制的推理结果，用于无头运行和测试。
//!
//! ```json
//! {
//!   "ready_after_ms": 500,
//!   "looped": true,
//!   "frames": [
//!     { "at_ms": 0,   "poses": [ { "keypoints": [ ... ] } ] },
//!     { "at_ms": 33,  "poses": [] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PoseError, PoseResult};

use super::source::{PoseCallback, PoseEvent, PoseSource, Subscribers};
use super::Pose;

/// 时间线上的一帧推理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// 相对数据源启动时刻的偏移
    pub at_ms: u64,
    #[serde(default)]
    pub poses: Vec<Pose>,
}

/// 姿态时间线
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseScript {
    /// 模拟模型加载耗时
    #[serde(default)]
    pub ready_after_ms: u64,
    /// 播放完毕后从头开始
    #[serde(default)]
    pub looped: bool,
    pub frames: Vec<ScriptFrame>,
}

impl PoseScript {
    /// 从JSON字符串解析时间线
    pub fn from_json_str(content: &str) -> PoseResult<Self> {
        let mut script: PoseScript = serde_json::from_str(content)
            .map_err(|e| PoseError::InvalidScript(e.to_string()))?;
        script.frames.sort_by_key(|f| f.at_ms);
        Ok(script)
    }

    /// 从JSON文件加载时间线
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PoseResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PoseError::ScriptIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// 时间线总长度
    pub fn duration_ms(&self) -> u64 {
        self.frames.last().map(|f| f.at_ms).unwrap_or(0)
    }
}

/// 回放 [`PoseScript`] 的数据源
pub struct ScriptedPoseSource {
    script: PoseScript,
    subscribers: Subscribers,
    started_at: Option<u64>,
    /// 下一帧在时间线中的位置
    cursor: usize,
    ready_sent: bool,
}

impl ScriptedPoseSource {
    pub fn new(script: PoseScript) -> Self {
        Self {
            script,
            subscribers: Subscribers::new(),
            started_at: None,
            cursor: 0,
            ready_sent: false,
        }
    }

    /// 从JSON文件创建
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PoseResult<Self> {
        Ok(Self::new(PoseScript::from_json_file(path)?))
    }

    pub fn script(&self) -> &PoseScript {
        &self.script
    }

    /// 时间线是否已播放完毕（循环模式下永远为否）
    pub fn is_finished(&self) -> bool {
        !self.script.looped && self.cursor >= self.script.frames.len()
    }
}

impl PoseSource for ScriptedPoseSource {
    fn subscribe(&mut self, callback: PoseCallback) {
        self.subscribers.push(callback);
    }

    fn pump(&mut self, now_ms: u64) -> usize {
        let started_at = *self.started_at.get_or_insert(now_ms);
        let elapsed = now_ms.saturating_sub(started_at);
        let mut emitted = 0;

        if !self.ready_sent {
            if elapsed < self.script.ready_after_ms {
                return 0;
            }
            self.ready_sent = true;
            self.subscribers.emit(PoseEvent::ModelReady);
            emitted += 1;
        }

        if self.script.frames.is_empty() {
            return emitted;
        }

        let mut offset = elapsed.saturating_sub(self.script.ready_after_ms);
        if self.script.looped && self.cursor >= self.script.frames.len() {
            self.cursor = 0;
            self.started_at = Some(now_ms.saturating_sub(self.script.ready_after_ms));
            offset = 0;
        }

        // 只派发已经到期的最新一帧，跳过中间帧
        let mut due = None;
        while self.cursor < self.script.frames.len()
            && self.script.frames[self.cursor].at_ms <= offset
        {
            due = Some(self.cursor);
            self.cursor += 1;
        }

        if let Some(index) = due {
            let poses = self.script.frames[index].poses.clone();
            self.subscribers.emit(PoseEvent::Poses(poses));
            emitted += 1;
        }

        emitted
    }
}
