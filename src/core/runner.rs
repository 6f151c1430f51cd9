//! 无头运行器
//!
//! 用模拟的 60fps 时钟驱动一个会话若干帧，不需要窗口或相机。
//! 运行结束后可选地把最后一帧光栅化成 PNG。

use std::path::PathBuf;

use crate::config::SketchConfig;
use crate::pose::{PoseSource, ScriptedPoseSource, SyntheticPoseSource};
use crate::render::{Canvas, CameraFeed, NoCamera, TestPatternCamera};
use crate::sketch::{FrameReport, SketchSession};

use super::error::SketchResult;
use super::logging::init_logging;
use super::LOG_TARGET;

/// 默认帧间隔（约 60fps）
pub const FRAME_MS: u64 = 16;

/// 姿态输入
#[derive(Debug, Clone, PartialEq)]
pub enum PoseInput {
    /// 回放 JSON 时间线
    Script(PathBuf),
    /// 随机游走的合成人形
    Synthetic { seed: u64 },
}

/// 运行选项
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: SketchConfig,
    pub poses: PoseInput,
    /// 模拟帧数
    pub frames: u64,
    /// 帧间隔（毫秒）
    pub frame_ms: u64,
    /// 是否生成测试相机画面
    pub camera: bool,
    /// 最后一帧快照输出路径
    pub snapshot: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(config: SketchConfig, poses: PoseInput) -> Self {
        Self {
            config,
            poses,
            frames: 600,
            frame_ms: FRAME_MS,
            camera: true,
            snapshot: None,
        }
    }
}

/// 运行汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub spawned: usize,
    pub evicted: usize,
    pub retired: usize,
    pub contacts: usize,
    pub impulses: usize,
    /// 运行期间的最大存活数
    pub peak_live: usize,
    pub final_live: usize,
    /// 结束时的状态文本
    pub status: String,
    pub snapshot: Option<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.spawned += report.spawned;
        self.evicted += report.evicted;
        self.retired += report.retired;
        self.contacts += report.contacts;
        self.impulses += report.impulses;
        self.peak_live = self.peak_live.max(report.live);
        self.final_live = report.live;
    }
}

/// 无头运行器
pub struct SketchRunner;

impl SketchRunner {
    /// 运行一个会话直到帧数用完
    pub fn run(options: RunOptions) -> SketchResult<RunSummary> {
        init_logging(&options.config.logging);

        let width = options.config.canvas.width;
        let height = options.config.canvas.height;
        let mut session = SketchSession::new(options.config.clone())?;

        let mut source: Box<dyn PoseSource> = match &options.poses {
            PoseInput::Script(path) => Box::new(ScriptedPoseSource::from_json_file(path)?),
            PoseInput::Synthetic { seed } => {
                Box::new(SyntheticPoseSource::new(width, height, *seed))
            }
        };
        session.attach(source.as_mut());

        let mut camera: Box<dyn CameraFeed> = if options.camera {
            Box::new(TestPatternCamera::new(width, height))
        } else {
            Box::new(NoCamera)
        };

        let mut summary = RunSummary::default();
        let mut now = 0;
        for frame in 0..options.frames {
            now = frame * options.frame_ms;
            let _span = tracing::debug_span!(target: LOG_TARGET, "frame", frame).entered();
            source.pump(now);
            let report = session.update(now);
            summary.record(&report);
        }

        if let Some(path) = &options.snapshot {
            let mut canvas = Canvas::new(width, height);
            session.draw(&mut canvas, camera.latest(now));
            canvas.save_png(path)?;
            summary.snapshot = Some(path.clone());
            tracing::info!(target: LOG_TARGET, "Snapshot written to {}", path.display());
        }

        summary.status = session.status().to_string();
        tracing::info!(
            target: LOG_TARGET,
            "Run finished: {} frames, {} spawned, {} evicted, {} retired, {} impulses, peak {} live, status \"{}\"",
            summary.frames,
            summary.spawned,
            summary.evicted,
            summary.retired,
            summary.impulses,
            summary.peak_live,
            summary.status
        );
        Ok(summary)
    }
}
