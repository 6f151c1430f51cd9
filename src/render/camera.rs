//! 相机输入
//!
//! 相机不可用（权限被拒绝、设备缺失）时 `latest` 返回 `None`，草图照常运行，只是不画背景画面。

use image::{Rgba, RgbaImage};

/// 一帧相机画面
pub type VideoFrame = RgbaImage;

/// 相机画面来源
pub trait CameraFeed {
    /// 最新一帧画面
    fn latest(&mut self, now_ms: u64) -> Option<&VideoFrame>;
}

/// 无相机
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl CameraFeed for NoCamera {
    fn latest(&mut self, _now_ms: u64) -> Option<&VideoFrame> {
        None
    }
}

/// 生成缓慢滚动渐变的测试画面
pub struct TestPatternCamera {
    frame: VideoFrame,
    last_ms: Option<u64>,
}

impl TestPatternCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::new(width.max(1), height.max(1)),
            last_ms: None,
        }
    }

    fn paint(&mut self, now_ms: u64) {
        let (w, h) = self.frame.dimensions();
        let shift = ((now_ms / 20) % w as u64) as u32;
        for (x, y, px) in self.frame.enumerate_pixels_mut() {
            let r = ((((x + shift) % w) * 255) / w) as u8;
            let g = ((y * 255) / h) as u8;
            *px = Rgba([r / 3, g / 3, 60, 255]);
        }
    }
}

impl CameraFeed for TestPatternCamera {
    fn latest(&mut self, now_ms: u64) -> Option<&VideoFrame> {
        if self.last_ms != Some(now_ms) {
            self.paint(now_ms);
            self.last_ms = Some(now_ms);
        }
        Some(&self.frame)
    }
}
