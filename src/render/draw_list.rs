//! 绘制调用记录器
//!
//! 把立即模式调用记录成 [`DrawCommand`] 序列，用于测试和调试输出。

use glam::Vec2;
use serde::Serialize;

use crate::core::error::{RenderError, RenderResult};
use crate::core::LOG_TARGET;

use super::{Color, RenderSurface, VideoFrame};

/// 一条绘制调用
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Background { color: Color },
    Fill { color: Color },
    NoStroke,
    Ellipse { center: [f32; 2], size: [f32; 2] },
    Rect { center: [f32; 2], size: [f32; 2] },
    Image { origin: [f32; 2], size: [f32; 2], frame: [u32; 2] },
    Push,
    Pop,
    Translate { offset: [f32; 2] },
    Scale { factor: [f32; 2] },
    Rotate { radians: f32 },
}

/// 绘制调用记录器
#[derive(Debug, Clone)]
pub struct DrawList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    depth: usize,
    /// 多余的 `pop` 次数
    underflows: usize,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            depth: 0,
            underflows: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// 当前变换栈深度
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// 椭圆调用数
    pub fn ellipse_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ellipse { .. }))
            .count()
    }

    /// 清空记录，开始新的一帧
    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
        self.underflows = 0;
    }

    /// 结束一帧并取出记录，变换栈未平衡时报错
    pub fn finish(&mut self) -> RenderResult<Vec<DrawCommand>> {
        if self.depth != 0 {
            return Err(RenderError::UnbalancedTransform(self.depth));
        }
        self.underflows = 0;
        Ok(std::mem::take(&mut self.commands))
    }

    /// 导出为JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.commands)
    }
}

impl RenderSurface for DrawList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background { color });
    }

    fn fill(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fill { color });
    }

    fn no_stroke(&mut self) {
        self.commands.push(DrawCommand::NoStroke);
    }

    fn ellipse(&mut self, center: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Ellipse {
            center: center.to_array(),
            size: size.to_array(),
        });
    }

    fn rect(&mut self, center: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Rect {
            center: center.to_array(),
            size: size.to_array(),
        });
    }

    fn image(&mut self, frame: &VideoFrame, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Image {
            origin: origin.to_array(),
            size: size.to_array(),
            frame: [frame.width(), frame.height()],
        });
    }

    fn push(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Push);
    }

    fn pop(&mut self) {
        if self.depth == 0 {
            self.underflows += 1;
            tracing::warn!(target: LOG_TARGET, "pop() without matching push()");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Pop);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate {
            offset: offset.to_array(),
        });
    }

    fn scale(&mut self, factor: Vec2) {
        self.commands.push(DrawCommand::Scale {
            factor: factor.to_array(),
        });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate { radians });
    }
}
