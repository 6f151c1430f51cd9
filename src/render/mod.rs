//! 渲染表面抽象
//!
//! 草图只发出立即模式的绘制调用，不关心最终落到哪里。
//!
//! ## 设计目标
//!
//! - 与 p5 风格的画布 API 对齐：`circle`、`ellipse`、`rect`、`image`
//! - 变换只在 `push`/`pop` 作用域内生效
//! - 易于测试：[`DrawList`] 记录调用序列，[`Canvas`] 软件光栅化到图像
//!
//! ## 使用示例
//!
//! ```
//! use glam::Vec2;
//! use pose_pebbles::render::{Color, DrawList, RenderSurface};
//!
//! let mut list = DrawList::new(640, 480);
//! list.push();
//! list.translate(Vec2::new(640.0, 0.0));
//! list.scale(Vec2::new(-1.0, 1.0));
//! list.fill(Color::RED);
//! list.circle(Vec2::new(10.0, 10.0), 8.0);
//! list.pop();
//! assert_eq!(list.depth(), 0);
//! ```

pub mod camera;
pub mod canvas;
pub mod color;
pub mod draw_list;

pub use camera::{CameraFeed, NoCamera, TestPatternCamera, VideoFrame};
pub use canvas::Canvas;
pub use color::Color;
pub use draw_list::{DrawCommand, DrawList};

use glam::Vec2;

/// 立即模式 2D 绘制表面
pub trait RenderSurface {
    /// 表面尺寸（像素）
    fn size(&self) -> (u32, u32);

    /// 用纯色清屏
    fn background(&mut self, color: Color);
    /// 设置后续形状的填充色
    fn fill(&mut self, color: Color);
    /// 关闭描边
    fn no_stroke(&mut self);

    /// 圆（中心 + 直径）
    fn circle(&mut self, center: Vec2, diameter: f32) {
        self.ellipse(center, Vec2::splat(diameter));
    }
    /// 椭圆（中心 + 宽高）
    fn ellipse(&mut self, center: Vec2, size: Vec2);
    /// 以中心定位的矩形
    fn rect(&mut self, center: Vec2, size: Vec2);
    /// 绘制图像，左上角在 `origin`，缩放到 `size`
    fn image(&mut self, frame: &VideoFrame, origin: Vec2, size: Vec2);

    /// 保存当前变换
    fn push(&mut self);
    /// 恢复最近一次保存的变换
    fn pop(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, factor: Vec2);
    fn rotate(&mut self, radians: f32);
}

/// 在 `push`/`pop` 作用域内执行绘制
pub fn scoped<S, F>(surface: &mut S, draw: F)
where
    S: RenderSurface + ?Sized,
    F: FnOnce(&mut S),
{
    surface.push();
    draw(surface);
    surface.pop();
}

/// 视口尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}
