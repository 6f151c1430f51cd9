//! 软件光栅化画布
//!
//! 把绘制调用直接光栅化到 `RgbaImage`，用于无头运行时导出快照。
//! 只做填充，不做抗锯齿。

use std::path::Path;

use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};

use crate::core::error::RenderResult;
use crate::core::LOG_TARGET;

use super::{Color, RenderSurface, VideoFrame};

/// 软件画布
pub struct Canvas {
    target: RgbaImage,
    transform: Affine2,
    stack: Vec<Affine2>,
    fill: Color,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: RgbaImage::new(width.max(1), height.max(1)),
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
            fill: Color::WHITE,
        }
    }

    pub fn target(&self) -> &RgbaImage {
        &self.target
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.target.width() || y >= self.target.height() {
            return None;
        }
        let p = self.target.get_pixel(x, y).0;
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// 保存为PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        self.target.save(path)?;
        Ok(())
    }

    /// 局部矩形 `[min, max]` 变换到设备空间后的像素包围盒
    fn device_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
        .map(|c| self.transform.transform_point2(c));

        let lo = corners.iter().fold(Vec2::splat(f32::INFINITY), |a, c| a.min(*c));
        let hi = corners
            .iter()
            .fold(Vec2::splat(f32::NEG_INFINITY), |a, c| a.max(*c));

        let (w, h) = (self.target.width() as f32, self.target.height() as f32);
        if !lo.is_finite() || !hi.is_finite() || hi.x < 0.0 || hi.y < 0.0 || lo.x >= w || lo.y >= h
        {
            return None;
        }

        let x0 = lo.x.max(0.0).floor() as u32;
        let y0 = lo.y.max(0.0).floor() as u32;
        let x1 = hi.x.min(w - 1.0).ceil() as u32;
        let y1 = hi.y.min(h - 1.0).ceil() as u32;
        Some((x0, y0, x1, y1))
    }

    /// 对包围盒内每个像素调用 `shade(局部坐标)`，返回 `Some` 时写入
    fn raster<F>(&mut self, min: Vec2, max: Vec2, mut shade: F)
    where
        F: FnMut(Vec2) -> Option<Color>,
    {
        if self.transform.matrix2.determinant().abs() < f32::EPSILON {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.device_bounds(min, max) else {
            return;
        };
        let inverse = self.transform.inverse();

        for y in y0..=y1 {
            for x in x0..=x1 {
                let local = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if let Some(color) = shade(local) {
                    let dst = self.target.get_pixel_mut(x, y);
                    *dst = Rgba(color.blend_over(dst.0));
                }
            }
        }
    }
}

impl RenderSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.target.dimensions()
    }

    fn background(&mut self, color: Color) {
        for px in self.target.pixels_mut() {
            *px = Rgba(color.to_array());
        }
    }

    fn fill(&mut self, color: Color) {
        self.fill = color;
    }

    fn no_stroke(&mut self) {}

    fn ellipse(&mut self, center: Vec2, size: Vec2) {
        let radii = size.abs() * 0.5;
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let fill = self.fill;
        self.raster(center - radii, center + radii, |p| {
            let d = (p - center) / radii;
            (d.length_squared() <= 1.0).then_some(fill)
        });
    }

    fn rect(&mut self, center: Vec2, size: Vec2) {
        let half = size.abs() * 0.5;
        let fill = self.fill;
        self.raster(center - half, center + half, |p| {
            let d = (p - center).abs();
            (d.x <= half.x && d.y <= half.y).then_some(fill)
        });
    }

    fn image(&mut self, frame: &VideoFrame, origin: Vec2, size: Vec2) {
        if size.x <= 0.0 || size.y <= 0.0 || frame.width() == 0 || frame.height() == 0 {
            return;
        }
        let frame_size = Vec2::new(frame.width() as f32, frame.height() as f32);
        self.raster(origin, origin + size, |p| {
            let uv = (p - origin) / size;
            if uv.x < 0.0 || uv.y < 0.0 || uv.x >= 1.0 || uv.y >= 1.0 {
                return None;
            }
            let texel = (uv * frame_size).floor();
            let px = frame.get_pixel(texel.x as u32, texel.y as u32).0;
            Some(Color::rgba(px[0], px[1], px[2], px[3]))
        });
    }

    fn push(&mut self) {
        self.stack.push(self.transform);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(t) => self.transform = t,
            None => tracing::warn!(target: LOG_TARGET, "pop() without matching push()"),
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    fn scale(&mut self, factor: Vec2) {
        self.transform = self.transform * Affine2::from_scale(factor);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }
}
