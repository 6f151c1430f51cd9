//! 地面与左右墙壁
//!
//! 三个固定刚体放在视口外侧，视口尺寸变化时整体重建。

use glam::Vec2;

use crate::render::Viewport;

use super::{BodyHandle, BodyKind, BodyParams, BodyShape, PhysicsWorld};

/// 视口边界刚体
#[derive(Debug, Default)]
pub struct Boundary {
    handles: Vec<BodyHandle>,
    viewport: Option<Viewport>,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按视口尺寸（重新）创建地面和墙壁
    pub fn rebuild(&mut self, world: &mut PhysicsWorld, viewport: Viewport, thickness: f32) {
        self.clear(world);

        let Viewport { width, height } = viewport;
        let half = thickness / 2.0;
        // 墙壁向上延伸一个视口高度，防止石子从顶部飞出后越过墙
        let wall_height = height * 3.0;

        let pieces = [
            // 地面：上沿与视口底边对齐
            (
                Vec2::new(width / 2.0, height + half),
                Vec2::new(width + thickness * 2.0, thickness),
            ),
            // 左墙
            (
                Vec2::new(-half, height / 2.0 - height),
                Vec2::new(thickness, wall_height),
            ),
            // 右墙
            (
                Vec2::new(width + half, height / 2.0 - height),
                Vec2::new(thickness, wall_height),
            ),
        ];

        for (center, size) in pieces {
            let handle = world.create_body(
                BodyShape::Rect {
                    width: size.x,
                    height: size.y,
                },
                BodyParams {
                    kind: BodyKind::Fixed,
                    position: center,
                    ..BodyParams::default()
                },
            );
            self.handles.push(handle);
        }

        self.viewport = Some(viewport);
    }

    /// 移除所有边界刚体
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        for handle in self.handles.drain(..) {
            world.remove(handle);
        }
        self.viewport = None;
    }

    pub fn handles(&self) -> &[BodyHandle] {
        &self.handles
    }

    /// 当前边界对应的视口
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}
