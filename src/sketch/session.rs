//! 草图会话
//!
//! 每个会话持有自己的全部状态：最新姿态槽、生成策略、石子表、运动方式和视口。
//! 宿主每帧调用一次 [`SketchSession::update`]，然后调用 [`SketchSession::draw`]。

use std::collections::VecDeque;

use glam::Vec2;

use crate::config::{LimbShape, MotionConfig, PhysicsConfig, SketchConfig, Variant};
use crate::core::error::SketchResult;
use crate::core::LOG_TARGET;
use crate::physics::{BodyKind, BodyParams, BodyShape, Boundary, PhysicsWorld};
use crate::pose::{LatestPoses, Pose, PoseSource};
use crate::render::{scoped, Color, RenderSurface, VideoFrame, Viewport};

use super::aging::AgingPolicy;
use super::collision::CollisionResponse;
use super::gravity::GravityMotion;
use super::limbs::LimbTracker;
use super::pebble::{NoBodies, PebbleStore};
use super::spawn::{SpawnPolicy, SpawnRequest};

/// 模型加载中的状态文本
pub const STATUS_LOADING: &str = "Loading model...";
/// 模型就绪后的状态文本
pub const STATUS_READY: &str = "Model Loaded";

/// 肢体绘制颜色
const LIMB_COLOR: Color = Color::rgba(255, 255, 255, 96);

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 尚未执行第一帧
    Uninitialized,
    /// 已完成初始撒点，逐帧更新中
    Running,
}

/// 单帧统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// 帧序号，从 0 开始
    pub frame: u64,
    /// 新生成的石子
    pub spawned: usize,
    /// 因数量上限淘汰的石子
    pub evicted: usize,
    /// 因寿命或落地回收的石子
    pub retired: usize,
    /// 本帧接触开始事件数
    pub contacts: usize,
    /// 本帧施加的碰撞冲量数
    pub impulses: usize,
    /// 帧末存活石子数
    pub live: usize,
}

struct PhysicsMotion {
    world: PhysicsWorld,
    boundary: Boundary,
    limbs: LimbTracker,
    aging: AgingPolicy,
    response: CollisionResponse,
    config: PhysicsConfig,
}

enum Motion {
    Gravity(GravityMotion),
    Physics(Box<PhysicsMotion>),
}

/// 草图会话
pub struct SketchSession {
    config: SketchConfig,
    latest: LatestPoses,
    spawner: SpawnPolicy,
    pebbles: PebbleStore,
    markers: VecDeque<Vec2>,
    motion: Motion,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    phase: SessionPhase,
    last_update_ms: Option<u64>,
    frame: u64,
}

impl SketchSession {
    /// 按配置创建会话
    pub fn new(config: SketchConfig) -> SketchResult<Self> {
        config.validate()?;

        let viewport = Viewport::new(config.canvas.width, config.canvas.height);
        let motion = match &config.motion {
            MotionConfig::Gravity(gravity) => Motion::Gravity(GravityMotion::new(gravity.clone())),
            MotionConfig::Physics(physics) => {
                let mut world = PhysicsWorld::new(physics)?;
                let mut boundary = Boundary::new();
                boundary.rebuild(&mut world, viewport, physics.wall_thickness);
                let limbs = LimbTracker::new(physics, &mut world, viewport);
                Motion::Physics(Box::new(PhysicsMotion {
                    world,
                    boundary,
                    limbs,
                    aging: AgingPolicy::new(physics.time_to_live_ms),
                    response: CollisionResponse::new(physics.collision_force),
                    config: physics.clone(),
                }))
            }
        };

        tracing::info!(
            target: LOG_TARGET,
            "Sketch session created: variant={}, canvas={}x{}",
            config.variant.map(|v| v.name()).unwrap_or("custom"),
            config.canvas.width,
            config.canvas.height
        );

        Ok(Self {
            spawner: SpawnPolicy::new(config.spawn.clone()),
            config,
            latest: LatestPoses::new(),
            pebbles: PebbleStore::new(),
            markers: VecDeque::new(),
            motion,
            viewport,
            pending_resize: None,
            phase: SessionPhase::Uninitialized,
            last_update_ms: None,
            frame: 0,
        })
    }

    /// 使用变体预设创建会话
    pub fn from_variant(variant: Variant) -> SketchResult<Self> {
        Self::new(variant.config())
    }

    /// 订阅姿态数据源
    pub fn attach<S: PoseSource + ?Sized>(&mut self, source: &mut S) {
        source.subscribe(self.latest.callback());
    }

    /// 最新姿态槽，可直接交给其它线程写入
    pub fn pose_sink(&self) -> &LatestPoses {
        &self.latest
    }

    /// 视口尺寸变化，推迟到下一次 `update` 开始时生效
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some(Viewport::new(width.max(1), height.max(1)));
    }

    pub fn status(&self) -> &'static str {
        if self.latest.is_ready() {
            STATUS_READY
        } else {
            STATUS_LOADING
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pebbles(&self) -> &PebbleStore {
        &self.pebbles
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 物理世界（乘法重力变体为 `None`）
    pub fn world(&self) -> Option<&PhysicsWorld> {
        match &self.motion {
            Motion::Physics(p) => Some(&p.world),
            Motion::Gravity(_) => None,
        }
    }

    /// 肢体跟踪器（乘法重力变体为 `None`）
    pub fn limbs(&self) -> Option<&LimbTracker> {
        match &self.motion {
            Motion::Physics(p) => Some(&p.limbs),
            Motion::Gravity(_) => None,
        }
    }

    fn apply_resize(&mut self) {
        let Some(viewport) = self.pending_resize.take() else {
            return;
        };
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if let Motion::Physics(p) = &mut self.motion {
            p.boundary
                .rebuild(&mut p.world, viewport, p.config.wall_thickness);
        }
        tracing::info!(
            target: LOG_TARGET,
            "Viewport resized to {}x{}",
            viewport.width,
            viewport.height
        );
    }

    /// 生成一颗石子，必要时先按上限淘汰，返回淘汰数量
    fn spawn(&mut self, request: SpawnRequest, now_ms: u64) -> usize {
        let evicted = match (self.config.spawn.max_live, &mut self.motion) {
            (Some(cap), Motion::Physics(p)) => self.pebbles.make_room(cap, &mut p.world),
            (Some(cap), Motion::Gravity(_)) => self.pebbles.make_room(cap, &mut NoBodies),
            (None, _) => 0,
        };

        let body = match &mut self.motion {
            Motion::Physics(p) => Some(p.world.create_body(
                BodyShape::Circle {
                    radius: request.size / 2.0,
                },
                BodyParams {
                    kind: BodyKind::Dynamic,
                    position: request.position,
                    angle: 0.0,
                    restitution: p.config.restitution,
                    friction: p.config.friction,
                    density: p.config.density,
                },
            )),
            Motion::Gravity(_) => None,
        };

        self.pebbles
            .add(request.position, request.size, request.color, now_ms, body);
        evicted
    }

    fn spawn_all(&mut self, requests: Vec<SpawnRequest>, now_ms: u64, report: &mut FrameReport) {
        for request in requests {
            report.evicted += self.spawn(request, now_ms);
            report.spawned += 1;
        }
    }

    /// 推进一帧
    pub fn update(&mut self, now_ms: u64) -> FrameReport {
        self.apply_resize();

        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        if self.phase == SessionPhase::Uninitialized {
            let initial = self
                .spawner
                .scatter(self.config.spawn.initial_pebbles, self.viewport);
            self.spawn_all(initial, now_ms, &mut report);
            self.phase = SessionPhase::Running;
            tracing::info!(target: LOG_TARGET, "Sketch running");
        }

        // 1. 读取最新（可能是旧的）姿态并生成石子
        let poses = self.latest.latest();
        if let Some(poses) = &poses {
            let requests = self.spawner.collect(now_ms, poses);
            if self.config.canvas.draw_keypoints {
                self.leave_markers(&requests);
            }
            self.spawn_all(requests, now_ms, &mut report);
        }
        let poses: &[Pose] = poses.as_deref().map(Vec::as_slice).unwrap_or(&[]);

        // 2. 推进模拟
        let dt = self
            .last_update_ms
            .map(|last| now_ms.saturating_sub(last) as f32 / 1000.0)
            .unwrap_or(0.0);
        match &mut self.motion {
            Motion::Gravity(gravity) => {
                report.retired += gravity.advance(&mut self.pebbles, self.viewport);
            }
            Motion::Physics(p) => {
                p.limbs.update(poses, &mut p.world);
                p.world.step(dt);

                let contacts = p.world.drain_contacts();
                report.contacts = contacts.len();
                report.impulses =
                    p.response
                        .respond(&contacts, &p.limbs, &self.pebbles, &mut p.world);
                self.pebbles.sync_from(&p.world);

                // 3. 回收过期石子
                report.retired += p.aging.apply(&mut self.pebbles, now_ms, &mut p.world);
            }
        }

        self.last_update_ms = Some(now_ms);
        self.frame += 1;
        report.live = self.pebbles.len();

        if report.spawned > 0 || report.evicted > 0 || report.retired > 0 {
            tracing::debug!(
                target: LOG_TARGET,
                "frame {}: +{} spawned, -{} evicted, -{} retired, {} live",
                report.frame,
                report.spawned,
                report.evicted,
                report.retired,
                report.live
            );
        }
        report
    }

    /// 绘制当前帧
    ///
    /// 相机不可用时传入 `None`，只画背景和石子。
    pub fn draw<S: RenderSurface + ?Sized>(&self, surface: &mut S, frame: Option<&VideoFrame>) {
        let canvas = &self.config.canvas;
        let viewport = self.viewport;
        surface.background(canvas.background);

        scoped(surface, |s| {
            if canvas.mirror {
                s.translate(Vec2::new(viewport.width, 0.0));
                s.scale(Vec2::new(-1.0, 1.0));
            }
            if let Some(frame) = frame {
                s.image(frame, Vec2::ZERO, viewport.size());
            }

            s.no_stroke();
            if canvas.draw_keypoints {
                self.draw_keypoints(s);
            }

            for pebble in self.pebbles.iter() {
                s.fill(pebble.color);
                s.circle(pebble.position, pebble.size);
            }

            if let Some(limbs) = self.limbs() {
                s.fill(LIMB_COLOR);
                for limb in limbs.limbs() {
                    let pose = limb.pose();
                    match limb.config().shape {
                        LimbShape::Hand { .. } => s.circle(pose.center, pose.length),
                        LimbShape::Arm { thickness, .. } => scoped(s, |s| {
                            s.translate(pose.center);
                            s.rotate(pose.angle);
                            s.rect(Vec2::ZERO, Vec2::new(pose.length, thickness));
                        }),
                    }
                }
            }
        });
    }

    fn leave_markers(&mut self, requests: &[SpawnRequest]) {
        let limit = self.config.canvas.marker_limit;
        for request in requests {
            while self.markers.len() >= limit {
                self.markers.pop_front();
            }
            self.markers.push_back(request.position);
        }
    }

    fn draw_keypoints<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        if self.markers.is_empty() {
            return;
        }
        surface.fill(Color::RED);
        for &marker in &self.markers {
            surface.circle(marker, self.config.canvas.keypoint_marker);
        }
    }
}
