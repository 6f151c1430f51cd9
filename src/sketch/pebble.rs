//! 石子记录与存储
//!
//! 石子本身只是普通数据，物理变体中额外持有一个指向世界刚体表的 [`BodyHandle`]。
//! 所有回收路径都经过本模块的 `retire_*` 函数，在同一次调用里同时删除记录和刚体，
//! 因此不会出现"有记录没刚体"或"有刚体没记录"的帧。

use std::collections::{HashMap, VecDeque};

use glam::Vec2;

use crate::physics::{BodyHandle, PhysicsWorld};
use crate::render::Color;

/// 石子标识，按创建顺序递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PebbleId(u64);

impl PebbleId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 一颗石子
#[derive(Debug, Clone, PartialEq)]
pub struct Pebble {
    pub id: PebbleId,
    /// 中心位置（像素）
    pub position: Vec2,
    /// 直径（像素）
    pub size: f32,
    pub color: Color,
    /// 创建时刻（毫秒）
    pub born_ms: u64,
    /// 物理变体中的刚体
    pub body: Option<BodyHandle>,
}

impl Pebble {
    /// 已存活时长
    pub fn age(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.born_ms)
    }
}

/// 回收石子时需要同步删除刚体的表
pub trait BodyTable {
    /// 删除刚体，返回句柄是否有效
    fn remove_body(&mut self, handle: BodyHandle) -> bool;
}

impl BodyTable for PhysicsWorld {
    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.remove(handle)
    }
}

/// 没有刚体（乘法重力变体）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBodies;

impl BodyTable for NoBodies {
    fn remove_body(&mut self, _handle: BodyHandle) -> bool {
        false
    }
}

/// 存活石子，按创建顺序排列（队首最老）
#[derive(Debug, Default)]
pub struct PebbleStore {
    pebbles: VecDeque<Pebble>,
    bodies: HashMap<BodyHandle, PebbleId>,
    next_id: u64,
}

impl PebbleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pebbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pebbles.is_empty()
    }

    /// 从老到新遍历
    pub fn iter(&self) -> impl Iterator<Item = &Pebble> {
        self.pebbles.iter()
    }

    pub fn oldest(&self) -> Option<&Pebble> {
        self.pebbles.front()
    }

    pub fn newest(&self) -> Option<&Pebble> {
        self.pebbles.back()
    }

    /// 刚体是否属于某颗存活石子
    pub fn owns_body(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    /// 追加一颗新石子，返回其标识
    pub fn add(
        &mut self,
        position: Vec2,
        size: f32,
        color: Color,
        born_ms: u64,
        body: Option<BodyHandle>,
    ) -> PebbleId {
        let id = PebbleId(self.next_id);
        self.next_id += 1;
        if let Some(handle) = body {
            self.bodies.insert(handle, id);
        }
        self.pebbles.push_back(Pebble {
            id,
            position,
            size,
            color,
            born_ms,
            body,
        });
        id
    }

    fn release<W: BodyTable + ?Sized>(&mut self, pebble: &Pebble, world: &mut W) {
        if let Some(handle) = pebble.body {
            self.bodies.remove(&handle);
            world.remove_body(handle);
        }
    }

    /// 回收最老的石子
    pub fn retire_oldest<W: BodyTable + ?Sized>(&mut self, world: &mut W) -> Option<Pebble> {
        let pebble = self.pebbles.pop_front()?;
        self.release(&pebble, world);
        Some(pebble)
    }

    /// 按先进先出淘汰，直到还能再放入一颗而不超过 `cap`，返回淘汰数量
    pub fn make_room<W: BodyTable + ?Sized>(&mut self, cap: usize, world: &mut W) -> usize {
        let mut evicted = 0;
        while !self.pebbles.is_empty() && self.pebbles.len() >= cap {
            self.retire_oldest(world);
            evicted += 1;
        }
        evicted
    }

    /// 回收所有满足条件的石子，返回回收数量
    pub fn retire_where<W, F>(&mut self, world: &mut W, mut predicate: F) -> usize
    where
        W: BodyTable + ?Sized,
        F: FnMut(&Pebble) -> bool,
    {
        let before = self.pebbles.len();
        let mut kept = VecDeque::with_capacity(before);
        let mut retired = Vec::new();
        for pebble in self.pebbles.drain(..) {
            if predicate(&pebble) {
                retired.push(pebble);
            } else {
                kept.push_back(pebble);
            }
        }
        self.pebbles = kept;
        for pebble in &retired {
            self.release(pebble, world);
        }
        retired.len()
    }

    /// 回收存活超过 `ttl_ms` 的石子
    pub fn retire_expired<W: BodyTable + ?Sized>(
        &mut self,
        now_ms: u64,
        ttl_ms: u64,
        world: &mut W,
    ) -> usize {
        self.retire_where(world, |p| p.age(now_ms) > ttl_ms)
    }

    /// 回收所有石子
    pub fn retire_all<W: BodyTable + ?Sized>(&mut self, world: &mut W) -> usize {
        self.retire_where(world, |_| true)
    }

    /// 逐颗修改位置（乘法重力用）
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pebble> {
        self.pebbles.iter_mut()
    }

    /// 从物理世界同步石子位置
    pub fn sync_from(&mut self, world: &PhysicsWorld) {
        for pebble in self.pebbles.iter_mut() {
            if let Some(position) = pebble.body.and_then(|h| world.position(h)) {
                pebble.position = position;
            }
        }
    }
}
