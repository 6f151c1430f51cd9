//! 寿命回收
//!
//! 物理变体每帧回收 `now - born > ttl` 的石子，记录和刚体在同一次调用里删除。

use super::pebble::{BodyTable, Pebble, PebbleStore};

/// 寿命策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingPolicy {
    ttl_ms: u64,
}

impl AgingPolicy {
    pub fn new(ttl_ms: u64) -> Self {
        Self { ttl_ms }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// 石子在 `now_ms` 是否已过期
    pub fn is_expired(&self, pebble: &Pebble, now_ms: u64) -> bool {
        pebble.age(now_ms) > self.ttl_ms
    }

    /// 回收所有过期石子，返回回收数量
    pub fn apply<W: BodyTable + ?Sized>(
        &self,
        store: &mut PebbleStore,
        now_ms: u64,
        world: &mut W,
    ) -> usize {
        store.retire_expired(now_ms, self.ttl_ms, world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::pebble::NoBodies;
    use crate::render::Color;
    use glam::Vec2;

    #[test]
    fn test_present_until_ttl_passes() {
        let aging = AgingPolicy::new(13_000);
        let mut store = PebbleStore::new();
        store.add(Vec2::ZERO, 8.0, Color::WHITE, 0, None);

        assert_eq!(aging.apply(&mut store, 12_999, &mut NoBodies), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(aging.apply(&mut store, 13_001, &mut NoBodies), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_only_old_pebbles_retired() {
        let aging = AgingPolicy::new(1_000);
        let mut store = PebbleStore::new();
        for born in [0, 500, 1_000, 1_500] {
            store.add(Vec2::ZERO, 8.0, Color::WHITE, born, None);
        }

        aging.apply(&mut store, 2_000, &mut NoBodies);

        let survivors: Vec<u64> = store.iter().map(|p| p.born_ms).collect();
        assert_eq!(survivors, vec![1_000, 1_500]);
        assert!(store.iter().all(|p| !aging.is_expired(p, 2_000)));
    }
}
