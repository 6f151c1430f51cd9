//! 单槽最新值容器
//!
//! 异步生产者（姿态模型回调）只覆盖写入最新结果，消费者（帧更新）按需读取。
//! 没有队列也没有背压：读取方可能多次读到同一个旧值，这是预期行为。

use std::sync::{Arc, Mutex};

/// 槽内容：值 + 写入代数
#[derive(Debug)]
struct SlotState<T> {
    value: Option<Arc<T>>,
    generation: u64,
}

/// 单槽最新值容器
///
/// 克隆得到的是同一个槽的另一个句柄，可以交给回调闭包持有。
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Arc<Mutex<SlotState<T>>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    /// 创建空槽
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotState {
                value: None,
                generation: 0,
            })),
        }
    }

    /// 覆盖写入最新值
    pub fn write(&self, value: T) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.value = Some(Arc::new(value));
        state.generation += 1;
    }

    /// 读取最新值（可能是旧值）
    pub fn read(&self) -> Option<Arc<T>> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.value.clone()
    }

    /// 读取最新值及其写入代数
    pub fn read_with_generation(&self) -> (Option<Arc<T>>, u64) {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        (state.value.clone(), state.generation)
    }

    /// 已写入次数
    pub fn generation(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .generation
    }
}
