//! 石子草图
//!
//! - `pebble` - 石子记录与存储，统一的回收入口
//! - `spawn` - 去抖与关键点过滤后的生成请求
//! - `aging` - 按寿命回收
//! - `gravity` - 乘法重力
//! - `limbs` - 手与前臂的运动学刚体
//! - `collision` - 肢体碰撞石子时的冲量
//! - `session` - 把以上部分串成每帧更新与绘制

pub mod aging;
pub mod collision;
pub mod gravity;
pub mod limbs;
pub mod pebble;
pub mod session;
pub mod spawn;

#[cfg(test)]
mod tests;

pub use aging::AgingPolicy;
pub use collision::{response_impulse, CollisionResponse};
pub use gravity::GravityMotion;
pub use limbs::{arm_pose, LimbPose, LimbTracker, TrackedLimb};
pub use pebble::{BodyTable, NoBodies, Pebble, PebbleId, PebbleStore};
pub use session::{FrameReport, SessionPhase, SketchSession, STATUS_LOADING, STATUS_READY};
pub use spawn::{SpawnPolicy, SpawnRequest};
