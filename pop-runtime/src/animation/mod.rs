//! # Animation 模块
//!
//! 逐帧推进的通用动画引擎，弹窗的所有效果都建立在它之上。
//!
//! ## 核心设计理念
//!
//! 动画系统只负责 **时间轴管理**：
//! - 知道某个属性从 A 到 B 需要在 duration 内变化
//! - 通过 [`Animatable`] trait 直接把当前值写回对象
//! - **不假设对象类型**，对象自己决定如何使用这些值
//!
//! 在此之上增加了 **动画组** 的概念：一次 `animate` 调用里启动的所有属性动画
//! 属于同一组，组内全部结束后只产生一次 [`AnimationEvent::GroupFinished`]，
//! 其中 `finished` 标记本组是否被打断（跳过 / 被同属性的新动画替换）。
//!
//! ## 核心概念
//!
//! - `Animation`: 单个 f32 属性动画
//! - `AnimationSystem`: 属性动画与动画组的管理器
//! - `EasingFunction` / `Timing`: 缓动曲线与弹簧曲线
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut system = AnimationSystem::new();
//! let object: Rc<dyn Animatable> = surface.animatable();
//!
//! let group = system.begin_group();
//! system.animate(&object, "alpha", 1.0, 0.3, Timing::default(), Some(group))?;
//! system.seal_group(group);
//!
//! for event in system.update(0.016) {
//!     // AnimationEvent::GroupFinished { group, finished } ...
//! }
//! ```

mod animation;
mod easing;
mod spring;
mod system;
mod traits;
mod transform;

// 核心类型
pub use animation::{Animation, AnimationId, AnimationState, GroupId};
pub use easing::{EasingFunction, Timing};
pub use system::AnimationSystem;

// Trait-based 动画系统 API
pub use traits::{AnimPropertyKey, Animatable, ObjectId};

pub use transform::{Transform, Vec2};

/// 动画事件
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// 动画组结束（`finished == false` 表示组内有动画被打断）
    GroupFinished { group: GroupId, finished: bool },
}
