//! # Effect 模块
//!
//! 效果执行器：根据 [`AnimationContext`] 把进入 / 退出效果作用到目标节点上。
//!
//! 执行器以 [`PopAnimator`] trait 的形式对外开放，调用方可以提供完全自定义的
//! 实现替换 [`DefaultAnimator`]。
//!
//! ## 契约
//!
//! - `duration(ctx)`：实际使用的时长，默认实现见 [`compute_duration`]
//! - `run_enter` / `run_exit`：修改目标节点并在结束后调用 `done(finished)`，
//!   恰好一次，且总是晚于调用本身（异步）

mod default;

pub use default::DefaultAnimator;

use crate::runloop::{Completion, MainQueue};
use crate::style::{PopState, SpringConfig};
use crate::surface::Surface;

/// 时长为 0 时使用的默认时长（秒）
pub const DEFAULT_DURATION: f32 = 0.2;

/// 一次过渡的动画上下文
///
/// 每次过渡新建，执行器只读。
#[derive(Debug, Clone)]
pub struct AnimationContext {
    /// 过渡方向
    pub state: PopState,
    /// 目标节点（弹窗容器）
    pub target: Surface,
    /// 配置的时长，0 表示使用默认值
    pub duration: f32,
    /// 弹簧参数，只有弹簧类效果使用
    pub spring: SpringConfig,
}

impl AnimationContext {
    pub fn new(state: PopState, target: Surface) -> Self {
        Self {
            state,
            target,
            duration: 0.0,
            spring: SpringConfig::default(),
        }
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    pub fn with_spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }
}

/// 解析实际时长：配置值大于 0 时使用配置值，否则使用 [`DEFAULT_DURATION`]
pub fn compute_duration(ctx: &AnimationContext) -> f32 {
    if ctx.duration > 0.0 {
        ctx.duration
    } else {
        DEFAULT_DURATION
    }
}

/// 效果执行器
pub trait PopAnimator {
    /// 实际使用的时长
    fn duration(&self, ctx: &AnimationContext) -> f32 {
        compute_duration(ctx)
    }

    /// 执行进入效果
    fn run_enter(&self, ctx: &AnimationContext, queue: &MainQueue, done: Completion);

    /// 执行退出效果
    fn run_exit(&self, ctx: &AnimationContext, queue: &MainQueue, done: Completion);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_duration() {
        let ctx = AnimationContext::new(PopState::Entering, Surface::new("c"));
        assert_eq!(compute_duration(&ctx), DEFAULT_DURATION);

        let ctx = ctx.with_duration(0.45);
        assert_eq!(compute_duration(&ctx), 0.45);

        let ctx = ctx.with_duration(-1.0);
        assert_eq!(compute_duration(&ctx), DEFAULT_DURATION);
    }
}
