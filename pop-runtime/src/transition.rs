//! # Transition 模块
//!
//! 过渡编排：在效果执行器外围处理生命周期回调、背景淡入淡出、
//! 交互屏蔽与完成顺序。
//!
//! ## 展示
//!
//! ```text
//! 屏蔽交互 ─► 插入弹窗根节点 ─► 挂载内容 ─► 布局
//!          ─► 背景 0 → 目标透明度（弹簧）  ┐ 同时开始
//!          ─► 进入效果                     ┘
//!          ─► 效果完成：完成过渡、恢复交互、内容 did_appear
//! ```
//!
//! ## 关闭
//!
//! ```text
//! 屏蔽交互 ─► 背景 → 0（ease-out） ┐ 同时开始
//!          ─► 退出效果             ┘
//!          ─► 效果完成：恢复交互、恢复背景透明度、移除节点、完成过渡
//! ```
//!
//! 宿主取消过渡时，完成回调同样恰好调用一次（`finished = false`），交互同样恢复。

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::animation::{EasingFunction, Transform};
use crate::content::{AppearanceEvent, ContentController};
use crate::effect::{AnimationContext, PopAnimator};
use crate::geometry::Rect;
use crate::runloop::{Completion, MainQueue};
use crate::style::{PopState, SpringConfig};
use crate::surface::Surface;

/// 过渡的哪一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSide {
    From,
    To,
}

/// 宿主提供的过渡上下文
pub trait TransitionContext {
    /// 过渡发生的容器节点
    fn container(&self) -> Surface;

    fn from_surface(&self) -> Option<Surface>;

    fn to_surface(&self) -> Option<Surface>;

    /// 节点在过渡结束后的 frame
    fn final_frame(&self, surface: &Surface) -> Rect;

    fn was_cancelled(&self) -> bool;

    /// 通知宿主过渡结束
    fn complete_transition(&self, finished: bool);

    /// 某一侧开始出现 / 消失
    fn begin_appearance(&self, side: TransitionSide, appearing: bool);

    fn end_appearance(&self, side: TransitionSide);
}

/// 过渡动画提供者
pub trait AnimatedTransitioning {
    fn transition_duration(&self) -> f32;

    fn animate_transition(&self, ctx: Rc<dyn TransitionContext>);
}

/// 编排器需要的弹窗部件
pub trait PopupParts {
    /// 弹窗根节点（宿主展示的节点）
    fn root(&self) -> Surface;

    /// 圆角容器
    fn container(&self) -> Surface;

    fn backdrop(&self) -> Surface;

    /// 容器内承载内容的节点
    fn content_view(&self) -> Surface;

    fn content(&self) -> Rc<dyn ContentController>;

    /// 重新计算容器与内容的 frame
    fn layout(&self);

    /// 背景的目标透明度
    fn backdrop_alpha(&self) -> f32;
}

/// 完成回调守卫
///
/// - 执行器在 `run_enter` / `run_exit` 调用期间同步完成时，推迟到下一帧
/// - 执行器丢弃回调而不调用时，下一帧以 `false` 调用
struct CompletionGuard {
    callback: Option<Completion>,
    queue: MainQueue,
    in_call: Rc<Cell<bool>>,
}

impl CompletionGuard {
    fn finish(mut self, finished: bool) {
        let Some(callback) = self.callback.take() else {
            return;
        };
        if self.in_call.get() {
            self.queue.post(move || callback(finished));
        } else {
            callback(finished);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("效果执行器丢弃了完成回调，按未完成处理");
            self.queue.post(move || callback(false));
        }
    }
}

/// 在守卫下调用执行器
fn run_guarded(
    queue: &MainQueue,
    callback: impl FnOnce(bool) + 'static,
    run: impl FnOnce(Completion),
) {
    let in_call = Rc::new(Cell::new(true));
    let guard = CompletionGuard {
        callback: Some(Box::new(callback)),
        queue: queue.clone(),
        in_call: in_call.clone(),
    };
    run(Box::new(move |finished| guard.finish(finished)));
    in_call.set(false);
}

fn set_interaction(parts: &dyn PopupParts, enabled: bool) {
    parts.container().set_interaction_enabled(enabled);
    parts.backdrop().set_interaction_enabled(enabled);
}

/// 弹窗过渡
///
/// 每次展示 / 关闭新建一个，只能执行一次。
pub struct PopTransition {
    state: PopState,
    parts: Weak<dyn PopupParts>,
    animator: Rc<dyn PopAnimator>,
    context: AnimationContext,
    queue: MainQueue,
    started: Cell<bool>,
}

impl PopTransition {
    pub fn new(
        state: PopState,
        parts: Weak<dyn PopupParts>,
        animator: Rc<dyn PopAnimator>,
        context: AnimationContext,
        queue: MainQueue,
    ) -> Self {
        Self {
            state,
            parts,
            animator,
            context,
            queue,
            started: Cell::new(false),
        }
    }

    pub fn state(&self) -> PopState {
        self.state
    }

    fn present(&self, ctx: Rc<dyn TransitionContext>, parts: Rc<dyn PopupParts>) {
        let (Some(from), Some(to)) = (ctx.from_surface(), ctx.to_surface()) else {
            warn!("过渡上下文缺少节点，放弃展示");
            self.queue.post(move || ctx.complete_transition(false));
            return;
        };
        let content = parts.content();
        let backdrop = parts.backdrop();
        let container = parts.container();

        to.set_frame(from.frame());
        ctx.begin_appearance(TransitionSide::From, false);
        ctx.container().add_child(&to);

        content.appearance(AppearanceEvent::WillAppear);
        parts.content_view().add_child(&content.surface());
        parts.layout();

        backdrop.set_alpha(0.0);
        set_interaction(parts.as_ref(), false);
        container.set_transform(Transform::identity());

        let duration = self.animator.duration(&self.context);
        let resting_alpha = parts.backdrop_alpha();
        self.queue.animate(
            duration,
            SpringConfig::critical(),
            |changes| {
                changes.alpha(&backdrop, resting_alpha);
            },
            |_| {},
        );

        debug!(duration, "present transition started");
        run_guarded(
            &self.queue,
            move |_finished| {
                let cancelled = ctx.was_cancelled();
                if cancelled {
                    content.surface().remove_from_parent();
                    to.remove_from_parent();
                }
                ctx.complete_transition(!cancelled);
                set_interaction(parts.as_ref(), true);
                if cancelled {
                    content.appearance(AppearanceEvent::DidDisappear);
                } else {
                    content.appearance(AppearanceEvent::DidAppear);
                    content.appearance(AppearanceEvent::DidMoveToParent);
                }
                ctx.end_appearance(TransitionSide::From);
                debug!(cancelled, "present transition finished");
            },
            |done| self.animator.run_enter(&self.context, &self.queue, done),
        );
    }

    fn dismiss(&self, ctx: Rc<dyn TransitionContext>, parts: Rc<dyn PopupParts>) {
        let (Some(from), Some(to)) = (ctx.from_surface(), ctx.to_surface()) else {
            warn!("过渡上下文缺少节点，放弃关闭");
            self.queue.post(move || ctx.complete_transition(false));
            return;
        };
        let content = parts.content();
        let backdrop = parts.backdrop();

        to.set_frame(from.frame());
        ctx.begin_appearance(TransitionSide::To, true);

        content.appearance(AppearanceEvent::WillDisappear);
        content.appearance(AppearanceEvent::WillMoveToParent);
        set_interaction(parts.as_ref(), false);

        let duration = self.animator.duration(&self.context);
        self.queue.animate(
            duration,
            EasingFunction::EaseOut,
            |changes| {
                changes.alpha(&backdrop, 0.0);
            },
            |_| {},
        );

        debug!(duration, "dismiss transition started");
        let queue = self.queue.clone();
        run_guarded(
            &self.queue,
            move |_finished| {
                set_interaction(parts.as_ref(), true);
                queue.cancel_object(backdrop.id());
                backdrop.set_alpha(parts.backdrop_alpha());

                let cancelled = ctx.was_cancelled();
                if cancelled {
                    // 回到展示中的静止状态
                    let container = parts.container();
                    container.set_alpha(1.0);
                    container.set_transform(Transform::identity());
                    parts.layout();
                    content.appearance(AppearanceEvent::DidAppear);
                } else {
                    from.remove_from_parent();
                    content.surface().remove_from_parent();
                    content.appearance(AppearanceEvent::DidDisappear);
                }
                ctx.end_appearance(TransitionSide::To);
                ctx.complete_transition(!cancelled);
                debug!(cancelled, "dismiss transition finished");
            },
            |done| self.animator.run_exit(&self.context, &self.queue, done),
        );
    }
}

impl AnimatedTransitioning for PopTransition {
    fn transition_duration(&self) -> f32 {
        self.animator.duration(&self.context)
    }

    fn animate_transition(&self, ctx: Rc<dyn TransitionContext>) {
        if self.started.replace(true) {
            warn!(state = ?self.state, "过渡已经开始，忽略重复调用");
            return;
        }
        let Some(parts) = self.parts.upgrade() else {
            warn!("弹窗已释放，放弃过渡");
            self.queue.post(move || ctx.complete_transition(false));
            return;
        };
        match self.state {
            PopState::Entering => self.present(ctx, parts),
            PopState::Exiting => self.dismiss(ctx, parts),
        }
    }
}
