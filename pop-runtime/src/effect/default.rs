//! 内置效果目录的执行器。

use tracing::debug;

use super::{AnimationContext, PopAnimator};
use crate::animation::{EasingFunction, Timing, Transform};
use crate::geometry::{Rect, Size};
use crate::runloop::{Changes, Completion, MainQueue};
use crate::style::{Edge, EnterEffect, ExitEffect};
use crate::surface::Surface;

/// 从顶部滑入时额外留出的距离
const SLIDE_TOP_MARGIN: f32 = 20.0;

/// 两段式退出第一段沿退出方向移动的距离
const ANTICIPATION: f32 = 20.0;

/// 目标节点的一组属性取值，`None` 表示不改动
#[derive(Debug, Clone, Copy, Default)]
struct Pose {
    frame: Option<Rect>,
    alpha: Option<f32>,
    transform: Option<Transform>,
}

impl Pose {
    fn frame(frame: Rect) -> Self {
        Self {
            frame: Some(frame),
            ..Self::default()
        }
    }

    fn visual(alpha: f32, transform: Transform) -> Self {
        Self {
            alpha: Some(alpha),
            transform: Some(transform),
            ..Self::default()
        }
    }

    fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// 立即生效
    fn apply(&self, surface: &Surface) {
        if let Some(transform) = self.transform {
            surface.set_transform(transform);
        }
        if let Some(alpha) = self.alpha {
            surface.set_alpha(alpha);
        }
        if let Some(frame) = self.frame {
            surface.set_frame(frame);
        }
    }

    /// 作为动画目标值
    fn write(&self, surface: &Surface, changes: &mut Changes) {
        if let Some(transform) = self.transform {
            changes.transform(surface, transform);
        }
        if let Some(alpha) = self.alpha {
            changes.alpha(surface, alpha);
        }
        if let Some(frame) = self.frame {
            changes.frame(surface, frame);
        }
    }
}

/// 一个效果的执行计划
enum Plan {
    /// 不做动画，下一帧完成
    Instant(Pose),
    /// 先设置 `start`，再以 `timing` 动画到 `end`
    Single {
        start: Pose,
        end: Pose,
        timing: Timing,
    },
    /// 1/3 时长 ease-out 到 `first`，再 2/3 时长 ease-in 到 `second`
    TwoPhase { first: Pose, second: Pose },
}

/// 内置效果执行器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultAnimator {
    pub enter: EnterEffect,
    pub exit: ExitEffect,
}

impl DefaultAnimator {
    pub fn new(enter: EnterEffect, exit: ExitEffect) -> Self {
        Self { enter, exit }
    }

    fn enter_plan(&self, ctx: &AnimationContext) -> Plan {
        let target = &ctx.target;
        let rest = Pose::visual(1.0, Transform::identity());
        let ease = Timing::Curve(EasingFunction::EaseInOut);

        match self.enter {
            EnterEffect::None => Plan::Instant(rest),
            EnterEffect::Fade => Plan::Single {
                start: Pose::visual(0.0, Transform::identity()),
                end: Pose::default().with_alpha(1.0),
                timing: ease,
            },
            EnterEffect::Grow => Plan::Single {
                start: Pose::visual(0.0, Transform::uniform_scale(0.9)),
                end: rest,
                timing: ease,
            },
            EnterEffect::Shrink => Plan::Single {
                start: Pose::visual(0.0, Transform::uniform_scale(1.1)),
                end: rest,
                timing: ease,
            },
            EnterEffect::Bounce => Plan::Single {
                start: Pose::visual(0.0, Transform::uniform_scale(0.1)),
                end: rest,
                timing: Timing::Spring(ctx.spring),
            },
            effect => {
                let origin = target.frame();
                let (edge, top_margin, timing) = match (effect.slide_edge(), effect.bounce_edge()) {
                    (Some(edge), _) => (edge, SLIDE_TOP_MARGIN, ease),
                    (None, Some(edge)) => (edge, 0.0, Timing::Spring(ctx.spring)),
                    (None, None) => return Plan::Instant(rest),
                };
                Plan::Single {
                    start: Pose::frame(offscreen_enter_frame(target, edge, top_margin))
                        .with_alpha(1.0)
                        .with_transform(Transform::identity()),
                    end: Pose::frame(origin),
                    timing,
                }
            }
        }
    }

    fn exit_plan(&self, ctx: &AnimationContext) -> Plan {
        let target = &ctx.target;
        let ease = Timing::Curve(EasingFunction::EaseInOut);

        match self.exit {
            ExitEffect::None => Plan::Instant(Pose::visual(1.0, Transform::identity())),
            ExitEffect::Fade => Plan::Single {
                start: Pose::default().with_transform(Transform::identity()),
                end: Pose::default().with_alpha(0.0),
                timing: Timing::default(),
            },
            ExitEffect::Grow => Plan::Single {
                start: Pose::default(),
                end: Pose::visual(0.0, Transform::uniform_scale(1.1)),
                timing: ease,
            },
            ExitEffect::Shrink => Plan::Single {
                start: Pose::default(),
                end: Pose::visual(0.0, Transform::uniform_scale(0.85)),
                timing: ease,
            },
            ExitEffect::Bounce => Plan::TwoPhase {
                first: Pose::default().with_transform(Transform::uniform_scale(1.1)),
                second: Pose::visual(0.0, Transform::uniform_scale(0.1)),
            },
            effect => {
                if let Some(edge) = effect.slide_edge() {
                    Plan::Single {
                        start: Pose::default(),
                        end: Pose::frame(offscreen_exit_frame(target, edge)),
                        timing: ease,
                    }
                } else if let Some(edge) = effect.bounce_edge() {
                    Plan::TwoPhase {
                        first: Pose::frame(anticipation_frame(target.frame(), edge)),
                        second: Pose::frame(offscreen_exit_frame(target, edge)),
                    }
                } else {
                    Plan::Instant(Pose::visual(1.0, Transform::identity()))
                }
            }
        }
    }

    fn run_plan(plan: Plan, target: &Surface, duration: f32, queue: &MainQueue, done: Completion) {
        match plan {
            Plan::Instant(pose) => {
                pose.apply(target);
                queue.post(move || done(true));
            }
            Plan::Single { start, end, timing } => {
                start.apply(target);
                queue.animate(duration, timing, |changes| end.write(target, changes), done);
            }
            Plan::TwoPhase { first, second } => {
                let next_target = target.clone();
                let next_queue = queue.clone();
                queue.animate(
                    duration / 3.0,
                    EasingFunction::EaseOut,
                    |changes| first.write(target, changes),
                    move |finished| {
                        if !finished {
                            // 第一段被打断：直接落到终态
                            second.apply(&next_target);
                            done(false);
                            return;
                        }
                        next_queue.animate(
                            duration * 2.0 / 3.0,
                            EasingFunction::EaseIn,
                            |changes| second.write(&next_target, changes),
                            done,
                        );
                    },
                );
            }
        }
    }
}

impl PopAnimator for DefaultAnimator {
    fn run_enter(&self, ctx: &AnimationContext, queue: &MainQueue, done: Completion) {
        let duration = self.duration(ctx);
        debug!(effect = ?self.enter, duration, "run enter effect");
        Self::run_plan(self.enter_plan(ctx), &ctx.target, duration, queue, done);
    }

    fn run_exit(&self, ctx: &AnimationContext, queue: &MainQueue, done: Completion) {
        let duration = self.duration(ctx);
        debug!(effect = ?self.exit, duration, "run exit effect");
        Self::run_plan(self.exit_plan(ctx), &ctx.target, duration, queue, done);
    }
}

fn parent_size(target: &Surface) -> Size {
    target
        .parent()
        .map(|parent| parent.frame().size)
        .unwrap_or(Size::ZERO)
}

/// 进入效果的屏幕外起点
fn offscreen_enter_frame(target: &Surface, edge: Edge, top_margin: f32) -> Rect {
    let frame = target.frame();
    let parent = parent_size(target);
    match edge {
        Edge::Top => frame.with_y(-frame.height() - top_margin),
        Edge::Bottom => frame.with_y(parent.height),
        Edge::Left => frame.with_x(-frame.width()),
        Edge::Right => frame.with_x(parent.width),
    }
}

/// 退出效果的屏幕外终点
fn offscreen_exit_frame(target: &Surface, edge: Edge) -> Rect {
    let frame = target.frame();
    let parent = parent_size(target);
    match edge {
        Edge::Top => frame.with_y(-frame.height()),
        Edge::Bottom => frame.with_y(parent.height),
        Edge::Left => frame.with_x(-frame.width()),
        Edge::Right => frame.with_x(parent.width),
    }
}

/// 两段式退出的第一段：沿退出方向先移动一小段
fn anticipation_frame(frame: Rect, edge: Edge) -> Rect {
    match edge {
        Edge::Top => frame.offset_by(0.0, -ANTICIPATION),
        Edge::Bottom => frame.offset_by(0.0, ANTICIPATION),
        Edge::Left => frame.offset_by(-ANTICIPATION, 0.0),
        Edge::Right => frame.offset_by(ANTICIPATION, 0.0),
    }
}
