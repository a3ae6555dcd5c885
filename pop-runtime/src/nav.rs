//! # Nav 模块
//!
//! 弹窗内的导航栈：[`PopNavigation`] 作为弹窗内容，push / pop 子内容时
//! 用 [`NavTransition`] 做交叉淡入淡出，并把自身的 preferred size
//! 调整为栈顶子内容的尺寸，弹窗随之重新布局。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::animation::EasingFunction;
use crate::content::{AppearanceEvent, ContentController, DismissalRoutable, PreferredContentSize};
use crate::controller::PopHandle;
use crate::geometry::{Rect, Size};
use crate::runloop::{Completion, MainQueue};
use crate::surface::Surface;
use crate::transition::{AnimatedTransitioning, TransitionContext, TransitionSide};

/// 导航转场时长（秒）
pub const NAV_TRANSITION_DURATION: f32 = 0.15;

/// 导航操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOperation {
    /// 新内容盖在旧内容之上
    Push,
    /// 新内容垫在旧内容之下
    Pop,
}

/// 导航栈的交叉淡入淡出转场
///
/// 新节点 0→1、旧节点 1→0，线性。完成后旧节点的透明度恢复为 1。
pub struct NavTransition {
    operation: Cell<NavOperation>,
    queue: MainQueue,
}

impl NavTransition {
    pub fn new(operation: NavOperation, queue: MainQueue) -> Self {
        Self {
            operation: Cell::new(operation),
            queue,
        }
    }

    pub fn operation(&self) -> NavOperation {
        self.operation.get()
    }

    pub fn set_operation(&self, operation: NavOperation) {
        self.operation.set(operation);
    }
}

impl AnimatedTransitioning for NavTransition {
    fn transition_duration(&self) -> f32 {
        NAV_TRANSITION_DURATION
    }

    fn animate_transition(&self, ctx: Rc<dyn TransitionContext>) {
        let (Some(from), Some(to)) = (ctx.from_surface(), ctx.to_surface()) else {
            warn!("导航转场缺少节点");
            self.queue.post(move || ctx.complete_transition(false));
            return;
        };
        let container = ctx.container();

        to.set_frame(ctx.final_frame(&to));
        match self.operation.get() {
            NavOperation::Push => container.insert_above(&to, &from),
            NavOperation::Pop => container.insert_below(&to, &from),
        }
        from.set_alpha(1.0);
        to.set_alpha(0.0);

        debug!(operation = ?self.operation.get(), "nav transition started");
        let restored = from.clone();
        self.queue.animate(
            NAV_TRANSITION_DURATION,
            EasingFunction::Linear,
            |changes| {
                changes.alpha(&from, 0.0).alpha(&to, 1.0);
            },
            move |_| {
                ctx.complete_transition(true);
                restored.set_alpha(1.0);
            },
        );
    }
}

/// 导航栈内部使用的转场上下文
struct NavTransitionContext {
    container: Surface,
    from: Surface,
    to: Surface,
    completion: RefCell<Option<Completion>>,
}

impl TransitionContext for NavTransitionContext {
    fn container(&self) -> Surface {
        self.container.clone()
    }

    fn from_surface(&self) -> Option<Surface> {
        Some(self.from.clone())
    }

    fn to_surface(&self) -> Option<Surface> {
        Some(self.to.clone())
    }

    fn final_frame(&self, _surface: &Surface) -> Rect {
        self.container.bounds()
    }

    fn was_cancelled(&self) -> bool {
        false
    }

    fn complete_transition(&self, finished: bool) {
        let Some(completion) = self.completion.borrow_mut().take() else {
            return;
        };
        if finished {
            self.from.remove_from_parent();
        }
        completion(finished);
    }

    fn begin_appearance(&self, _side: TransitionSide, _appearing: bool) {}

    fn end_appearance(&self, _side: TransitionSide) {}
}

/// 弹窗内的导航栈
pub struct PopNavigation {
    surface: Surface,
    preferred: PreferredContentSize,
    stack: RefCell<Vec<Rc<dyn ContentController>>>,
    /// 首次出现时的 (竖屏, 横屏) 尺寸
    origin_sizes: Cell<Option<(Size, Size)>>,
    use_system_transition: Cell<bool>,
    transitioning: Cell<bool>,
    transition: NavTransition,
    queue: MainQueue,
    handle: RefCell<Option<PopHandle>>,
}

impl std::fmt::Debug for PopNavigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopNavigation")
            .field("depth", &self.depth())
            .field("preferred", &self.preferred)
            .field("transitioning", &self.transitioning.get())
            .finish()
    }
}

impl PopNavigation {
    /// 以根内容创建，初始尺寸取根内容的尺寸
    pub fn new(root: Rc<dyn ContentController>, queue: MainQueue) -> Rc<Self> {
        let root_size = root.preferred_size();
        let preferred =
            PreferredContentSize::new(root_size.portrait()).with_landscape(root_size.landscape());
        let surface = Surface::with_frame("navigation", Rect::from_size(root_size.portrait()));
        let child = root.surface();
        child.set_frame(surface.bounds());
        child.set_fills_parent(true);
        surface.add_child(&child);

        Rc::new(Self {
            surface,
            preferred,
            stack: RefCell::new(vec![root]),
            origin_sizes: Cell::new(None),
            use_system_transition: Cell::new(false),
            transitioning: Cell::new(false),
            transition: NavTransition::new(NavOperation::Push, queue.clone()),
            queue,
            handle: RefCell::new(None),
        })
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn top(&self) -> Option<Rc<dyn ContentController>> {
        self.stack.borrow().last().cloned()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning.get()
    }

    pub fn uses_system_transition(&self) -> bool {
        self.use_system_transition.get()
    }

    /// 不做交叉淡入淡出，直接替换节点
    pub fn set_use_system_transition(&self, enabled: bool) {
        self.use_system_transition.set(enabled);
    }

    /// 压入子内容
    ///
    /// 转场进行中时拒绝。
    pub fn push(self: &Rc<Self>, controller: Rc<dyn ContentController>) -> bool {
        if self.transitioning.get() {
            warn!("导航转场进行中，忽略 push");
            return false;
        }
        let Some(from) = self.top() else {
            return false;
        };
        if let (Some(route), Some(handle)) = (controller.dismissal_route(), self.pop_handle()) {
            route.attach_pop_handle(handle);
        }
        self.stack.borrow_mut().push(controller.clone());
        debug!(depth = self.depth(), "nav push");
        self.run(NavOperation::Push, from, controller);
        true
    }

    /// 弹出栈顶子内容
    ///
    /// 只剩根内容或转场进行中时返回 `None`。
    pub fn pop(self: &Rc<Self>) -> Option<Rc<dyn ContentController>> {
        if self.transitioning.get() {
            warn!("导航转场进行中，忽略 pop");
            return None;
        }
        let (from, to) = {
            let mut stack = self.stack.borrow_mut();
            if stack.len() < 2 {
                return None;
            }
            let from = stack.pop()?;
            let to = stack.last().cloned()?;
            (from, to)
        };
        debug!(depth = self.depth(), "nav pop");
        self.run(NavOperation::Pop, from.clone(), to);
        Some(from)
    }

    /// 按新内容调整自身尺寸，零尺寸回退到首次出现时的尺寸
    fn adjust_content_size(&self, incoming: &dyn ContentController) {
        let (origin_portrait, origin_landscape) = self
            .origin_sizes
            .get()
            .unwrap_or((self.preferred.portrait(), self.preferred.landscape()));
        let size = incoming.preferred_size();

        let portrait = size.portrait();
        self.preferred.set_portrait(if portrait.is_zero() {
            origin_portrait
        } else {
            portrait
        });
        let landscape = size.landscape();
        self.preferred.set_landscape(if landscape.is_zero() {
            origin_landscape
        } else {
            landscape
        });
    }

    fn run(
        self: &Rc<Self>,
        operation: NavOperation,
        from: Rc<dyn ContentController>,
        to: Rc<dyn ContentController>,
    ) {
        self.adjust_content_size(to.as_ref());

        from.appearance(AppearanceEvent::WillDisappear);
        to.appearance(AppearanceEvent::WillAppear);

        let from_surface = from.surface();
        let to_surface = to.surface();
        to_surface.set_fills_parent(true);

        if self.use_system_transition.get() {
            to_surface.set_frame(self.surface.bounds());
            self.surface.add_child(&to_surface);
            from_surface.remove_from_parent();
            from.appearance(AppearanceEvent::DidDisappear);
            to.appearance(AppearanceEvent::DidAppear);
            return;
        }

        self.transitioning.set(true);
        self.transition.set_operation(operation);
        let weak = Rc::downgrade(self);
        let ctx = Rc::new(NavTransitionContext {
            container: self.surface.clone(),
            from: from_surface,
            to: to_surface,
            completion: RefCell::new(Some(Box::new(move |_finished| {
                if let Some(nav) = weak.upgrade() {
                    nav.transitioning.set(false);
                }
                from.appearance(AppearanceEvent::DidDisappear);
                to.appearance(AppearanceEvent::DidAppear);
            }))),
        });
        self.transition.animate_transition(ctx);
    }

    /// 转场使用的队列
    pub fn queue(&self) -> &MainQueue {
        &self.queue
    }
}

impl ContentController for PopNavigation {
    fn surface(&self) -> Surface {
        self.surface.clone()
    }

    fn preferred_size(&self) -> &PreferredContentSize {
        &self.preferred
    }

    fn appearance(&self, event: AppearanceEvent) {
        if event == AppearanceEvent::WillAppear && self.origin_sizes.get().is_none() {
            self.origin_sizes
                .set(Some((self.preferred.portrait(), self.preferred.landscape())));
        }
        if let Some(top) = self.top() {
            top.appearance(event);
        }
    }

    fn dismissal_route(&self) -> Option<&dyn DismissalRoutable> {
        Some(self)
    }
}

impl DismissalRoutable for PopNavigation {
    fn attach_pop_handle(&self, handle: PopHandle) {
        for child in self.stack.borrow().iter() {
            if let Some(route) = child.dismissal_route() {
                route.attach_pop_handle(handle.clone());
            }
        }
        *self.handle.borrow_mut() = Some(handle);
    }

    fn pop_handle(&self) -> Option<PopHandle> {
        self.handle.borrow().clone()
    }
}
