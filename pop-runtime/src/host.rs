//! # Host 模块
//!
//! 宿主抽象与确定性的无头实现。
//!
//! [`ModalHost`] 是弹窗控制器对宿主的全部要求：几何信息、环境通知，以及
//! “以自定义过渡展示 / 关闭一个节点”。[`SimulatedHost`] 在内存中实现它，
//! 测试与命令行驱动都使用它。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::environment::{
    AnimationCurve, KeyboardAnimation, KeyboardInfo, NotificationCenter, NotificationName, Payload,
};
use crate::geometry::{EdgeInsets, Orientation, Rect, Size};
use crate::runloop::{Completion, MainQueue};
use crate::surface::Surface;
use crate::transition::{AnimatedTransitioning, TransitionContext, TransitionSide};

/// 宿主接口
pub trait ModalHost {
    /// 宿主区域
    fn bounds(&self) -> Rect;

    fn safe_area_insets(&self) -> EdgeInsets;

    fn status_bar_height(&self) -> f32;

    fn orientation(&self) -> Orientation;

    fn notifications(&self) -> NotificationCenter;

    /// 以自定义过渡展示节点，结束后调用 `completion(finished)`
    fn present_modal(
        &self,
        surface: Surface,
        transitioning: Rc<dyn AnimatedTransitioning>,
        completion: Completion,
    );

    /// 以自定义过渡关闭已展示的节点
    fn dismiss_modal(
        &self,
        surface: Surface,
        transitioning: Rc<dyn AnimatedTransitioning>,
        completion: Completion,
    );
}

/// 模拟宿主的初始配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_safe_area")]
    pub safe_area: EdgeInsets,
    #[serde(default = "default_status_bar")]
    pub status_bar: f32,
}

fn default_width() -> f32 {
    375.0
}

fn default_height() -> f32 {
    812.0
}

fn default_safe_area() -> EdgeInsets {
    EdgeInsets::new(44.0, 0.0, 34.0, 0.0)
}

fn default_status_bar() -> f32 {
    44.0
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            safe_area: default_safe_area(),
            status_bar: default_status_bar(),
        }
    }
}

/// 模拟键盘动画
pub const KEYBOARD_ANIMATION: KeyboardAnimation = KeyboardAnimation {
    duration: 0.25,
    curve: AnimationCurve::Keyboard,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    Present,
    Dismiss,
}

struct HostInner {
    queue: MainQueue,
    notifications: NotificationCenter,
    window: Surface,
    root_view: Surface,
    safe_area: Cell<EdgeInsets>,
    status_bar: Cell<f32>,
    orientation: Cell<Orientation>,
    presented: RefCell<Vec<Surface>>,
    active: RefCell<Option<Rc<SimulatedContext>>>,
    appearance_log: RefCell<Vec<String>>,
    keyboard_height: Cell<Option<f32>>,
}

impl HostInner {
    fn log(&self, entry: String) {
        debug!(%entry, "host appearance");
        self.appearance_log.borrow_mut().push(entry);
    }
}

/// 模拟宿主的过渡上下文
struct SimulatedContext {
    kind: TransitionKind,
    host: Weak<HostInner>,
    container: Surface,
    from: Surface,
    to: Surface,
    cancelled: Cell<bool>,
    completion: RefCell<Option<Completion>>,
}

impl TransitionContext for SimulatedContext {
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
        self.cancelled.get()
    }

    fn complete_transition(&self, finished: bool) {
        let Some(completion) = self.completion.borrow_mut().take() else {
            warn!(kind = ?self.kind, "过渡重复完成，忽略");
            return;
        };

        if let Some(host) = self.host.upgrade() {
            host.active.borrow_mut().take();
            match (self.kind, finished) {
                (TransitionKind::Present, true) => host.presented.borrow_mut().push(self.to.clone()),
                (TransitionKind::Present, false) => self.to.remove_from_parent(),
                (TransitionKind::Dismiss, true) => {
                    host.presented.borrow_mut().retain(|s| s != &self.from);
                    self.from.remove_from_parent();
                }
                (TransitionKind::Dismiss, false) => {}
            }
            host.log(format!("{:?} complete(finished={})", self.kind, finished));
        }

        completion(finished);
    }

    fn begin_appearance(&self, side: TransitionSide, appearing: bool) {
        let surface = match side {
            TransitionSide::From => &self.from,
            TransitionSide::To => &self.to,
        };
        if let Some(host) = self.host.upgrade() {
            host.log(format!("{} begin_appearance(appearing={})", surface.name(), appearing));
        }
    }

    fn end_appearance(&self, side: TransitionSide) {
        let surface = match side {
            TransitionSide::From => &self.from,
            TransitionSide::To => &self.to,
        };
        if let Some(host) = self.host.upgrade() {
            host.log(format!("{} end_appearance", surface.name()));
        }
    }
}

/// 确定性的无头宿主
///
/// 廉价克隆的句柄。持有窗口节点、展示方根节点、通知中心与主队列。
#[derive(Clone)]
pub struct SimulatedHost {
    inner: Rc<HostInner>,
}

impl std::fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedHost")
            .field("bounds", &self.bounds())
            .field("orientation", &self.orientation())
            .field("presented", &self.inner.presented.borrow().len())
            .finish()
    }
}

impl SimulatedHost {
    pub fn new(queue: MainQueue, config: HostConfig) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.width, config.height);
        let window = Surface::with_frame("window", bounds);
        let root_view = Surface::with_frame("root_view", bounds);
        window.add_child(&root_view);
        let orientation = if config.width > config.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };

        Self {
            inner: Rc::new(HostInner {
                queue,
                notifications: NotificationCenter::new(),
                window,
                root_view,
                safe_area: Cell::new(config.safe_area),
                status_bar: Cell::new(config.status_bar),
                orientation: Cell::new(orientation),
                presented: RefCell::new(Vec::new()),
                active: RefCell::new(None),
                appearance_log: RefCell::new(Vec::new()),
                keyboard_height: Cell::new(None),
            }),
        }
    }

    /// 以 `Rc<dyn ModalHost>` 形式交给控制器
    pub fn as_modal(&self) -> Rc<dyn ModalHost> {
        Rc::new(self.clone())
    }

    pub fn queue(&self) -> &MainQueue {
        &self.inner.queue
    }

    pub fn window(&self) -> Surface {
        self.inner.window.clone()
    }

    /// 展示方的根节点
    pub fn root_view(&self) -> Surface {
        self.inner.root_view.clone()
    }

    /// 当前已展示的节点（自底向上）
    pub fn presented(&self) -> Vec<Surface> {
        self.inner.presented.borrow().clone()
    }

    pub fn has_active_transition(&self) -> bool {
        self.inner.active.borrow().is_some()
    }

    pub fn appearance_log(&self) -> Vec<String> {
        self.inner.appearance_log.borrow().clone()
    }

    pub fn set_safe_area(&self, insets: EdgeInsets) {
        self.inner.safe_area.set(insets);
    }

    pub fn set_status_bar_height(&self, height: f32) {
        self.inner.status_bar.set(height);
    }

    pub fn keyboard_height(&self) -> Option<f32> {
        self.inner.keyboard_height.get()
    }

    /// 当前最上层的节点：展示过渡的起点 / 关闭后的终点
    fn top_surface(&self, excluding: Option<&Surface>) -> Surface {
        self.inner
            .presented
            .borrow()
            .iter()
            .rev()
            .find(|s| Some(*s) != excluding)
            .cloned()
            .unwrap_or_else(|| self.root_view())
    }

    fn start(
        &self,
        kind: TransitionKind,
        from: Surface,
        to: Surface,
        transitioning: Rc<dyn AnimatedTransitioning>,
        completion: Completion,
    ) {
        if self.has_active_transition() {
            warn!(?kind, "已有过渡在进行，拒绝新的请求");
            self.inner.queue.post(move || completion(false));
            return;
        }

        let context = Rc::new(SimulatedContext {
            kind,
            host: Rc::downgrade(&self.inner),
            container: self.window(),
            from,
            to,
            cancelled: Cell::new(false),
            completion: RefCell::new(Some(completion)),
        });
        *self.inner.active.borrow_mut() = Some(context.clone());
        debug!(?kind, duration = transitioning.transition_duration(), "host transition started");
        transitioning.animate_transition(context);
    }

    /// 取消进行中的过渡
    ///
    /// 过渡涉及的节点上的动画立即跳到终点，完成回调照常送出。
    pub fn cancel_active_transition(&self) -> bool {
        let active = self.inner.active.borrow().clone();
        let Some(context) = active else {
            return false;
        };
        context.cancelled.set(true);
        for root in [&context.from, &context.to] {
            self.inner.queue.cancel_object(root.id());
            for surface in root.descendants() {
                self.inner.queue.cancel_object(surface.id());
            }
        }
        true
    }

    // ========== 环境事件 ==========

    /// 旋转屏幕
    ///
    /// 方向变化时交换宽高，所有已展示节点跟随窗口尺寸。
    pub fn rotate(&self, orientation: Orientation) {
        if orientation == self.inner.orientation.get() {
            return;
        }
        let bounds = self.bounds();
        self.resize(Size::new(bounds.height(), bounds.width()), orientation);
    }

    /// 设置窗口尺寸与方向并发出旋转通知
    pub fn resize(&self, size: Size, orientation: Orientation) {
        let bounds = Rect::from_size(size);
        self.inner.orientation.set(orientation);
        self.inner.window.set_frame(bounds);
        self.inner.root_view.set_frame(bounds);
        for surface in self.presented() {
            surface.set_frame(bounds);
        }
        self.inner
            .notifications
            .post(NotificationName::OrientationDidChange, &Payload::new());
    }

    fn keyboard_info(&self, height: f32, visible: bool) -> KeyboardInfo {
        let bounds = self.bounds();
        let y = if visible {
            bounds.height() - height
        } else {
            bounds.height()
        };
        KeyboardInfo {
            frame_end: Rect::new(0.0, y, bounds.width(), height),
            animation: KEYBOARD_ANIMATION,
        }
    }

    pub fn show_keyboard(&self, height: f32) {
        self.inner.keyboard_height.set(Some(height));
        let payload = self.keyboard_info(height, true).to_payload();
        self.inner
            .notifications
            .post(NotificationName::KeyboardWillShow, &payload);
    }

    pub fn change_keyboard(&self, height: f32) {
        self.inner.keyboard_height.set(Some(height));
        let payload = self.keyboard_info(height, true).to_payload();
        self.inner
            .notifications
            .post(NotificationName::KeyboardWillChangeFrame, &payload);
    }

    pub fn hide_keyboard(&self) {
        let height = self.inner.keyboard_height.take().unwrap_or(0.0);
        let payload = self.keyboard_info(height, false).to_payload();
        self.inner
            .notifications
            .post(NotificationName::KeyboardWillHide, &payload);
    }

    /// 投递任意载荷
    pub fn post_raw(&self, name: NotificationName, payload: &Payload) {
        self.inner.notifications.post(name, payload);
    }

    /// 点击最上层弹窗的背景（根节点的第一个子节点）
    pub fn tap_backdrop(&self) -> bool {
        let Some(top) = self.inner.presented.borrow().last().cloned() else {
            return false;
        };
        match top.children().first() {
            Some(backdrop) => backdrop.tap(),
            None => false,
        }
    }
}

impl ModalHost for SimulatedHost {
    fn bounds(&self) -> Rect {
        self.inner.window.bounds()
    }

    fn safe_area_insets(&self) -> EdgeInsets {
        self.inner.safe_area.get()
    }

    fn status_bar_height(&self) -> f32 {
        self.inner.status_bar.get()
    }

    fn orientation(&self) -> Orientation {
        self.inner.orientation.get()
    }

    fn notifications(&self) -> NotificationCenter {
        self.inner.notifications.clone()
    }

    fn present_modal(
        &self,
        surface: Surface,
        transitioning: Rc<dyn AnimatedTransitioning>,
        completion: Completion,
    ) {
        let from = self.top_surface(None);
        self.start(TransitionKind::Present, from, surface, transitioning, completion);
    }

    fn dismiss_modal(
        &self,
        surface: Surface,
        transitioning: Rc<dyn AnimatedTransitioning>,
        completion: Completion,
    ) {
        if !self.inner.presented.borrow().contains(&surface) {
            warn!(surface = surface.name(), "节点未被展示，无法关闭");
            self.inner.queue.post(move || completion(false));
            return;
        }
        let to = self.top_surface(Some(&surface));
        self.start(TransitionKind::Dismiss, surface, to, transitioning, completion);
    }
}
