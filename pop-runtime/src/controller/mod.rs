//! # Controller 模块
//!
//! 弹窗控制器：一个弹窗实例的全部状态与生命周期。
//!
//! ## 节点结构
//!
//! ```text
//! root（宿主展示的节点，尺寸 = 宿主区域）
//!  ├─ backdrop（index 0，半透明背景，接收点击）
//!  └─ container（圆角容器，frame 由布局计算）
//!      └─ content_view
//!          └─ 内容节点
//! ```
//!
//! ## 生命周期
//!
//! ```text
//! Idle ─present─► PresentScheduled ─下一帧─► Presenting ─完成─► Presented
//!  ▲                                                              │
//!  └──────── 完成 ◄── Dismissing ◄─下一帧── DismissScheduled ◄─dismiss
//! ```
//!
//! - `present` / `dismiss` 都推迟一帧再与宿主交互
//! - 展示期间由 [`PopRegistry`] 强持有，关闭完成后移除
//! - 展示中（`Presenting`）收到的 `dismiss` 排队，展示完成后执行

mod keyboard;
mod layout;

pub use keyboard::{KEYBOARD_SPACING, KeyboardInput, keyboard_offset};
pub use layout::{LayoutInput, PopLayout, compute_layout};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::animation::{EasingFunction, Timing, Transform};
use crate::config::PopConfig;
use crate::content::{ContentController, SubscriptionId};
use crate::effect::{AnimationContext, DefaultAnimator, PopAnimator};
use crate::environment::{
    KeyboardAnimation, KeyboardInfo, NotificationCenter, NotificationName, ObserverToken, Payload,
};
use crate::error::LayoutError;
use crate::geometry::{EdgeInsets, Orientation, Point, Rect};
use crate::host::ModalHost;
use crate::registry::PopRegistry;
use crate::runloop::{Changes, MainQueue};
use crate::style::{EnterEffect, ExitEffect, PopPosition, PopState, SpringConfig};
use crate::surface::Surface;
use crate::transition::{PopTransition, PopupParts};

/// 旋转后重新布局的动画时长
pub const ROTATION_DURATION: f32 = 0.25;

/// 内容尺寸变化后重新布局的动画时长
pub const RESIZE_DURATION: f32 = 0.35;

/// 弹窗 ID
///
/// 由 [`PopRegistry`] 分配，只在同一注册表内唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopId(u64);

impl PopId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pop#{}", self.0)
    }
}

/// 弹窗生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopPhase {
    Idle,
    PresentScheduled,
    Presenting,
    Presented,
    DismissScheduled,
    Dismissing,
}

/// 控制器依赖的应用级对象
#[derive(Clone, Default)]
pub struct PopEnv {
    pub queue: MainQueue,
    pub registry: PopRegistry,
}

impl PopEnv {
    pub fn new(queue: MainQueue, registry: PopRegistry) -> Self {
        Self { queue, registry }
    }
}

type Callback = Box<dyn FnOnce()>;

/// 可调参数
struct Settings {
    enter: EnterEffect,
    exit: ExitEffect,
    duration: f32,
    spring: SpringConfig,
    position: PopPosition,
    offset: Point,
    backdrop_alpha: f32,
    dismiss_on_backdrop_touch: bool,
    auto_handle_keyboard: bool,
    safe_area: EdgeInsets,
    safe_area_overridden: bool,
    animator: Option<Rc<dyn PopAnimator>>,
}

impl Settings {
    fn from_config(config: &PopConfig) -> Self {
        Self {
            enter: config.enter,
            exit: config.exit,
            duration: config.duration,
            spring: config.spring,
            position: config.position,
            offset: config.position_offset,
            backdrop_alpha: config.backdrop_alpha,
            dismiss_on_backdrop_touch: config.dismiss_on_backdrop_touch,
            auto_handle_keyboard: config.auto_handle_keyboard,
            safe_area: config.safe_area.unwrap_or(EdgeInsets::ZERO),
            safe_area_overridden: config.safe_area.is_some(),
            animator: None,
        }
    }
}

/// 已注册的环境通知观察者
struct Observation {
    center: NotificationCenter,
    tokens: Vec<ObserverToken>,
}

/// 弹窗实例
struct PopInner {
    id: PopId,
    env: PopEnv,
    self_weak: Weak<PopInner>,
    root: Surface,
    backdrop: RefCell<Surface>,
    container: Surface,
    content_view: Surface,
    content: Rc<dyn ContentController>,
    settings: RefCell<Settings>,
    phase: Cell<PopPhase>,
    host: RefCell<Option<Rc<dyn ModalHost>>>,
    observation: RefCell<Option<Observation>>,
    content_subscription: Cell<Option<SubscriptionId>>,
    keyboard: Cell<Option<KeyboardInfo>>,
    pending_dismiss: Cell<bool>,
    pending_dismiss_callback: RefCell<Option<Callback>>,
}

/// 弹窗控制器句柄
///
/// 克隆共享同一实例。展示期间即使调用方丢掉所有句柄，注册表也会保持实例存活。
#[derive(Clone)]
pub struct PopController(Rc<PopInner>);

impl fmt::Debug for PopController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopController")
            .field("id", &self.0.id)
            .field("phase", &self.0.phase.get())
            .field("container", &self.0.container.frame())
            .finish()
    }
}

/// 内容持有的弱引用句柄
#[derive(Clone)]
pub struct PopHandle(Weak<PopInner>);

impl fmt::Debug for PopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.upgrade() {
            Some(inner) => write!(f, "PopHandle({})", inner.id),
            None => f.write_str("PopHandle(released)"),
        }
    }
}

impl PopHandle {
    /// 经由控制器关闭，返回请求是否被接受
    pub fn dismiss(&self) -> bool {
        match self.controller() {
            Some(controller) => controller.dismiss(),
            None => false,
        }
    }

    pub fn is_presented(&self) -> bool {
        self.controller().is_some_and(|c| c.is_presented())
    }

    pub fn controller(&self) -> Option<PopController> {
        self.0.upgrade().map(PopController)
    }
}

impl PopController {
    /// 以默认配置创建
    pub fn new(content: Rc<dyn ContentController>, env: PopEnv) -> Self {
        Self::with_config(content, env, &PopConfig::default())
    }

    /// 以指定配置创建
    ///
    /// 创建后立即登记到注册表。
    pub fn with_config(content: Rc<dyn ContentController>, env: PopEnv, config: &PopConfig) -> Self {
        let id = env.registry.allocate_id();
        let inner = Rc::new_cyclic(|weak| PopInner {
            id,
            env,
            self_weak: weak.clone(),
            root: Surface::new("pop_root"),
            backdrop: RefCell::new(Surface::new("backdrop")),
            container: Surface::new("container"),
            content_view: Surface::new("content_view"),
            content,
            settings: RefCell::new(Settings::from_config(config)),
            phase: Cell::new(PopPhase::Idle),
            host: RefCell::new(None),
            observation: RefCell::new(None),
            content_subscription: Cell::new(None),
            keyboard: Cell::new(None),
            pending_dismiss: Cell::new(false),
            pending_dismiss_callback: RefCell::new(None),
        });

        let backdrop = inner.backdrop();
        backdrop.set_alpha(config.backdrop_alpha);
        inner.install_tap_handler(&backdrop);
        inner.root.add_child(&backdrop);
        inner.root.add_child(&inner.container);
        inner.container.add_child(&inner.content_view);
        inner.container.set_corner_radius(config.corner_radius);

        let controller = Self(inner);
        if let Some(route) = controller.0.content.dismissal_route() {
            route.attach_pop_handle(controller.handle());
        }
        controller.0.env.registry.register(&controller);
        debug!(id = %controller.0.id, "pop controller created");
        controller
    }

    pub fn id(&self) -> PopId {
        self.0.id
    }

    pub fn handle(&self) -> PopHandle {
        PopHandle(Rc::downgrade(&self.0))
    }

    pub fn phase(&self) -> PopPhase {
        self.0.phase.get()
    }

    /// 是否处于展示中（含过渡中）
    pub fn is_presented(&self) -> bool {
        !matches!(self.phase(), PopPhase::Idle | PopPhase::PresentScheduled)
    }

    // ========== 部件 ==========

    pub fn root(&self) -> Surface {
        self.0.root.clone()
    }

    pub fn container(&self) -> Surface {
        self.0.container.clone()
    }

    pub fn backdrop(&self) -> Surface {
        self.0.backdrop()
    }

    pub fn content_view(&self) -> Surface {
        self.0.content_view.clone()
    }

    pub fn content(&self) -> Rc<dyn ContentController> {
        self.0.content.clone()
    }

    pub fn container_frame(&self) -> Rect {
        self.0.container.frame()
    }

    pub fn content_frame(&self) -> Rect {
        self.0.content_view.frame()
    }

    pub fn safe_area_insets(&self) -> EdgeInsets {
        self.0.settings.borrow().safe_area
    }

    pub fn keyboard_info(&self) -> Option<KeyboardInfo> {
        self.0.keyboard.get()
    }

    // ========== 生命周期 ==========

    /// 在宿主中展示
    ///
    /// 非 `Idle` 时忽略。与宿主的交互推迟到下一帧。
    pub fn present(&self, host: Rc<dyn ModalHost>) -> bool {
        self.present_with(host, None)
    }

    pub fn present_then(&self, host: Rc<dyn ModalHost>, on_complete: impl FnOnce() + 'static) -> bool {
        self.present_with(host, Some(Box::new(on_complete)))
    }

    fn present_with(&self, host: Rc<dyn ModalHost>, on_complete: Option<Callback>) -> bool {
        let inner = &self.0;
        if inner.phase.get() != PopPhase::Idle {
            debug!(id = %inner.id, phase = ?inner.phase.get(), "present ignored");
            return false;
        }
        inner.phase.set(PopPhase::PresentScheduled);
        inner.env.registry.register(self);
        debug!(id = %inner.id, "present scheduled");

        let this = inner.clone();
        inner
            .env
            .queue
            .post(move || this.perform_present(host, on_complete));
        true
    }

    /// 关闭
    ///
    /// 未展示时忽略，完成回调不会被调用。展示过渡中调用时排队到展示完成后。
    pub fn dismiss(&self) -> bool {
        self.dismiss_with(None)
    }

    pub fn dismiss_then(&self, on_complete: impl FnOnce() + 'static) -> bool {
        self.dismiss_with(Some(Box::new(on_complete)))
    }

    fn dismiss_with(&self, on_complete: Option<Callback>) -> bool {
        let inner = &self.0;
        match inner.phase.get() {
            PopPhase::Presented => {
                inner.phase.set(PopPhase::DismissScheduled);
                debug!(id = %inner.id, "dismiss scheduled");
                let this = inner.clone();
                inner.env.queue.post(move || this.perform_dismiss(on_complete));
                true
            }
            PopPhase::Presenting => {
                if inner.pending_dismiss.replace(true) {
                    warn!(id = %inner.id, "已有排队的 dismiss，替换其完成回调");
                }
                *inner.pending_dismiss_callback.borrow_mut() = on_complete;
                debug!(id = %inner.id, "dismiss queued until presentation completes");
                true
            }
            phase => {
                debug!(id = %inner.id, ?phase, "dismiss ignored");
                false
            }
        }
    }

    // ========== 布局 ==========

    /// 重新计算容器与内容的 frame
    ///
    /// 容器上的变换（如键盘避让的平移）保持不变。
    ///
    /// # Panics
    ///
    /// 内容尺寸在两个方向上都为零时 panic，这是调用方的配置错误。
    pub fn layout_container(&self) {
        self.0.layout_container();
    }

    /// 与 [`layout_container`](Self::layout_container) 相同，但返回错误而不是 panic
    pub fn try_layout_container(&self) -> Result<(), LayoutError> {
        self.0.try_layout_container()
    }

    // ========== 配置 ==========

    /// 整体替换配置
    ///
    /// 配置中未给出安全区时保留当前值（宿主提供的或之前固定的）。
    pub fn apply_config(&self, config: &PopConfig) {
        let mut settings = Settings::from_config(config);
        {
            let current = self.0.settings.borrow();
            settings.animator = current.animator.clone();
            if !settings.safe_area_overridden {
                settings.safe_area = current.safe_area;
                settings.safe_area_overridden = current.safe_area_overridden;
            }
        }
        *self.0.settings.borrow_mut() = settings;
        self.0.container.set_corner_radius(config.corner_radius);
        self.0.sync_backdrop_alpha();
    }

    pub fn set_enter_effect(&self, effect: EnterEffect) {
        self.0.settings.borrow_mut().enter = effect;
    }

    pub fn set_exit_effect(&self, effect: ExitEffect) {
        self.0.settings.borrow_mut().exit = effect;
    }

    pub fn set_duration(&self, duration: f32) {
        self.0.settings.borrow_mut().duration = duration.max(0.0);
    }

    pub fn set_spring(&self, spring: SpringConfig) {
        self.0.settings.borrow_mut().spring = spring;
    }

    pub fn set_position(&self, position: PopPosition) {
        self.0.settings.borrow_mut().position = position;
    }

    pub fn set_position_offset(&self, offset: Point) {
        self.0.settings.borrow_mut().offset = offset;
    }

    pub fn set_backdrop_alpha(&self, alpha: f32) {
        self.0.settings.borrow_mut().backdrop_alpha = alpha.clamp(0.0, 1.0);
        self.0.sync_backdrop_alpha();
    }

    pub fn backdrop_alpha(&self) -> f32 {
        self.0.settings.borrow().backdrop_alpha
    }

    pub fn set_dismiss_on_backdrop_touch(&self, enabled: bool) {
        self.0.settings.borrow_mut().dismiss_on_backdrop_touch = enabled;
    }

    pub fn set_auto_handle_keyboard(&self, enabled: bool) {
        self.0.settings.borrow_mut().auto_handle_keyboard = enabled;
    }

    /// 固定安全区，之后展示时不再从宿主读取
    pub fn set_safe_area_insets(&self, insets: EdgeInsets) {
        let mut settings = self.0.settings.borrow_mut();
        settings.safe_area = insets;
        settings.safe_area_overridden = true;
    }

    pub fn set_corner_radius(&self, radius: f32) {
        self.0.container.set_corner_radius(radius);
    }

    /// 使用自定义效果执行器替换内置效果
    pub fn set_animator(&self, animator: Rc<dyn PopAnimator>) {
        self.0.settings.borrow_mut().animator = Some(animator);
    }

    pub fn clear_animator(&self) {
        self.0.settings.borrow_mut().animator = None;
    }

    /// 替换背景节点
    ///
    /// 旧背景从根节点移除，新背景插入到最底层。
    pub fn set_backdrop(&self, backdrop: Surface) {
        let old = self.0.backdrop.replace(backdrop.clone());
        old.clear_tap_handler();
        old.remove_from_parent();

        self.0.install_tap_handler(&backdrop);
        backdrop.set_frame(self.0.root.bounds());
        self.0.root.insert_at(&backdrop, 0);
        self.0.sync_backdrop_alpha();
    }
}

impl PopInner {
    fn backdrop(&self) -> Surface {
        self.backdrop.borrow().clone()
    }

    fn install_tap_handler(&self, backdrop: &Surface) {
        let weak = self.self_weak.clone();
        backdrop.set_tap_handler(move || {
            if let Some(inner) = weak.upgrade() {
                inner.handle_backdrop_tap();
            }
        });
    }

    /// 非过渡中时背景直接落到目标透明度
    fn sync_backdrop_alpha(&self) {
        let phase = self.phase.get();
        if matches!(phase, PopPhase::Idle | PopPhase::PresentScheduled | PopPhase::Presented) {
            let alpha = self.settings.borrow().backdrop_alpha;
            self.backdrop().set_alpha(alpha);
        }
    }

    fn controller(&self) -> Option<PopController> {
        self.self_weak.upgrade().map(PopController)
    }

    fn orientation(&self) -> Orientation {
        match self.host.borrow().as_ref() {
            Some(host) => host.orientation(),
            None => {
                let bounds = self.root.bounds();
                if bounds.width() > bounds.height() {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                }
            }
        }
    }

    fn status_bar_height(&self) -> f32 {
        self.host
            .borrow()
            .as_ref()
            .map_or(0.0, |host| host.status_bar_height())
    }

    // ========== 布局 ==========

    fn compute_layout(&self) -> Result<PopLayout, LayoutError> {
        let host = self.root.bounds().size;
        let content = self
            .content
            .preferred_size()
            .resolve(self.orientation(), host.width)?;
        let settings = self.settings.borrow();
        Ok(compute_layout(&LayoutInput {
            host,
            content,
            position: settings.position,
            offset: settings.offset,
            safe_area: settings.safe_area,
        }))
    }

    fn layout_container(&self) {
        if let Err(err) = self.try_layout_container() {
            panic!("{err}");
        }
    }

    fn try_layout_container(&self) -> Result<(), LayoutError> {
        let layout = self.compute_layout()?;
        self.backdrop().set_frame(self.root.bounds());
        self.container.set_frame(layout.container);
        self.content_view.set_frame(layout.content);
        self.content.surface().set_frame(layout.content.bounds());
        Ok(())
    }

    fn write_layout(&self, layout: &PopLayout, changes: &mut Changes) {
        changes
            .frame(&self.backdrop(), self.root.bounds())
            .frame(&self.container, layout.container)
            .frame(&self.content_view, layout.content)
            .frame(&self.content.surface(), layout.content.bounds());
    }

    /// 在动画中重新布局
    fn animate_layout(&self, duration: f32, timing: Timing, completion: impl FnOnce(bool) + 'static) {
        let layout = match self.compute_layout() {
            Ok(layout) => layout,
            Err(err) => {
                warn!(id = %self.id, error = %err, "重新布局失败，忽略");
                return;
            }
        };
        self.env.queue.animate(
            duration,
            timing,
            |changes| self.write_layout(&layout, changes),
            completion,
        );
    }

    fn make_transition(&self, state: PopState) -> PopTransition {
        let settings = self.settings.borrow();
        let animator: Rc<dyn PopAnimator> = match &settings.animator {
            Some(animator) => animator.clone(),
            None => Rc::new(DefaultAnimator::new(settings.enter, settings.exit)),
        };
        let context = AnimationContext::new(state, self.container.clone())
            .with_duration(settings.duration)
            .with_spring(settings.spring);
        let parts: Weak<dyn PopupParts> = self.self_weak.clone();
        PopTransition::new(state, parts, animator, context, self.env.queue.clone())
    }

    // ========== 生命周期 ==========

    fn perform_present(self: Rc<Self>, host: Rc<dyn ModalHost>, on_complete: Option<Callback>) {
        if self.phase.get() != PopPhase::PresentScheduled {
            return;
        }

        self.start_observing(&host);
        {
            let mut settings = self.settings.borrow_mut();
            if !settings.safe_area_overridden {
                settings.safe_area = host.safe_area_insets();
            }
        }
        *self.host.borrow_mut() = Some(host.clone());
        self.root.set_frame(host.bounds());
        self.phase.set(PopPhase::Presenting);

        let transition = Rc::new(self.make_transition(PopState::Entering));
        let this = self.clone();
        host.present_modal(
            self.root.clone(),
            transition,
            Box::new(move |finished| this.finish_present(finished, on_complete)),
        );
    }

    fn finish_present(self: Rc<Self>, finished: bool, on_complete: Option<Callback>) {
        let pending = self.pending_dismiss.replace(false);
        let pending_callback = self.pending_dismiss_callback.borrow_mut().take();

        if !finished {
            debug!(id = %self.id, "presentation cancelled");
            self.phase.set(PopPhase::Idle);
            self.stop_observing();
            self.unsubscribe_content();
            self.host.borrow_mut().take();
            return;
        }

        self.phase.set(PopPhase::Presented);
        debug!(id = %self.id, "presented");
        if let Some(callback) = on_complete {
            callback();
        }
        if pending && let Some(controller) = self.controller() {
            controller.dismiss_with(pending_callback);
        }
    }

    fn perform_dismiss(self: Rc<Self>, on_complete: Option<Callback>) {
        if self.phase.get() != PopPhase::DismissScheduled {
            return;
        }
        let Some(host) = self.host.borrow().clone() else {
            warn!(id = %self.id, "没有宿主，无法关闭");
            self.phase.set(PopPhase::Presented);
            return;
        };

        self.stop_observing();
        self.phase.set(PopPhase::Dismissing);

        let transition = Rc::new(self.make_transition(PopState::Exiting));
        let this = self.clone();
        host.dismiss_modal(
            self.root.clone(),
            transition,
            Box::new(move |finished| this.finish_dismiss(finished, on_complete)),
        );
    }

    fn finish_dismiss(self: Rc<Self>, finished: bool, on_complete: Option<Callback>) {
        if !finished {
            debug!(id = %self.id, "dismissal cancelled, staying presented");
            self.phase.set(PopPhase::Presented);
            let host = self.host.borrow().clone();
            if let Some(host) = host {
                self.start_observing(&host);
            }
            return;
        }

        self.phase.set(PopPhase::Idle);
        self.unsubscribe_content();
        self.keyboard.set(None);
        self.container.set_transform(Transform::identity());
        self.host.borrow_mut().take();
        self.env.registry.unregister(self.id);
        debug!(id = %self.id, "dismissed");

        if let Some(callback) = on_complete {
            callback();
        }
    }

    // ========== 环境观察 ==========

    fn start_observing(&self, host: &Rc<dyn ModalHost>) {
        if self.observation.borrow().is_none() {
            let center = host.notifications();
            let mut tokens = Vec::new();

            let weak = self.self_weak.clone();
            tokens.push(center.add_observer(NotificationName::OrientationDidChange, move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_rotation();
                }
            }));

            if self.settings.borrow().auto_handle_keyboard {
                for name in [
                    NotificationName::KeyboardWillShow,
                    NotificationName::KeyboardWillChangeFrame,
                ] {
                    let weak = self.self_weak.clone();
                    tokens.push(center.add_observer(name, move |payload| {
                        if let Some(inner) = weak.upgrade() {
                            inner.handle_keyboard_show(payload);
                        }
                    }));
                }
                let weak = self.self_weak.clone();
                tokens.push(center.add_observer(NotificationName::KeyboardWillHide, move |payload| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_keyboard_hide(payload);
                    }
                }));
            }

            debug!(id = %self.id, count = tokens.len(), "observers registered");
            *self.observation.borrow_mut() = Some(Observation { center, tokens });
        }

        if self.content_subscription.get().is_none() {
            let weak = self.self_weak.clone();
            let id = self.content.preferred_size().subscribe(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_content_size_change();
                }
            });
            self.content_subscription.set(Some(id));
        }
    }

    fn stop_observing(&self) {
        let observation = self.observation.borrow_mut().take();
        if let Some(observation) = observation {
            for token in observation.tokens {
                observation.center.remove_observer(token);
            }
            debug!(id = %self.id, "observers removed");
        }
    }

    fn unsubscribe_content(&self) {
        if let Some(id) = self.content_subscription.take() {
            self.content.preferred_size().unsubscribe(id);
        }
    }

    /// 内容节点是否挂在屏幕上
    fn content_attached(&self) -> bool {
        let surface = self.content.surface();
        surface.parent().as_ref() == Some(&self.content_view) && self.root.parent().is_some()
    }

    fn handle_backdrop_tap(&self) {
        if !self.settings.borrow().dismiss_on_backdrop_touch {
            return;
        }
        if let Some(controller) = self.controller() {
            controller.dismiss();
        }
    }

    fn handle_rotation(&self) {
        debug!(id = %self.id, orientation = ?self.orientation(), "rotation");
        self.container.end_editing();
        self.animate_layout(
            ROTATION_DURATION,
            Timing::Curve(EasingFunction::EaseInOut),
            |_| {},
        );
    }

    fn handle_content_size_change(&self) {
        if !self.content_attached() {
            return;
        }
        let weak = self.self_weak.clone();
        self.animate_layout(
            RESIZE_DURATION,
            Timing::Spring(SpringConfig::critical()),
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.adjust_for_keyboard();
                }
            },
        );
    }

    fn handle_keyboard_show(&self, payload: &Payload) {
        if !self.settings.borrow().auto_handle_keyboard {
            return;
        }
        if self.container.find_focused_text_input().is_none() {
            return;
        }
        match KeyboardInfo::from_payload(payload) {
            Ok(info) => self.keyboard.set(Some(info)),
            Err(err) => {
                warn!(id = %self.id, error = %err, "键盘通知载荷无效，忽略");
                return;
            }
        }
        self.adjust_for_keyboard();
    }

    fn handle_keyboard_hide(&self, payload: &Payload) {
        if !self.settings.borrow().auto_handle_keyboard {
            return;
        }
        let animation = match KeyboardAnimation::from_payload(payload) {
            Ok(animation) => animation,
            Err(err) => {
                warn!(id = %self.id, error = %err, "键盘通知载荷无效，忽略");
                return;
            }
        };
        self.keyboard.set(None);
        self.env.queue.animate(
            animation.duration,
            animation.curve.easing(),
            |changes| {
                changes.transform(&self.container, Transform::identity());
            },
            |_| {},
        );
    }

    /// 按记录的键盘信息调整容器的平移
    fn adjust_for_keyboard(&self) {
        let Some(info) = self.keyboard.get() else {
            return;
        };
        let Some(input) = self.container.find_focused_text_input() else {
            return;
        };
        let Some(origin) = input.origin_in(&self.root) else {
            return;
        };

        let offset = {
            let settings = self.settings.borrow();
            keyboard_offset(&KeyboardInput {
                position: settings.position,
                host_height: self.root.bounds().height(),
                keyboard_height: info.height(),
                safe_area_bottom: settings.safe_area.bottom,
                status_bar_height: self.status_bar_height(),
                container: self.container.frame(),
                input_bottom: origin.y + input.frame().height(),
            })
        };
        debug!(id = %self.id, offset, "keyboard adjustment");

        self.env.queue.animate(
            info.animation.duration,
            info.animation.curve.easing(),
            |changes| {
                changes.transform(&self.container, Transform::translation(0.0, -offset));
            },
            |_| {},
        );
    }
}

impl PopupParts for PopInner {
    fn root(&self) -> Surface {
        self.root.clone()
    }

    fn container(&self) -> Surface {
        self.container.clone()
    }

    fn backdrop(&self) -> Surface {
        PopInner::backdrop(self)
    }

    fn content_view(&self) -> Surface {
        self.content_view.clone()
    }

    fn content(&self) -> Rc<dyn ContentController> {
        self.content.clone()
    }

    fn layout(&self) {
        self.layout_container();
    }

    fn backdrop_alpha(&self) -> f32 {
        self.settings.borrow().backdrop_alpha
    }
}

impl Drop for PopInner {
    fn drop(&mut self) {
        self.stop_observing();
        self.unsubscribe_content();
    }
}
