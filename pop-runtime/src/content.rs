//! # Content 模块
//!
//! 弹窗内容的抽象：内容控制器、首选尺寸与关闭路由。
//!
//! 内容通过 [`PreferredContentSize`] 声明尺寸，尺寸变化以回调形式通知订阅者，
//! 弹窗控制器据此重新布局。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::controller::PopHandle;
use crate::error::LayoutError;
use crate::geometry::{Orientation, Size};
use crate::surface::Surface;

/// 订阅 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// 外观生命周期事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceEvent {
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
    /// 即将从父容器移除
    WillMoveToParent,
    /// 已挂到父容器
    DidMoveToParent,
}

impl fmt::Display for AppearanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WillAppear => "will_appear",
            Self::DidAppear => "did_appear",
            Self::WillDisappear => "will_disappear",
            Self::DidDisappear => "did_disappear",
            Self::WillMoveToParent => "will_move_to_parent",
            Self::DidMoveToParent => "did_move_to_parent",
        };
        f.write_str(name)
    }
}

/// 内容首选尺寸
///
/// 竖屏尺寸必填，横屏尺寸为零时沿用竖屏尺寸。
pub struct PreferredContentSize {
    portrait: Cell<Size>,
    landscape: Cell<Size>,
    observers: RefCell<Vec<(SubscriptionId, Rc<dyn Fn()>)>>,
    next_id: Cell<u64>,
}

impl Default for PreferredContentSize {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl fmt::Debug for PreferredContentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferredContentSize")
            .field("portrait", &self.portrait.get())
            .field("landscape", &self.landscape.get())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl PreferredContentSize {
    pub fn new(portrait: Size) -> Self {
        Self {
            portrait: Cell::new(portrait),
            landscape: Cell::new(Size::ZERO),
            observers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn with_landscape(self, landscape: Size) -> Self {
        self.landscape.set(landscape);
        self
    }

    pub fn portrait(&self) -> Size {
        self.portrait.get()
    }

    pub fn landscape(&self) -> Size {
        self.landscape.get()
    }

    /// 设置竖屏尺寸并通知订阅者
    pub fn set_portrait(&self, size: Size) {
        self.portrait.set(size);
        self.notify();
    }

    /// 设置横屏尺寸并通知订阅者
    pub fn set_landscape(&self, size: Size) {
        self.landscape.set(size);
        self.notify();
    }

    pub fn subscribe(&self, observer: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self) {
        // 回调里允许再次订阅 / 取消订阅
        let observers: Vec<Rc<dyn Fn()>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer();
        }
    }

    /// 按方向解析布局用的尺寸
    ///
    /// 宽度为零而高度不为零时，宽度撑满宿主宽度。
    pub fn resolve(&self, orientation: Orientation, host_width: f32) -> Result<Size, LayoutError> {
        let landscape = self.landscape();
        let mut size = if orientation.is_landscape() && !landscape.is_zero() {
            landscape
        } else {
            self.portrait()
        };

        if size.is_zero() {
            return Err(LayoutError::ZeroContentSize);
        }
        if size.width.abs() < f32::EPSILON {
            size.width = host_width;
        }
        Ok(size)
    }
}

/// 关闭路由
///
/// 内容实现此 trait 后，控制器在创建时把 [`PopHandle`] 交给它，
/// 内容自己的“关闭”操作经由句柄走控制器的 `dismiss`。
pub trait DismissalRoutable {
    fn attach_pop_handle(&self, handle: PopHandle);

    fn pop_handle(&self) -> Option<PopHandle>;
}

/// 内容控制器
pub trait ContentController {
    /// 内容的根节点
    fn surface(&self) -> Surface;

    fn preferred_size(&self) -> &PreferredContentSize;

    /// 外观生命周期回调
    fn appearance(&self, _event: AppearanceEvent) {}

    /// 需要关闭路由的内容返回自身
    fn dismissal_route(&self) -> Option<&dyn DismissalRoutable> {
        None
    }
}

/// 最简单的内容实现：一个节点 + 首选尺寸，记录收到的外观事件
pub struct SimpleContent {
    surface: Surface,
    size: PreferredContentSize,
    events: RefCell<Vec<AppearanceEvent>>,
    handle: RefCell<Option<PopHandle>>,
}

impl SimpleContent {
    pub fn new(name: impl Into<String>, portrait: Size) -> Rc<Self> {
        Self::with_sizes(name, portrait, Size::ZERO)
    }

    pub fn with_sizes(name: impl Into<String>, portrait: Size, landscape: Size) -> Rc<Self> {
        Rc::new(Self {
            surface: Surface::new(name),
            size: PreferredContentSize::new(portrait).with_landscape(landscape),
            events: RefCell::new(Vec::new()),
            handle: RefCell::new(None),
        })
    }

    /// 收到的外观事件
    pub fn events(&self) -> Vec<AppearanceEvent> {
        self.events.borrow().clone()
    }

    /// 内容自己的“关闭”操作
    ///
    /// 没有挂上控制器时返回 `false`。
    pub fn close(&self) -> bool {
        let handle = self.handle.borrow().clone();
        match handle {
            Some(handle) => handle.dismiss(),
            None => false,
        }
    }
}

impl ContentController for SimpleContent {
    fn surface(&self) -> Surface {
        self.surface.clone()
    }

    fn preferred_size(&self) -> &PreferredContentSize {
        &self.size
    }

    fn appearance(&self, event: AppearanceEvent) {
        self.events.borrow_mut().push(event);
    }

    fn dismissal_route(&self) -> Option<&dyn DismissalRoutable> {
        Some(self)
    }
}

impl DismissalRoutable for SimpleContent {
    fn attach_pop_handle(&self, handle: PopHandle) {
        *self.handle.borrow_mut() = Some(handle);
    }

    fn pop_handle(&self) -> Option<PopHandle> {
        self.handle.borrow().clone()
    }
}
