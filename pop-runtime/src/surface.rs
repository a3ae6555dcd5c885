//! # Surface 模块
//!
//! 可动画的视图节点：frame、透明度、变换、交互开关以及父子层级。
//!
//! [`Surface`] 是 `Rc` 句柄，克隆只增加引用计数。父节点强持有子节点，
//! 子节点以 `Weak` 指回父节点。
//!
//! 可动画属性：
//!
//! | 属性名 | 含义 |
//! |--------|------|
//! | `alpha` | 透明度，夹在 [0, 1] |
//! | `frame.x` / `frame.y` / `frame.w` / `frame.h` | frame 的四个分量 |
//! | `transform.tx` / `transform.ty` | 平移 |
//! | `transform.scale` | 均匀缩放 |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::animation::{Animatable, ObjectId, Transform};
use crate::geometry::{Point, Rect};
use crate::runloop::Changes;

/// 节点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceRole {
    /// 普通视图
    #[default]
    Plain,
    /// 文本输入框，可获得焦点
    TextInput,
    /// 内嵌网页内容，其内部的输入框由网页自己处理键盘
    WebContent,
}

/// 视图节点
pub struct SurfaceNode {
    id: ObjectId,
    name: String,
    frame: Cell<Rect>,
    alpha: Cell<f32>,
    transform: Cell<Transform>,
    interaction_enabled: Cell<bool>,
    corner_radius: Cell<f32>,
    role: Cell<SurfaceRole>,
    focused: Cell<bool>,
    /// 父节点尺寸变化时铺满父节点
    fills_parent: Cell<bool>,
    children: RefCell<Vec<Surface>>,
    parent: RefCell<Weak<SurfaceNode>>,
    tap_handler: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Animatable for SurfaceNode {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn get_property(&self, property_id: &str) -> Option<f32> {
        let frame = self.frame.get();
        let transform = self.transform.get();
        match property_id {
            "alpha" => Some(self.alpha.get()),
            "frame.x" => Some(frame.origin.x),
            "frame.y" => Some(frame.origin.y),
            "frame.w" => Some(frame.size.width),
            "frame.h" => Some(frame.size.height),
            "transform.tx" => Some(transform.translation.x),
            "transform.ty" => Some(transform.translation.y),
            "transform.scale" => Some(transform.scale.x),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        let mut frame = self.frame.get();
        let mut transform = self.transform.get();
        match property_id {
            "alpha" => {
                self.alpha.set(value.clamp(0.0, 1.0));
                return true;
            }
            "frame.x" => frame.origin.x = value,
            "frame.y" => frame.origin.y = value,
            "frame.w" => frame.size.width = value,
            "frame.h" => frame.size.height = value,
            "transform.tx" => transform.translation.x = value,
            "transform.ty" => transform.translation.y = value,
            "transform.scale" => {
                transform.scale.x = value;
                transform.scale.y = value;
            }
            _ => return false,
        }
        self.transform.set(transform);
        self.apply_frame(frame);
        true
    }
}

impl SurfaceNode {
    /// 写入 frame；尺寸变化时把铺满父节点的子节点同步到新 bounds
    fn apply_frame(&self, frame: Rect) {
        let old = self.frame.replace(frame);
        if old.size == frame.size {
            return;
        }
        let fitting: Vec<Surface> = self
            .children
            .borrow()
            .iter()
            .filter(|child| child.0.fills_parent.get())
            .cloned()
            .collect();
        for child in fitting {
            child.0.apply_frame(frame.bounds());
        }
    }
}

/// 视图节点句柄
#[derive(Clone)]
pub struct Surface(Rc<SurfaceNode>);

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("frame", &self.frame())
            .field("alpha", &self.alpha())
            .finish()
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Surface {}

impl Surface {
    /// 创建一个空节点：frame 为零、完全不透明、可交互
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(SurfaceNode {
            id: ObjectId::allocate(),
            name: name.into(),
            frame: Cell::new(Rect::ZERO),
            alpha: Cell::new(1.0),
            transform: Cell::new(Transform::identity()),
            interaction_enabled: Cell::new(true),
            corner_radius: Cell::new(0.0),
            role: Cell::new(SurfaceRole::Plain),
            focused: Cell::new(false),
            fills_parent: Cell::new(false),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            tap_handler: RefCell::new(None),
        }))
    }

    /// 创建指定 frame 的节点
    pub fn with_frame(name: impl Into<String>, frame: Rect) -> Self {
        let surface = Self::new(name);
        surface.set_frame(frame);
        surface
    }

    /// 创建指定角色的节点
    pub fn with_role(name: impl Into<String>, frame: Rect, role: SurfaceRole) -> Self {
        let surface = Self::with_frame(name, frame);
        surface.0.role.set(role);
        surface
    }

    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// 以 `Animatable` 形式交给动画系统
    pub fn animatable(&self) -> Rc<dyn Animatable> {
        self.0.clone()
    }

    // ========== 属性 ==========

    pub fn frame(&self) -> Rect {
        self.0.frame.get()
    }

    pub fn set_frame(&self, frame: Rect) {
        self.0.apply_frame(frame);
    }

    pub fn fills_parent(&self) -> bool {
        self.0.fills_parent.get()
    }

    /// 开启后，父节点 frame 尺寸每次变化都把自身 frame 设为父节点的 bounds
    pub fn set_fills_parent(&self, fills: bool) {
        self.0.fills_parent.set(fills);
    }

    /// 以自身为坐标系的 bounds
    pub fn bounds(&self) -> Rect {
        self.frame().bounds()
    }

    pub fn alpha(&self) -> f32 {
        self.0.alpha.get()
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.0.alpha.set(alpha.clamp(0.0, 1.0));
    }

    pub fn transform(&self) -> Transform {
        self.0.transform.get()
    }

    pub fn set_transform(&self, transform: Transform) {
        self.0.transform.set(transform);
    }

    pub fn is_interaction_enabled(&self) -> bool {
        self.0.interaction_enabled.get()
    }

    pub fn set_interaction_enabled(&self, enabled: bool) {
        self.0.interaction_enabled.set(enabled);
    }

    pub fn corner_radius(&self) -> f32 {
        self.0.corner_radius.get()
    }

    pub fn set_corner_radius(&self, radius: f32) {
        self.0.corner_radius.set(radius.max(0.0));
    }

    pub fn role(&self) -> SurfaceRole {
        self.0.role.get()
    }

    // ========== 焦点 ==========

    pub fn is_focused(&self) -> bool {
        self.0.focused.get()
    }

    /// 让文本输入框获得焦点
    ///
    /// 非输入框节点不接受焦点，返回 `false`。
    pub fn focus(&self) -> bool {
        if self.role() != SurfaceRole::TextInput {
            return false;
        }
        self.0.focused.set(true);
        true
    }

    pub fn blur(&self) {
        self.0.focused.set(false);
    }

    /// 清除整棵子树的焦点
    pub fn end_editing(&self) {
        self.blur();
        for child in self.children() {
            child.end_editing();
        }
    }

    /// 深度优先查找获得焦点的文本输入框
    ///
    /// 网页内容节点的子树整体跳过。
    pub fn find_focused_text_input(&self) -> Option<Surface> {
        match self.role() {
            SurfaceRole::WebContent => return None,
            SurfaceRole::TextInput if self.is_focused() => return Some(self.clone()),
            _ => {}
        }
        self.children()
            .iter()
            .find_map(|child| child.find_focused_text_input())
    }

    // ========== 层级 ==========

    pub fn parent(&self) -> Option<Surface> {
        self.0.parent.borrow().upgrade().map(Surface)
    }

    /// 子节点快照（自底向上）
    pub fn children(&self) -> Vec<Surface> {
        self.0.children.borrow().clone()
    }

    pub fn index_of(&self, child: &Surface) -> Option<usize> {
        self.0.children.borrow().iter().position(|c| c == child)
    }

    /// 追加到最上层
    pub fn add_child(&self, child: &Surface) {
        let index = self.0.children.borrow().len();
        self.insert_at(child, index);
    }

    /// 插入到指定层级，已有父节点时先移除
    pub fn insert_at(&self, child: &Surface, index: usize) {
        child.remove_from_parent();
        let mut children = self.0.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
    }

    /// 插入到 `sibling` 之上；`sibling` 不是子节点时追加到最上层
    pub fn insert_above(&self, child: &Surface, sibling: &Surface) {
        child.remove_from_parent();
        match self.index_of(sibling) {
            Some(index) => self.insert_at(child, index + 1),
            None => self.add_child(child),
        }
    }

    /// 插入到 `sibling` 之下；`sibling` 不是子节点时放到最底层
    pub fn insert_below(&self, child: &Surface, sibling: &Surface) {
        child.remove_from_parent();
        match self.index_of(sibling) {
            Some(index) => self.insert_at(child, index),
            None => self.insert_at(child, 0),
        }
    }

    pub fn remove_from_parent(&self) {
        let parent = self.0.parent.replace(Weak::new());
        if let Some(parent) = parent.upgrade() {
            parent.children.borrow_mut().retain(|c| c != self);
        }
    }

    /// 是否为 `ancestor` 的后代（不含自身）
    pub fn is_descendant_of(&self, ancestor: &Surface) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if &node == ancestor {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// 整棵子树（不含自身），先序
    pub fn descendants(&self) -> Vec<Surface> {
        let mut result = Vec::new();
        for child in self.children() {
            result.push(child.clone());
            result.extend(child.descendants());
        }
        result
    }

    /// 自身原点在 `ancestor` 坐标系中的位置
    ///
    /// 只累加 frame，不计变换。`ancestor` 不是祖先时返回 `None`。
    pub fn origin_in(&self, ancestor: &Surface) -> Option<Point> {
        let mut point = self.frame().origin;
        let mut current = self.parent();
        while let Some(node) = current {
            if &node == ancestor {
                return Some(point);
            }
            point.x += node.frame().origin.x;
            point.y += node.frame().origin.y;
            current = node.parent();
        }
        None
    }

    // ========== 点击 ==========

    pub fn set_tap_handler(&self, handler: impl Fn() + 'static) {
        *self.0.tap_handler.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn clear_tap_handler(&self) {
        self.0.tap_handler.borrow_mut().take();
    }

    /// 模拟一次点击
    ///
    /// 交互关闭或没有处理器时返回 `false`。
    pub fn tap(&self) -> bool {
        if !self.is_interaction_enabled() {
            return false;
        }
        let handler = self.0.tap_handler.borrow().clone();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl Changes {
    /// 透明度目标值
    pub fn alpha(&mut self, surface: &Surface, alpha: f32) -> &mut Self {
        self.set(&surface.animatable(), "alpha", alpha)
    }

    /// frame 目标值
    pub fn frame(&mut self, surface: &Surface, frame: Rect) -> &mut Self {
        let object = surface.animatable();
        self.set(&object, "frame.x", frame.origin.x)
            .set(&object, "frame.y", frame.origin.y)
            .set(&object, "frame.w", frame.size.width)
            .set(&object, "frame.h", frame.size.height)
    }

    /// 变换目标值（缩放取 x 分量）
    pub fn transform(&mut self, surface: &Surface, transform: Transform) -> &mut Self {
        let object = surface.animatable();
        self.set(&object, "transform.tx", transform.translation.x)
            .set(&object, "transform.ty", transform.translation.y)
            .set(&object, "transform.scale", transform.scale.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hierarchy_ordering() {
        let root = Surface::new("root");
        let a = Surface::new("a");
        let b = Surface::new("b");
        let c = Surface::new("c");

        root.add_child(&a);
        root.add_child(&b);
        root.insert_below(&c, &b);

        let names: Vec<String> = root.children().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);

        root.insert_above(&a, &b);
        let names: Vec<String> = root.children().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_eq!(a.parent(), Some(root.clone()));
    }

    #[test]
    fn test_reparent_removes_from_old_parent() {
        let first = Surface::new("first");
        let second = Surface::new("second");
        let child = Surface::new("child");

        first.add_child(&child);
        second.add_child(&child);
        assert!(first.children().is_empty());
        assert_eq!(second.children().len(), 1);

        child.remove_from_parent();
        assert!(child.parent().is_none());
        assert!(second.children().is_empty());
    }

    #[test]
    fn test_alpha_is_clamped() {
        let surface = Surface::new("s");
        surface.set_alpha(1.4);
        assert_eq!(surface.alpha(), 1.0);
        surface.animatable().set_property("alpha", -0.2);
        assert_eq!(surface.alpha(), 0.0);
    }

    #[test]
    fn test_animatable_properties() {
        let surface = Surface::with_frame("s", Rect::new(1.0, 2.0, 3.0, 4.0));
        let object = surface.animatable();
        assert_eq!(object.get_property("frame.y"), Some(2.0));
        assert!(object.set_property("transform.scale", 0.5));
        assert_eq!(surface.transform().scale.y, 0.5);
        assert!(object.set_property("frame.w", 30.0));
        assert_eq!(surface.frame().width(), 30.0);
        assert!(!object.set_property("unknown", 1.0));
    }

    #[test]
    fn test_focused_input_search_skips_web_content() {
        let root = Surface::new("root");
        let web = Surface::with_role("web", Rect::ZERO, SurfaceRole::WebContent);
        let web_input = Surface::with_role("web-input", Rect::ZERO, SurfaceRole::TextInput);
        let input = Surface::with_role("input", Rect::ZERO, SurfaceRole::TextInput);

        root.add_child(&web);
        web.add_child(&web_input);
        root.add_child(&input);

        assert!(web_input.focus());
        assert!(root.find_focused_text_input().is_none());

        assert!(input.focus());
        assert_eq!(root.find_focused_text_input(), Some(input.clone()));

        root.end_editing();
        assert!(!input.is_focused());
        assert!(!web_input.is_focused());
    }

    #[test]
    fn test_plain_surface_rejects_focus() {
        let surface = Surface::new("plain");
        assert!(!surface.focus());
        assert!(!surface.is_focused());
    }

    #[test]
    fn test_origin_in_ancestor() {
        let root = Surface::with_frame("root", Rect::new(0.0, 0.0, 400.0, 800.0));
        let container = Surface::with_frame("container", Rect::new(50.0, 300.0, 300.0, 200.0));
        let input = Surface::with_frame("input", Rect::new(10.0, 20.0, 100.0, 30.0));
        root.add_child(&container);
        container.add_child(&input);

        assert_eq!(input.origin_in(&root), Some(Point::new(60.0, 320.0)));
        assert_eq!(input.origin_in(&container), Some(Point::new(10.0, 20.0)));
        assert_eq!(root.origin_in(&input), None);
        assert!(input.is_descendant_of(&root));
    }

    #[test]
    fn test_tap_respects_interaction() {
        let surface = Surface::new("backdrop");
        let taps = Rc::new(Cell::new(0));
        let counter = taps.clone();
        surface.set_tap_handler(move || counter.set(counter.get() + 1));

        assert!(surface.tap());
        surface.set_interaction_enabled(false);
        assert!(!surface.tap());
        assert_eq!(taps.get(), 1);
    }

    #[test]
    fn test_fitting_child_follows_parent_size() {
        let nav = Surface::with_frame("navigation", Rect::new(0.0, 0.0, 300.0, 200.0));
        let page = Surface::with_frame("page", nav.bounds());
        let badge = Surface::with_frame("badge", Rect::new(10.0, 10.0, 20.0, 20.0));
        page.set_fills_parent(true);
        assert!(page.fills_parent() && !badge.fills_parent());
        nav.add_child(&page);
        nav.add_child(&badge);

        nav.set_frame(Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(page.frame(), Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(badge.frame(), Rect::new(10.0, 10.0, 20.0, 20.0));

        // 逐分量写入同样生效
        let object = nav.animatable();
        assert!(object.set_property("frame.w", 320.0));
        assert_eq!(page.frame(), Rect::new(0.0, 0.0, 320.0, 400.0));
        // 只移动原点不改子节点
        page.set_frame(Rect::new(0.0, 50.0, 320.0, 400.0));
        assert!(object.set_property("frame.x", 12.0));
        assert_eq!(page.frame(), Rect::new(0.0, 50.0, 320.0, 400.0));
    }
}
