//! # 环境信号集成测试
//!
//! 键盘、旋转与内容尺寸变化对已展示弹窗的影响。

use std::rc::Rc;

use pop_runtime::environment::{KEY_CURVE, KEY_DURATION, Payload};
use pop_runtime::{
    ContentController, HostConfig, MainQueue, ModalHost, NotificationName, Orientation, PopConfig, PopController, PopEnv,
    PopPosition, PopRegistry, Rect, SimpleContent, SimulatedHost, Size, Surface, SurfaceRole,
    Transform,
};

const STEP: f32 = 1.0 / 60.0;

struct Presented {
    queue: MainQueue,
    host: SimulatedHost,
    content: Rc<SimpleContent>,
    pop: PopController,
    field: Surface,
}

fn present(position: PopPosition, content: Rc<SimpleContent>) -> Presented {
    let queue = MainQueue::new();
    let host = SimulatedHost::new(queue.clone(), HostConfig::default());
    let env = PopEnv::new(queue.clone(), PopRegistry::new());
    let config = PopConfig {
        position,
        ..PopConfig::default()
    };

    let field = Surface::with_role("field", Rect::new(20.0, 120.0, 260.0, 40.0), SurfaceRole::TextInput);
    content.surface().add_child(&field);

    let pop = PopController::with_config(content.clone(), env, &config);
    pop.present(host.as_modal());
    queue.run_until_idle(STEP);
    Presented {
        queue,
        host,
        content,
        pop,
        field,
    }
}

fn dialog() -> Rc<SimpleContent> {
    SimpleContent::new("dialog", Size::new(300.0, 200.0))
}

// ========== 键盘 ==========

#[test]
fn test_bottom_popup_rises_by_keyboard_minus_inset() {
    let p = present(PopPosition::Bottom, dialog());
    assert!(p.field.focus());

    p.host.show_keyboard(300.0);
    p.queue.run_until_idle(STEP);
    // 300 - 34
    assert_eq!(p.pop.container().transform(), Transform::translation(0.0, -266.0));
    // 变换不改 frame
    assert_eq!(p.pop.container_frame(), Rect::new(37.5, 578.0, 300.0, 234.0));

    p.host.hide_keyboard();
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container().transform(), Transform::identity());
}

#[test]
fn test_center_popup_recenters_above_keyboard() {
    let p = present(PopPosition::Center, dialog());
    p.field.focus();

    p.host.show_keyboard(300.0);
    p.queue.run_until_idle(STEP);
    // 可用 812 - 300 - 44 = 468，目标 y = 44 + 134 = 178，原 y = 306
    assert_eq!(p.pop.container().transform(), Transform::translation(0.0, -128.0));
}

#[test]
fn test_center_popup_uses_live_status_bar_height() {
    let p = present(PopPosition::Center, dialog());
    p.host.set_status_bar_height(20.0);
    p.field.focus();

    p.host.show_keyboard(300.0);
    p.queue.run_until_idle(STEP);
    // 可用 812 - 300 - 20 = 492，目标 y = 20 + 146 = 166
    assert_eq!(p.pop.container().transform(), Transform::translation(0.0, -140.0));
}

#[test]
fn test_keyboard_frame_change_reapplies_offset() {
    let p = present(PopPosition::Bottom, dialog());
    p.field.focus();
    p.host.show_keyboard(300.0);
    p.queue.run_until_idle(STEP);

    p.host.change_keyboard(250.0);
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container().transform(), Transform::translation(0.0, -216.0));
    assert_eq!(p.pop.keyboard_info().map(|info| info.height()), Some(250.0));
}

#[test]
fn test_keyboard_ignored_without_focused_input() {
    let p = present(PopPosition::Bottom, dialog());
    p.host.show_keyboard(300.0);
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container().transform(), Transform::identity());
    assert!(p.pop.keyboard_info().is_none());
}

#[test]
fn test_keyboard_ignored_when_auto_handling_disabled() {
    let queue = MainQueue::new();
    let host = SimulatedHost::new(queue.clone(), HostConfig::default());
    let content = dialog();
    let field = Surface::with_role("field", Rect::new(0.0, 0.0, 100.0, 40.0), SurfaceRole::TextInput);
    content.surface().add_child(&field);
    let config = PopConfig {
        auto_handle_keyboard: false,
        position: PopPosition::Bottom,
        ..PopConfig::default()
    };
    let pop = PopController::with_config(content, PopEnv::new(queue.clone(), PopRegistry::new()), &config);
    pop.present(host.as_modal());
    queue.run_until_idle(STEP);

    // 只有旋转观察者
    assert_eq!(host.notifications().total_observers(), 1);
    field.focus();
    host.show_keyboard(300.0);
    queue.run_until_idle(STEP);
    assert_eq!(pop.container().transform(), Transform::identity());
}

#[test]
fn test_malformed_keyboard_payload_is_ignored() {
    let p = present(PopPosition::Bottom, dialog());
    p.field.focus();

    let mut payload = Payload::new();
    payload.insert(KEY_DURATION.to_string(), 0.25.into());
    payload.insert(KEY_CURVE.to_string(), 7.into());
    // 缺少 frame_end
    p.host.post_raw(NotificationName::KeyboardWillShow, &payload);
    assert!(p.queue.is_idle());

    let mut unknown_curve = Payload::new();
    unknown_curve.insert(KEY_DURATION.to_string(), 0.25.into());
    unknown_curve.insert(KEY_CURVE.to_string(), 42.into());
    p.host.post_raw(NotificationName::KeyboardWillHide, &unknown_curve);
    assert!(p.queue.is_idle());
    assert_eq!(p.pop.container().transform(), Transform::identity());
}

// ========== 旋转 ==========

#[test]
fn test_rotation_relayouts_with_landscape_size() {
    let content = SimpleContent::with_sizes("dialog", Size::new(300.0, 200.0), Size::new(500.0, 300.0));
    let p = present(PopPosition::Center, content);
    let container = p.pop.container();
    let root = p.pop.root();

    p.host.rotate(Orientation::Landscape);
    p.queue.run_until_idle(STEP);

    assert_eq!(p.pop.container_frame(), Rect::new(156.0, 37.5, 500.0, 300.0));
    assert_eq!(p.pop.content_frame(), Rect::new(0.0, 0.0, 500.0, 300.0));
    assert_eq!(p.pop.backdrop().frame(), Rect::new(0.0, 0.0, 812.0, 375.0));
    // 节点身份不变
    assert_eq!(p.pop.container(), container);
    assert_eq!(p.host.presented(), vec![root]);

    p.host.rotate(Orientation::Portrait);
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container_frame(), Rect::new(37.5, 306.0, 300.0, 200.0));
}

#[test]
fn test_rotation_ends_editing() {
    let p = present(PopPosition::Center, dialog());
    p.field.focus();
    assert!(p.field.is_focused());

    p.host.rotate(Orientation::Landscape);
    assert!(!p.field.is_focused());
    p.queue.run_until_idle(STEP);
}

#[test]
fn test_rotation_keeps_keyboard_translation() {
    let p = present(PopPosition::Bottom, dialog());
    p.pop.container().set_transform(Transform::translation(0.0, -40.0));
    p.host.rotate(Orientation::Landscape);
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container().transform(), Transform::translation(0.0, -40.0));
}

// ========== 内容尺寸 ==========

#[test]
fn test_content_size_change_relayouts() {
    let p = present(PopPosition::Center, dialog());
    p.content.preferred_size().set_portrait(Size::new(300.0, 400.0));
    assert!(!p.queue.is_idle());
    p.queue.run_until_idle(STEP);
    assert_eq!(p.pop.container_frame(), Rect::new(37.5, 206.0, 300.0, 400.0));
}

#[test]
fn test_content_size_change_after_dismiss_is_ignored() {
    let p = present(PopPosition::Center, dialog());
    p.pop.dismiss();
    p.queue.run_until_idle(STEP);
    assert_eq!(p.content.preferred_size().observer_count(), 0);

    p.content.preferred_size().set_portrait(Size::new(300.0, 400.0));
    assert!(p.queue.is_idle());
}

#[test]
fn test_observers_removed_after_dismiss() {
    let p = present(PopPosition::Center, dialog());
    assert_eq!(p.host.notifications().total_observers(), 4);
    p.pop.dismiss();
    p.queue.run_until_idle(STEP);
    assert_eq!(p.host.notifications().total_observers(), 0);

    p.field.focus();
    p.host.show_keyboard(300.0);
    assert!(p.queue.is_idle());
}
