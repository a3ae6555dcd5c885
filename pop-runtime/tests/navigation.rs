//! # 弹窗内导航集成测试

use pop_runtime::{
    AppearanceEvent, ContentController, DismissalRoutable, HostConfig, MainQueue, PopConfig, PopController, PopEnv,
    Orientation, PopNavigation, PopRegistry, Rect, SimpleContent, SimulatedHost, Size,
};

const STEP: f32 = 1.0 / 60.0;

#[test]
fn test_push_and_pop_resize_the_popup() {
    let queue = MainQueue::new();
    let host = SimulatedHost::new(queue.clone(), HostConfig::default());
    let root = SimpleContent::new("list", Size::new(300.0, 200.0));
    let nav = PopNavigation::new(root.clone(), queue.clone());
    let pop = PopController::with_config(
        nav.clone(),
        PopEnv::new(queue.clone(), PopRegistry::new()),
        &PopConfig::default(),
    );

    pop.present(host.as_modal());
    queue.run_until_idle(STEP);
    assert_eq!(pop.container_frame(), Rect::new(37.5, 306.0, 300.0, 200.0));
    assert_eq!(
        root.events(),
        vec![
            AppearanceEvent::WillAppear,
            AppearanceEvent::DidAppear,
            AppearanceEvent::DidMoveToParent
        ]
    );

    let detail = SimpleContent::new("detail", Size::new(300.0, 400.0));
    assert!(nav.push(detail.clone()));
    queue.run_until_idle(STEP);
    assert_eq!(pop.container_frame(), Rect::new(37.5, 206.0, 300.0, 400.0));
    assert_eq!(nav.surface().children(), vec![detail.surface()]);
    // 子内容跟随弹窗变高
    assert_eq!(detail.surface().frame(), Rect::new(0.0, 0.0, 300.0, 400.0));

    // 子内容可以经由导航栈关闭弹窗
    assert!(detail.pop_handle().is_some());

    assert!(nav.pop().is_some());
    queue.run_until_idle(STEP);
    assert_eq!(pop.container_frame(), Rect::new(37.5, 306.0, 300.0, 200.0));
    assert_eq!(nav.surface().children(), vec![root.surface()]);
    assert_eq!(root.surface().frame(), Rect::new(0.0, 0.0, 300.0, 200.0));
}

#[test]
fn test_top_child_refits_on_rotation() {
    let queue = MainQueue::new();
    let host = SimulatedHost::new(queue.clone(), HostConfig::default());
    let nav = PopNavigation::new(SimpleContent::new("list", Size::new(300.0, 200.0)), queue.clone());
    let pop = PopController::new(nav.clone(), PopEnv::new(queue.clone(), PopRegistry::new()));
    pop.present(host.as_modal());
    queue.run_until_idle(STEP);

    let detail = SimpleContent::with_sizes("detail", Size::new(300.0, 400.0), Size::new(500.0, 300.0));
    nav.push(detail.clone());
    queue.run_until_idle(STEP);

    host.rotate(Orientation::Landscape);
    queue.run_until_idle(STEP);
    assert_eq!(pop.content_frame(), Rect::new(0.0, 0.0, 500.0, 300.0));
    assert_eq!(detail.surface().frame(), Rect::new(0.0, 0.0, 500.0, 300.0));

    // 内容尺寸变化同样传到子内容
    nav.preferred_size().set_landscape(Size::new(480.0, 280.0));
    queue.run_until_idle(STEP);
    assert_eq!(detail.surface().frame(), Rect::new(0.0, 0.0, 480.0, 280.0));
}

#[test]
fn test_child_close_dismisses_popup() {
    let queue = MainQueue::new();
    let host = SimulatedHost::new(queue.clone(), HostConfig::default());
    let nav = PopNavigation::new(SimpleContent::new("list", Size::new(300.0, 200.0)), queue.clone());
    let pop = PopController::new(nav.clone(), PopEnv::new(queue.clone(), PopRegistry::new()));
    pop.present(host.as_modal());
    queue.run_until_idle(STEP);

    let detail = SimpleContent::new("detail", Size::ZERO);
    nav.push(detail.clone());
    queue.run_until_idle(STEP);
    // 零尺寸回退到首次出现时的尺寸
    assert_eq!(pop.container_frame(), Rect::new(37.5, 306.0, 300.0, 200.0));

    assert!(detail.close());
    queue.run_until_idle(STEP);
    assert!(!pop.is_presented());
    assert!(host.presented().is_empty());
}
