//! # Pop Runtime
//!
//! 弹窗呈现与转场的核心库。
//!
//! ## 架构概述
//!
//! `pop-runtime` 不依赖任何窗口系统。宿主通过 [`ModalHost`] 提供
//! 模态展示原语与环境通知，所有动画在单线程的 [`MainQueue`] 上推进：
//!
//! ```text
//! 调用方            PopController            PopTransition          ModalHost
//!   │ present()          │                        │                     │
//!   │──────────────────►│ (下一帧)               │                     │
//!   │                    │── present_modal ──────────────────────────►│
//!   │                    │                        │◄─ animate_transition│
//!   │                    │                        │ 背景淡入 + 进入效果  │
//!   │                    │                        │── complete ───────►│
//!   │                    │◄──────────────────────────── completion ────│
//! ```
//!
//! ## 核心类型
//!
//! - [`PopController`]：弹窗实例，管理布局、生命周期与环境响应
//! - [`PopAnimator`] / [`DefaultAnimator`]：进入 / 退出效果执行器
//! - [`PopTransition`]：一次展示或关闭的转场编排
//! - [`SimulatedHost`]：确定性的无头宿主，用于 CLI 与测试
//! - [`MainQueue`]：主队列，`tick(dt)` 推进任务与动画
//!
//! ## 使用示例
//!
//! ```ignore
//! let queue = MainQueue::new();
//! let env = PopEnv::new(queue.clone(), PopRegistry::new());
//! let host = SimulatedHost::new(queue.clone(), HostConfig::default());
//!
//! let content = SimpleContent::new("sheet", Size::new(375.0, 300.0));
//! let pop = PopController::new(content, env);
//! pop.set_position(PopPosition::Bottom);
//! pop.set_enter_effect(EnterEffect::BounceFromBottom);
//! pop.present(host.as_modal());
//!
//! queue.run_until_idle(1.0 / 60.0);
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：属性动画系统
//! - [`effect`]：效果目录与执行器
//! - [`transition`]：转场编排
//! - [`controller`]：弹窗控制器、布局与键盘避让
//! - [`nav`]：弹窗内导航栈
//! - [`host`]：宿主抽象与模拟宿主

pub mod animation;
pub mod config;
pub mod content;
pub mod controller;
pub mod effect;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod host;
pub mod nav;
pub mod registry;
pub mod runloop;
pub mod style;
pub mod surface;
pub mod transition;

// 重导出核心类型
pub use animation::{EasingFunction, Timing, Transform};
pub use config::PopConfig;
pub use content::{
    AppearanceEvent, ContentController, DismissalRoutable, PreferredContentSize, SimpleContent,
};
pub use controller::{PopController, PopEnv, PopHandle, PopId, PopPhase};
pub use effect::{AnimationContext, DefaultAnimator, PopAnimator};
pub use environment::{KeyboardInfo, NotificationCenter, NotificationName};
pub use error::{ConfigError, LayoutError, PopError, PopResult, SignalError};
pub use geometry::{EdgeInsets, Orientation, Point, Rect, Size};
pub use host::{HostConfig, ModalHost, SimulatedHost};
pub use nav::{NavOperation, NavTransition, PopNavigation};
pub use registry::PopRegistry;
pub use runloop::{Changes, Completion, MainQueue};
pub use style::{EnterEffect, ExitEffect, PopPosition, PopState, SpringConfig};
pub use surface::{Surface, SurfaceRole};
pub use transition::{AnimatedTransitioning, PopTransition, TransitionContext};
