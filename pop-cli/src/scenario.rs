//! 场景定义与执行。
//!
//! 场景是一段 JSON：宿主尺寸、弹窗配置、内容尺寸，以及按顺序执行的步骤。
//! 每一步执行后记录一行轨迹；`wait` 按固定帧长推进时间。

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pop_runtime::{
    ContentController, HostConfig, MainQueue, ModalHost, Orientation, PopConfig, PopController,
    PopEnv, PopNavigation, PopPhase, PopRegistry, Rect, SimpleContent, SimulatedHost, Size,
    Surface, SurfaceRole,
};

/// 场景文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub popup: PopConfig,
    pub content: ContentSpec,
    pub steps: Vec<Step>,
}

/// 弹窗内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentSpec {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub landscape: Option<Size>,
    /// 包一层导航栈，允许 `push` / `pop`
    #[serde(default)]
    pub navigation: bool,
}

/// 场景步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Present,
    Dismiss,
    /// 推进时间（秒）
    Wait { seconds: f32 },
    /// 推进直到没有任务与动画
    Settle,
    Rotate { orientation: Orientation },
    Resize { width: f32, height: f32 },
    KeyboardShow { height: f32 },
    KeyboardHide,
    TapBackdrop,
    FocusInput,
    /// 修改内容的竖屏尺寸
    ContentSize { width: f32, height: f32 },
    Push { width: f32, height: f32 },
    Pop,
}

impl Step {
    fn label(&self) -> String {
        match self {
            Self::Present => "present".to_string(),
            Self::Dismiss => "dismiss".to_string(),
            Self::Wait { seconds } => format!("wait {seconds}"),
            Self::Settle => "settle".to_string(),
            Self::Rotate { orientation } => format!("rotate {orientation:?}"),
            Self::Resize { width, height } => format!("resize {width}x{height}"),
            Self::KeyboardShow { height } => format!("keyboard_show {height}"),
            Self::KeyboardHide => "keyboard_hide".to_string(),
            Self::TapBackdrop => "tap_backdrop".to_string(),
            Self::FocusInput => "focus_input".to_string(),
            Self::ContentSize { width, height } => format!("content_size {width}x{height}"),
            Self::Push { width, height } => format!("push {width}x{height}"),
            Self::Pop => "pop".to_string(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取场景文件: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("场景文件无效: {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        self.popup.validate()?;
        if self.content.width == 0.0 && self.content.height == 0.0 {
            bail!("内容尺寸不能为零");
        }
        if self.steps.is_empty() {
            bail!("场景没有任何步骤");
        }
        let has_nav_steps = self
            .steps
            .iter()
            .any(|step| matches!(step, Step::Push { .. } | Step::Pop));
        if has_nav_steps && !self.content.navigation {
            bail!("push / pop 需要 content.navigation = true");
        }
        for step in &self.steps {
            if let Step::Wait { seconds } = step
                && !(*seconds >= 0.0)
            {
                bail!("wait 的时长无效: {seconds}");
            }
        }
        Ok(())
    }
}

/// 一行轨迹
#[derive(Debug, Clone, Serialize)]
pub struct TraceRow {
    pub index: usize,
    pub action: String,
    pub time: f64,
    pub phase: String,
    pub frame: Rect,
    pub alpha: f32,
    pub translate_y: f32,
    pub scale: f32,
    pub backdrop_alpha: f32,
}

impl std::fmt::Display for TraceRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>3} {:<20} t={:>6.3} {:<16} frame=({:.1}, {:.1}, {:.1}, {:.1}) alpha={:.2} ty={:.1} scale={:.2} backdrop={:.2}",
            self.index,
            self.action,
            self.time,
            self.phase,
            self.frame.x(),
            self.frame.y(),
            self.frame.width(),
            self.frame.height(),
            self.alpha,
            self.translate_y,
            self.scale,
            self.backdrop_alpha,
        )
    }
}

/// 场景执行器
pub struct Runner {
    queue: MainQueue,
    host: SimulatedHost,
    registry: PopRegistry,
    pop: PopController,
    navigation: Option<Rc<PopNavigation>>,
    input: Surface,
    step: f32,
    pushed: usize,
}

impl Runner {
    pub fn new(scenario: &Scenario, step: f32) -> Result<Self> {
        if !(step > 0.0) {
            bail!("帧长必须大于 0: {step}");
        }
        let queue = MainQueue::new();
        let host = SimulatedHost::new(queue.clone(), scenario.host);
        let registry = PopRegistry::new();

        let spec = &scenario.content;
        let portrait = Size::new(spec.width, spec.height);
        let content = SimpleContent::with_sizes("content", portrait, spec.landscape.unwrap_or_default());
        let input = Surface::with_role(
            "input",
            Rect::new(16.0, 16.0, (spec.width - 32.0).max(0.0), 40.0),
            SurfaceRole::TextInput,
        );
        content.surface().add_child(&input);

        let navigation = spec
            .navigation
            .then(|| PopNavigation::new(content.clone(), queue.clone()));
        let controller_content: Rc<dyn ContentController> = match &navigation {
            Some(nav) => nav.clone(),
            None => content,
        };

        let pop = PopController::with_config(
            controller_content,
            PopEnv::new(queue.clone(), registry.clone()),
            &scenario.popup,
        );

        Ok(Self {
            queue,
            host,
            registry,
            pop,
            navigation,
            input,
            step,
            pushed: 0,
        })
    }

    /// 执行全部步骤，返回轨迹
    pub fn run(&mut self, scenario: &Scenario) -> Result<Vec<TraceRow>> {
        let mut rows = vec![self.sample(0, "initial".to_string())];
        for (index, step) in scenario.steps.iter().enumerate() {
            self.apply(step)?;
            rows.push(self.sample(index + 1, step.label()));
        }
        self.queue.run_until_idle(self.step);
        rows.push(self.sample(scenario.steps.len() + 1, "final".to_string()));
        info!(
            steps = scenario.steps.len(),
            registered = self.registry.len(),
            "scenario finished"
        );
        Ok(rows)
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        debug!(?step, "apply step");
        match step {
            Step::Present => {
                self.pop.present(self.host.as_modal());
            }
            Step::Dismiss => {
                self.pop.dismiss();
            }
            Step::Wait { seconds } => self.queue.advance(*seconds, self.step),
            Step::Settle => {
                self.queue.run_until_idle(self.step);
            }
            Step::Rotate { orientation } => self.host.rotate(*orientation),
            Step::Resize { width, height } => {
                let orientation = if width > height {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                };
                self.host.resize(Size::new(*width, *height), orientation);
            }
            Step::KeyboardShow { height } => self.host.show_keyboard(*height),
            Step::KeyboardHide => self.host.hide_keyboard(),
            Step::TapBackdrop => {
                self.host.tap_backdrop();
            }
            Step::FocusInput => {
                if !self.input.focus() {
                    bail!("输入框无法获得焦点");
                }
            }
            Step::ContentSize { width, height } => {
                self.pop
                    .content()
                    .preferred_size()
                    .set_portrait(Size::new(*width, *height));
            }
            Step::Push { width, height } => {
                let nav = self.navigation.as_ref().context("内容不是导航栈")?;
                self.pushed += 1;
                let child = SimpleContent::new(format!("page{}", self.pushed), Size::new(*width, *height));
                if !nav.push(child) {
                    bail!("导航转场进行中，push 被拒绝");
                }
            }
            Step::Pop => {
                let nav = self.navigation.as_ref().context("内容不是导航栈")?;
                if nav.pop().is_none() {
                    bail!("导航栈只剩根内容或转场进行中，pop 被拒绝");
                }
            }
        }
        Ok(())
    }

    fn sample(&self, index: usize, action: String) -> TraceRow {
        let container = self.pop.container();
        let transform = container.transform();
        TraceRow {
            index,
            action,
            time: self.queue.now(),
            phase: phase_name(self.pop.phase()).to_string(),
            frame: container.frame(),
            alpha: container.alpha(),
            translate_y: transform.translation.y,
            scale: transform.scale.x,
            backdrop_alpha: self.pop.backdrop().alpha(),
        }
    }

    pub fn host_bounds(&self) -> Rect {
        self.host.bounds()
    }
}

fn phase_name(phase: PopPhase) -> &'static str {
    match phase {
        PopPhase::Idle => "idle",
        PopPhase::PresentScheduled => "present_scheduled",
        PopPhase::Presenting => "presenting",
        PopPhase::Presented => "presented",
        PopPhase::DismissScheduled => "dismiss_scheduled",
        PopPhase::Dismissing => "dismissing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIALOG: &str = r#"{
        "content": { "width": 300, "height": 200 },
        "steps": [
            { "action": "present" },
            { "action": "settle" },
            { "action": "dismiss" },
            { "action": "settle" }
        ]
    }"#;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json(DIALOG).unwrap();
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(scenario.steps[0], Step::Present);
        assert_eq!(scenario.host.width, 375.0);
    }

    #[test]
    fn test_run_dialog() {
        let scenario = Scenario::from_json(DIALOG).unwrap();
        let mut runner = Runner::new(&scenario, 1.0 / 60.0).unwrap();
        let rows = runner.run(&scenario).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[2].phase, "presented");
        assert_eq!(rows[2].frame, Rect::new(37.5, 306.0, 300.0, 200.0));
        assert_eq!(rows[2].backdrop_alpha, 0.5);
        assert_eq!(rows[4].phase, "idle");
    }

    #[test]
    fn test_nav_steps_require_navigation() {
        let json = r#"{
            "content": { "width": 300, "height": 200 },
            "steps": [{ "action": "push", "width": 300, "height": 400 }]
        }"#;
        assert!(Scenario::from_json(json).is_err());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let json = r#"{
            "content": { "width": 300, "height": 200 },
            "steps": [{ "action": "explode" }]
        }"#;
        assert!(Scenario::from_json(json).is_err());
    }
}
