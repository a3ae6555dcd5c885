//! # Config 模块
//!
//! 弹窗实例的可调参数，集中在 [`PopConfig`] 中。
//!
//! ## 配置优先级
//!
//! 1. 代码中逐项调用 setter（最高）
//! 2. 配置文件 / JSON 字符串
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::geometry::{EdgeInsets, Point};
use crate::style::{EnterEffect, ExitEffect, PopPosition, SpringConfig};

/// 弹窗配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopConfig {
    /// 进入效果
    #[serde(default)]
    pub enter: EnterEffect,

    /// 退出效果
    #[serde(default)]
    pub exit: ExitEffect,

    /// 动画时长（秒），0 表示使用默认时长
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// 弹簧参数
    #[serde(default)]
    pub spring: SpringConfig,

    /// 锚定位置
    #[serde(default)]
    pub position: PopPosition,

    /// 在锚定位置基础上的偏移
    #[serde(default)]
    pub position_offset: Point,

    /// 背景的目标透明度
    #[serde(default = "default_backdrop_alpha")]
    pub backdrop_alpha: f32,

    /// 点击背景是否关闭
    #[serde(default = "default_true")]
    pub dismiss_on_backdrop_touch: bool,

    /// 是否自动避让键盘
    #[serde(default = "default_true")]
    pub auto_handle_keyboard: bool,

    /// 固定的安全区；不设置时展示前从宿主读取
    #[serde(default)]
    pub safe_area: Option<EdgeInsets>,

    /// 容器圆角
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,
}

fn default_duration() -> f32 {
    0.2
}

fn default_backdrop_alpha() -> f32 {
    0.5
}

fn default_true() -> bool {
    true
}

fn default_corner_radius() -> f32 {
    8.0
}

impl Default for PopConfig {
    fn default() -> Self {
        Self {
            enter: EnterEffect::default(),
            exit: ExitEffect::default(),
            duration: default_duration(),
            spring: SpringConfig::default(),
            position: PopPosition::default(),
            position_offset: Point::ZERO,
            backdrop_alpha: default_backdrop_alpha(),
            dismiss_on_backdrop_touch: true,
            auto_handle_keyboard: true,
            safe_area: None,
            corner_radius: default_corner_radius(),
        }
    }
}

impl PopConfig {
    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration >= 0.0) {
            return Err(ConfigError::invalid(
                "duration",
                format!("必须 >= 0，实际为 {}", self.duration),
            ));
        }
        if !(self.spring.damping > 0.0 && self.spring.damping <= 1.0) {
            return Err(ConfigError::invalid(
                "spring.damping",
                format!("必须在 (0, 1] 内，实际为 {}", self.spring.damping),
            ));
        }
        if !(self.spring.velocity >= 0.0) {
            return Err(ConfigError::invalid(
                "spring.velocity",
                format!("必须 >= 0，实际为 {}", self.spring.velocity),
            ));
        }
        if !(0.0..=1.0).contains(&self.backdrop_alpha) {
            return Err(ConfigError::invalid(
                "backdrop_alpha",
                format!("必须在 [0, 1] 内，实际为 {}", self.backdrop_alpha),
            ));
        }
        if !(self.corner_radius >= 0.0) {
            return Err(ConfigError::invalid(
                "corner_radius",
                format!("必须 >= 0，实际为 {}", self.corner_radius),
            ));
        }
        Ok(())
    }
}
