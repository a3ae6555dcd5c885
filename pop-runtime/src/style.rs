//! # Style 模块
//!
//! 弹窗的动画效果目录：位置、过渡方向、进入 / 退出效果与弹簧参数。
//!
//! 这里只是纯描述，真正的执行在 [`crate::effect`] 中。

use serde::{Deserialize, Serialize};

/// 弹窗在宿主区域内的锚定位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopPosition {
    /// 垂直居中
    #[default]
    Center,
    /// 贴顶
    Top,
    /// 贴底（高度额外包含底部安全区）
    Bottom,
}

/// 过渡方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopState {
    /// 进入
    Entering,
    /// 退出
    Exiting,
}

/// 方向性效果的屏幕边缘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// 进入效果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterEffect {
    /// 无动画，直接显示
    None,
    /// 淡入
    Fade,
    /// 从 0.9 倍放大到原尺寸
    #[default]
    Grow,
    /// 从 1.1 倍缩小到原尺寸
    Shrink,
    SlideFromTop,
    SlideFromBottom,
    SlideFromLeft,
    SlideFromRight,
    /// 从 0.1 倍弹簧放大
    Bounce,
    BounceFromTop,
    BounceFromBottom,
    BounceFromLeft,
    BounceFromRight,
}

impl EnterEffect {
    /// 所有进入效果
    pub const ALL: [EnterEffect; 13] = [
        Self::None,
        Self::Fade,
        Self::Grow,
        Self::Shrink,
        Self::SlideFromTop,
        Self::SlideFromBottom,
        Self::SlideFromLeft,
        Self::SlideFromRight,
        Self::Bounce,
        Self::BounceFromTop,
        Self::BounceFromBottom,
        Self::BounceFromLeft,
        Self::BounceFromRight,
    ];

    /// 平移类效果的起始边缘
    pub fn slide_edge(&self) -> Option<Edge> {
        match self {
            Self::SlideFromTop => Some(Edge::Top),
            Self::SlideFromBottom => Some(Edge::Bottom),
            Self::SlideFromLeft => Some(Edge::Left),
            Self::SlideFromRight => Some(Edge::Right),
            _ => None,
        }
    }

    /// 弹簧平移类效果的起始边缘
    pub fn bounce_edge(&self) -> Option<Edge> {
        match self {
            Self::BounceFromTop => Some(Edge::Top),
            Self::BounceFromBottom => Some(Edge::Bottom),
            Self::BounceFromLeft => Some(Edge::Left),
            Self::BounceFromRight => Some(Edge::Right),
            _ => None,
        }
    }
}

/// 退出效果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitEffect {
    /// 无动画，直接结束
    None,
    /// 淡出
    #[default]
    Fade,
    /// 放大到 1.1 倍并淡出
    Grow,
    /// 缩小到 0.85 倍并淡出
    Shrink,
    SlideToTop,
    SlideToBottom,
    SlideToLeft,
    SlideToRight,
    /// 先放大再缩小淡出的两段动画
    Bounce,
    BounceToTop,
    BounceToBottom,
    BounceToLeft,
    BounceToRight,
}

impl ExitEffect {
    /// 所有退出效果
    pub const ALL: [ExitEffect; 13] = [
        Self::None,
        Self::Fade,
        Self::Grow,
        Self::Shrink,
        Self::SlideToTop,
        Self::SlideToBottom,
        Self::SlideToLeft,
        Self::SlideToRight,
        Self::Bounce,
        Self::BounceToTop,
        Self::BounceToBottom,
        Self::BounceToLeft,
        Self::BounceToRight,
    ];

    /// 平移类效果的目标边缘
    pub fn slide_edge(&self) -> Option<Edge> {
        match self {
            Self::SlideToTop => Some(Edge::Top),
            Self::SlideToBottom => Some(Edge::Bottom),
            Self::SlideToLeft => Some(Edge::Left),
            Self::SlideToRight => Some(Edge::Right),
            _ => None,
        }
    }

    /// 两段式平移效果的目标边缘
    pub fn bounce_edge(&self) -> Option<Edge> {
        match self {
            Self::BounceToTop => Some(Edge::Top),
            Self::BounceToBottom => Some(Edge::Bottom),
            Self::BounceToLeft => Some(Edge::Left),
            Self::BounceToRight => Some(Edge::Right),
            _ => None,
        }
    }
}

/// 弹簧参数
///
/// - `damping`: 阻尼比，取值 (0, 1]，1 为临界阻尼（不回弹）
/// - `velocity`: 初始速度，取值 ≥ 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default)]
    pub velocity: f32,
}

fn default_damping() -> f32 {
    0.7
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            velocity: 0.0,
        }
    }
}

impl SpringConfig {
    /// 阻尼下限，避免除零
    pub const MIN_DAMPING: f32 = 0.01;

    /// 创建弹簧参数，越界值被夹到合法区间
    pub fn new(damping: f32, velocity: f32) -> Self {
        Self {
            damping: damping.clamp(Self::MIN_DAMPING, 1.0),
            velocity: velocity.max(0.0),
        }
    }

    /// 临界阻尼、零初速度
    pub fn critical() -> Self {
        Self::new(1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_config_clamps() {
        let config = SpringConfig::new(2.0, -1.0);
        assert_eq!(config.damping, 1.0);
        assert_eq!(config.velocity, 0.0);

        let config = SpringConfig::new(0.0, 3.0);
        assert_eq!(config.damping, SpringConfig::MIN_DAMPING);
        assert_eq!(config.velocity, 3.0);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(EnterEffect::default(), EnterEffect::Grow);
        assert_eq!(ExitEffect::default(), ExitEffect::Fade);
        assert_eq!(PopPosition::default(), PopPosition::Center);
        assert_eq!(SpringConfig::default(), SpringConfig::new(0.7, 0.0));
    }

    #[test]
    fn test_effect_serde_names() {
        let json = serde_json::to_string(&EnterEffect::SlideFromBottom).unwrap();
        assert_eq!(json, "\"slide_from_bottom\"");

        let effect: ExitEffect = serde_json::from_str("\"bounce_to_left\"").unwrap();
        assert_eq!(effect, ExitEffect::BounceToLeft);
    }

    #[test]
    fn test_edges() {
        assert_eq!(EnterEffect::SlideFromLeft.slide_edge(), Some(Edge::Left));
        assert_eq!(EnterEffect::SlideFromLeft.bounce_edge(), None);
        assert_eq!(ExitEffect::BounceToTop.bounce_edge(), Some(Edge::Top));
        assert_eq!(ExitEffect::Fade.slide_edge(), None);
    }
}
