//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! [`Timing`] 在缓动曲线之外加入弹簧曲线，弹簧参数见 [`SpringConfig`]。

use crate::style::SpringConfig;

use super::spring;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    EaseIn,
    /// 缓出（先快后慢）
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    #[default]
    EaseInOut,
    /// 三次缓出（键盘动画曲线）
    EaseOutCubic,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => ease_in(t),
            EasingFunction::EaseOut => ease_out(t),
            EasingFunction::EaseInOut => ease_in_out(t),
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// 缓入（二次，与宿主默认的 ease-in 曲线接近）
fn ease_in(t: f32) -> f32 {
    t * t
}

/// 缓出（二次）
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// 缓入缓出（三次）
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// 动画时间曲线
///
/// 普通曲线与弹簧曲线共用同一套时长推进，只是进度映射不同。
/// 弹簧曲线允许进度越过 1.0（回弹），结束时仍精确落在目标值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// 缓动曲线
    Curve(EasingFunction),
    /// 弹簧曲线
    Spring(SpringConfig),
}

impl Default for Timing {
    fn default() -> Self {
        Self::Curve(EasingFunction::default())
    }
}

impl From<EasingFunction> for Timing {
    fn from(easing: EasingFunction) -> Self {
        Self::Curve(easing)
    }
}

impl From<SpringConfig> for Timing {
    fn from(config: SpringConfig) -> Self {
        Self::Spring(config)
    }
}

impl Timing {
    /// 线性曲线
    pub const LINEAR: Self = Self::Curve(EasingFunction::Linear);

    /// 计算 `t` 时刻的进度
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Timing::Curve(easing) => easing.apply(t),
            Timing::Spring(config) => spring::response(*config, t),
        }
    }
}
