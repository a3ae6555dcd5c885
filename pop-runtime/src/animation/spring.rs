//! # Spring 模块
//!
//! 阻尼弹簧响应曲线。
//!
//! 把弹簧从位移 -1 释放到平衡点 0 的过程归一化到动画时长内：
//! 进度 = 1 + 位移。阻尼比越小回弹越明显；固有频率按阻尼比选取，
//! 保证在时长结束时振幅衰减到千分之一以内。

use crate::style::SpringConfig;

/// ln(1000)：时长结束时振幅衰减到 1/1000
const SETTLE_DECAY: f32 = 6.907_755;

/// 固有频率下限（归一化时间单位）
const MIN_NATURAL_FREQUENCY: f32 = 10.0;

/// 计算归一化时间 `t` 处的弹簧进度
///
/// `config.velocity` 为初始速度，单位是“总位移 / 归一化时长”。
pub fn response(config: SpringConfig, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let zeta = config.damping.clamp(0.01, 1.0);
    let omega = (SETTLE_DECAY / zeta).max(MIN_NATURAL_FREQUENCY);
    let velocity = config.velocity;

    let displacement = if zeta < 1.0 {
        // 欠阻尼：e^{-ζωt}(-cos ω_d t + B sin ω_d t)
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let b = (velocity - zeta * omega) / omega_d;
        (-zeta * omega * t).exp() * (-(omega_d * t).cos() + b * (omega_d * t).sin())
    } else {
        // 临界阻尼：(-1 + B t) e^{-ωt}
        let b = velocity - omega;
        (-1.0 + b * t) * (-omega * t).exp()
    };

    1.0 + displacement
}
