//! # Animation 模块
//!
//! 单个属性动画：一条 f32 的时间轴。
//!
//! 进度先按线性时间计算，再交给 [`Timing`] 变形；弹簧曲线的进度可以越过 1.0，
//! 因此取值不做夹取。结束（完成或跳过）之后取值固定为目标值，
//! 保证视图最终停在精确的静止位置上。

use super::Timing;

/// 动画 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

impl AnimationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// 动画组 ID
///
/// 一次 `animate` 调用中启动的属性动画共享同一个组。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// 尚未推进过
    #[default]
    Pending,
    Playing,
    Completed,
    /// 被取消，或被同一属性上的新动画替换
    Skipped,
}

impl AnimationState {
    /// 还需要逐帧推进
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Playing)
    }

    pub fn is_finished(&self) -> bool {
        !self.is_active()
    }
}

/// 属性动画
#[derive(Debug, Clone)]
pub struct Animation {
    pub id: AnimationId,
    pub from: f32,
    pub to: f32,
    /// 时长（秒），不小于 0
    pub duration: f32,
    pub timing: Timing,
    pub state: AnimationState,
    /// 经过时间曲线变形后的进度
    pub progress: f32,
    /// 所属动画组，结束时向组汇报
    pub group: Option<GroupId>,
    elapsed: f32,
}

impl Animation {
    /// 时长不大于 0 的动画创建即完成，由系统在下一帧写入目标值。
    pub fn new(id: AnimationId, from: f32, to: f32, duration: f32) -> Self {
        let instant = duration <= 0.0;
        Self {
            id,
            from,
            to,
            duration: duration.max(0.0),
            timing: Timing::default(),
            state: if instant {
                AnimationState::Completed
            } else {
                AnimationState::Pending
            },
            progress: if instant { 1.0 } else { 0.0 },
            group: None,
            elapsed: 0.0,
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_group(mut self, group: Option<GroupId>) -> Self {
        self.group = group;
        self
    }

    /// 推进 `dt` 秒，返回推进之后是否仍在播放
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.elapsed += dt;

        let linear = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        if linear >= 1.0 {
            self.progress = 1.0;
            self.state = AnimationState::Completed;
            return false;
        }

        self.progress = self.timing.apply(linear);
        self.state = AnimationState::Playing;
        true
    }

    /// 打断：进度直接到终点，状态记为跳过
    pub fn skip(&mut self) {
        if self.state.is_active() {
            self.progress = 1.0;
            self.state = AnimationState::Skipped;
        }
    }

    pub fn current_value(&self) -> f32 {
        match self.state {
            AnimationState::Completed | AnimationState::Skipped => self.to,
            AnimationState::Pending | AnimationState::Playing => {
                self.from + (self.to - self.from) * self.progress
            }
        }
    }

    pub fn final_value(&self) -> f32 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::EasingFunction;
    use crate::style::SpringConfig;

    /// 背景遮罩从 0 淡入到 0.5
    fn backdrop_fade(duration: f32) -> Animation {
        Animation::new(AnimationId::new(1), 0.0, 0.5, duration).with_timing(Timing::LINEAR)
    }

    #[test]
    fn test_fade_reaches_target_exactly() {
        let mut fade = backdrop_fade(0.3);
        assert_eq!(fade.state, AnimationState::Pending);

        assert!(fade.update(0.15));
        assert_eq!(fade.state, AnimationState::Playing);
        assert!((fade.current_value() - 0.25).abs() < 1e-5);

        assert!(!fade.update(0.2));
        assert_eq!(fade.state, AnimationState::Completed);
        assert_eq!(fade.current_value(), 0.5);
        // 结束后再推进不改变任何东西
        assert!(!fade.update(1.0));
        assert_eq!(fade.current_value(), 0.5);
    }

    #[test]
    fn test_skip_lands_on_target() {
        let mut fade = backdrop_fade(0.3);
        fade.update(0.05);
        fade.skip();
        assert_eq!(fade.state, AnimationState::Skipped);
        assert!(fade.is_finished());
        assert_eq!(fade.current_value(), 0.5);
    }

    #[test]
    fn test_zero_duration_is_complete_on_creation() {
        let fade = backdrop_fade(0.0);
        assert!(fade.is_finished());
        assert_eq!(fade.progress, 1.0);
        assert_eq!(fade.current_value(), 0.5);
    }

    #[test]
    fn test_ease_in_lags_behind_linear() {
        let mut slide = Animation::new(AnimationId::new(2), 812.0, 478.0, 1.0)
            .with_timing(Timing::Curve(EasingFunction::EaseIn));
        slide.update(0.5);
        // 812 → 478 的中点是 645，ease-in 此时还没走到一半
        assert!(slide.current_value() > 645.0);
    }

    #[test]
    fn test_underdamped_spring_overshoots() {
        let spring = SpringConfig::new(0.3, 0.0);
        let mut grow = Animation::new(AnimationId::new(3), 0.1, 1.0, 1.0)
            .with_timing(Timing::Spring(spring));
        let peak = (0..70)
            .map(|_| {
                grow.update(1.0 / 60.0);
                grow.current_value()
            })
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "peak = {peak}");
        assert_eq!(grow.current_value(), 1.0);
    }
}
