//! # System 模块
//!
//! 通用动画系统管理器。
//!
//! 对象实现 `Animatable` trait，系统直接设置属性值：
//! ```rust,ignore
//! let group = system.begin_group();
//! system.animate(&object, "alpha", 1.0, 0.3, Timing::default(), Some(group))?;
//! system.seal_group(group);
//! // 值自动应用到对象，组结束时产生 GroupFinished 事件
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use super::traits::{AnimPropertyKey, Animatable, ObjectId};
use super::{Animation, AnimationEvent, AnimationId, AnimationState, GroupId, Timing};

/// 动画组状态
#[derive(Debug, Default)]
struct GroupState {
    /// 组内尚未结束的动画数量
    remaining: usize,
    /// 组内是否有动画被打断
    interrupted: bool,
    /// 是否已封口（封口后才可能结束）
    sealed: bool,
}

/// 动画系统
///
/// 管理所有动画实例，提供统一的更新和查询接口。
///
/// ## 设计理念
///
/// 动画系统只负责：
/// 1. 管理时间轴：知道某个属性从 A 到 B 需要在 duration 内变化
/// 2. 直接设置对象属性（通过 Animatable trait）
/// 3. 以组为单位汇报结束，每组恰好一次
///
/// 内部使用有序容器，同一帧内多个组结束时事件顺序稳定。
pub struct AnimationSystem {
    /// 已注册的对象
    objects: BTreeMap<ObjectId, Rc<dyn Animatable>>,
    /// 动画（AnimPropertyKey -> Animation）
    animations: BTreeMap<AnimPropertyKey, Animation>,
    /// 未结束的动画组
    groups: BTreeMap<GroupId, GroupState>,
    /// 下一个动画 ID
    next_anim_id: u64,
    /// 下一个动画组 ID
    next_group_id: u64,
    /// 待处理的事件队列
    events: Vec<AnimationEvent>,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSystem")
            .field("objects", &self.objects.len())
            .field("animations", &self.animations.len())
            .field("groups", &self.groups.len())
            .finish()
    }
}

impl AnimationSystem {
    /// 创建新的动画系统
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            animations: BTreeMap::new(),
            groups: BTreeMap::new(),
            next_anim_id: 1,
            next_group_id: 1,
            events: Vec::new(),
        }
    }

    /// 生成下一个动画 ID
    fn next_animation_id(&mut self) -> AnimationId {
        let id = AnimationId::new(self.next_anim_id);
        self.next_anim_id += 1;
        id
    }

    // ========== 对象管理 ==========

    /// 注册可动画对象
    ///
    /// 重复注册同一对象是安全的，返回对象自身的 ID。
    /// 对象的最后一个动画结束后，系统不再持有它。
    pub fn register(&mut self, object: Rc<dyn Animatable>) -> ObjectId {
        let id = object.object_id();
        self.objects.entry(id).or_insert(object);
        id
    }

    // ========== 动画组 ==========

    /// 开启新的动画组
    pub fn begin_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(id, GroupState::default());
        id
    }

    /// 封口动画组
    ///
    /// 组内没有任何动画时，结束事件在下一次 `update` 中送出。
    pub fn seal_group(&mut self, group: GroupId) {
        let finished = match self.groups.get_mut(&group) {
            Some(state) => {
                state.sealed = true;
                state.remaining == 0
            }
            None => false,
        };
        if finished {
            self.finish_group(group);
        }
    }

    /// 检查动画组是否仍未结束
    pub fn is_group_pending(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }

    // ========== 动画控制 ==========

    /// 启动对象属性动画
    ///
    /// 起始值取属性的当前值。同一属性已有动画时，旧动画被替换并视为被打断。
    ///
    /// # 返回
    /// - `Ok(AnimationId)`: 动画启动成功
    /// - `Err(String)`: 属性不存在
    pub fn animate(
        &mut self,
        object: &Rc<dyn Animatable>,
        property_id: &'static str,
        to: f32,
        duration: f32,
        timing: Timing,
        group: Option<GroupId>,
    ) -> Result<AnimationId, String> {
        let object_id = self.register(object.clone());

        // 验证属性存在
        let from = object.get_property(property_id).ok_or_else(|| {
            format!("Property '{}' not found on object {}", property_id, object_id)
        })?;

        let key = AnimPropertyKey::new(object_id, property_id);

        // 替换同一属性的现有动画
        if let Some(previous) = self.animations.remove(&key) {
            self.retire(&previous, true);
        }

        let anim_id = self.next_animation_id();
        let animation = Animation::new(anim_id, from, to, duration)
            .with_timing(timing)
            .with_group(group);

        if let Some(group) = group
            && let Some(state) = self.groups.get_mut(&group)
        {
            state.remaining += 1;
        }

        self.animations.insert(key, animation);

        Ok(anim_id)
    }

    /// 更新所有动画
    ///
    /// # 返回
    /// 返回产生的事件列表
    pub fn update(&mut self, dt: f32) -> Vec<AnimationEvent> {
        let mut finished: Vec<AnimPropertyKey> = Vec::new();

        for (key, animation) in &mut self.animations {
            if animation.is_active() {
                animation.update(dt);
                if let Some(object) = self.objects.get(&key.object_id) {
                    object.set_property(key.property_id, animation.current_value());
                }
            } else if animation.state == AnimationState::Completed {
                // 零时长动画：直接落到目标值
                if let Some(object) = self.objects.get(&key.object_id) {
                    object.set_property(key.property_id, animation.final_value());
                }
            }

            if animation.is_finished() {
                finished.push(key.clone());
            }
        }

        for key in finished {
            if let Some(animation) = self.animations.remove(&key) {
                let interrupted = animation.state == AnimationState::Skipped;
                self.retire(&animation, interrupted);
            }
        }

        let animations = &self.animations;
        self.objects
            .retain(|id, _| animations.keys().any(|key| key.object_id == *id));

        std::mem::take(&mut self.events)
    }

    /// 跳过对象的所有动画
    ///
    /// 属性立即落到目标值，相关动画组以“未完成”结束。
    pub fn skip_object_animations(&mut self, object_id: ObjectId) {
        for (key, animation) in self.animations.iter_mut() {
            if key.object_id == object_id && animation.is_active() {
                animation.skip();
                if let Some(object) = self.objects.get(&object_id) {
                    object.set_property(key.property_id, animation.final_value());
                }
            }
        }
    }

    // ========== 查询方法 ==========

    /// 检查对象是否有活跃的动画
    pub fn has_object_animations(&self, object_id: ObjectId) -> bool {
        self.animations
            .iter()
            .any(|(key, anim)| key.object_id == object_id && anim.is_active())
    }

    /// 检查是否还有未送出的工作（动画、未结束的组或事件）
    pub fn is_idle(&self) -> bool {
        self.animations.is_empty() && self.groups.is_empty() && self.events.is_empty()
    }

    // ========== 内部方法 ==========

    /// 动画结束后的记账：更新所属组
    fn retire(&mut self, animation: &Animation, interrupted: bool) {
        let Some(group) = animation.group else {
            return;
        };
        let done = match self.groups.get_mut(&group) {
            Some(state) => {
                state.remaining = state.remaining.saturating_sub(1);
                state.interrupted |= interrupted;
                state.sealed && state.remaining == 0
            }
            None => false,
        };
        if done {
            self.finish_group(group);
        }
    }

    fn finish_group(&mut self, group: GroupId) {
        if let Some(state) = self.groups.remove(&group) {
            self.events.push(AnimationEvent::GroupFinished {
                group,
                finished: !state.interrupted,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 测试用的可动画对象
    struct TestAnimatable {
        id: ObjectId,
        alpha: RefCell<f32>,
        scale: RefCell<f32>,
    }

    impl TestAnimatable {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: ObjectId::allocate(),
                alpha: RefCell::new(1.0),
                scale: RefCell::new(1.0),
            })
        }

        fn alpha(&self) -> f32 {
            *self.alpha.borrow()
        }

        fn scale(&self) -> f32 {
            *self.scale.borrow()
        }
    }

    impl Animatable for TestAnimatable {
        fn object_id(&self) -> ObjectId {
            self.id
        }

        fn get_property(&self, property_id: &str) -> Option<f32> {
            match property_id {
                "alpha" => Some(*self.alpha.borrow()),
                "scale" => Some(*self.scale.borrow()),
                _ => None,
            }
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            match property_id {
                "alpha" => {
                    *self.alpha.borrow_mut() = value;
                    true
                }
                "scale" => {
                    *self.scale.borrow_mut() = value;
                    true
                }
                _ => false,
            }
        }
    }

    fn dyn_obj(obj: &Rc<TestAnimatable>) -> Rc<dyn Animatable> {
        obj.clone()
    }

    fn group_events(events: &[AnimationEvent]) -> Vec<(GroupId, bool)> {
        events
            .iter()
            .map(|AnimationEvent::GroupFinished { group, finished }| (*group, *finished))
            .collect()
    }

    #[test]
    fn test_new_system_is_idle() {
        assert!(AnimationSystem::new().is_idle());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        let id1 = system.register(dyn_obj(&obj));
        let id2 = system.register(dyn_obj(&obj));
        assert_eq!(id1, id2);
        assert_eq!(Rc::strong_count(&obj), 2);
    }

    #[test]
    fn test_animate_from_current_value() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();
        *obj.alpha.borrow_mut() = 0.0;

        system
            .animate(&dyn_obj(&obj), "alpha", 1.0, 1.0, Timing::LINEAR, None)
            .unwrap();

        system.update(0.5);
        assert!((obj.alpha() - 0.5).abs() < 1e-5);

        system.update(0.6);
        assert_eq!(obj.alpha(), 1.0);
        assert!(system.is_idle());
    }

    #[test]
    fn test_animate_invalid_property() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        let result = system.animate(&dyn_obj(&obj), "unknown", 0.0, 1.0, Timing::LINEAR, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_group_finishes_once() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        let group = system.begin_group();
        system
            .animate(&dyn_obj(&obj), "alpha", 0.0, 1.0, Timing::LINEAR, Some(group))
            .unwrap();
        system
            .animate(&dyn_obj(&obj), "scale", 2.0, 0.5, Timing::LINEAR, Some(group))
            .unwrap();
        system.seal_group(group);

        // 短的动画结束，组尚未结束
        let events = system.update(0.6);
        assert!(group_events(&events).is_empty());
        assert_eq!(obj.scale(), 2.0);

        let events = system.update(0.6);
        assert_eq!(group_events(&events), vec![(group, true)]);

        let events = system.update(0.6);
        assert!(group_events(&events).is_empty());
        assert!(system.is_idle());
    }

    #[test]
    fn test_empty_group_finishes_on_next_update() {
        let mut system = AnimationSystem::new();
        let group = system.begin_group();
        system.seal_group(group);
        assert!(system.is_group_pending(group) || !system.is_idle());

        let events = system.update(0.0);
        assert_eq!(group_events(&events), vec![(group, true)]);
    }

    #[test]
    fn test_replacement_interrupts_previous_group() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        let first = system.begin_group();
        system
            .animate(&dyn_obj(&obj), "alpha", 0.0, 1.0, Timing::LINEAR, Some(first))
            .unwrap();
        system.seal_group(first);
        system.update(0.5);

        let second = system.begin_group();
        system
            .animate(&dyn_obj(&obj), "alpha", 1.0, 1.0, Timing::LINEAR, Some(second))
            .unwrap();
        system.seal_group(second);

        let events = system.update(0.1);
        assert_eq!(group_events(&events), vec![(first, false)]);

        let events = system.update(1.0);
        assert_eq!(group_events(&events), vec![(second, true)]);
        assert_eq!(obj.alpha(), 1.0);
    }

    #[test]
    fn test_skip_object_animations() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        let group = system.begin_group();
        system
            .animate(&dyn_obj(&obj), "alpha", 0.0, 1.0, Timing::LINEAR, Some(group))
            .unwrap();
        system.seal_group(group);
        system.update(0.1);

        system.skip_object_animations(obj.id);

        // 值应该立即变为最终值
        assert_eq!(obj.alpha(), 0.0);
        let events = system.update(0.0);
        assert_eq!(group_events(&events), vec![(group, false)]);
    }

    #[test]
    fn test_zero_duration_lands_on_target() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        system
            .animate(&dyn_obj(&obj), "scale", 3.0, 0.0, Timing::LINEAR, None)
            .unwrap();
        assert_eq!(obj.scale(), 1.0);

        system.update(0.0);
        assert_eq!(obj.scale(), 3.0);
    }

    #[test]
    fn test_object_released_after_last_animation() {
        let mut system = AnimationSystem::new();
        let obj = TestAnimatable::new();

        system
            .animate(&dyn_obj(&obj), "alpha", 0.0, 0.2, Timing::LINEAR, None)
            .unwrap();
        system
            .animate(&dyn_obj(&obj), "scale", 2.0, 0.4, Timing::LINEAR, None)
            .unwrap();
        assert!(system.has_object_animations(obj.id));
        assert_eq!(Rc::strong_count(&obj), 2);

        system.update(0.3);
        assert_eq!(Rc::strong_count(&obj), 2);

        system.update(0.2);
        assert!(!system.has_object_animations(obj.id));
        assert_eq!(Rc::strong_count(&obj), 1);
    }
}
