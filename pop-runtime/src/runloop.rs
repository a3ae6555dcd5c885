//! # RunLoop 模块
//!
//! 单线程的主调度队列：延迟任务 + 属性动画 + 完成回调。
//!
//! 所有回调都在 `tick` 中、内部借用释放之后执行，因此回调里可以继续
//! `post` 或 `animate`，不会出现 `RefCell` 重入借用。
//!
//! ```text
//! tick(dt)
//!   ├─ 1. 执行上一轮 post 的任务
//!   ├─ 2. AnimationSystem::update(dt)
//!   └─ 3. 对结束的动画组调用 completion(finished)
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::{trace, warn};

use crate::animation::{AnimationEvent, AnimationSystem, Animatable, GroupId, ObjectId, Timing};

/// 完成回调：参数为“是否正常结束”
pub type Completion = Box<dyn FnOnce(bool)>;

type Task = Box<dyn FnOnce()>;

/// `run_until_idle` 的最大 tick 次数
const MAX_IDLE_TICKS: usize = 100_000;

/// 一次 `animate` 调用中收集的属性目标值
///
/// 同一对象的同一属性多次设置时，以最后一次为准。
#[derive(Default)]
pub struct Changes {
    entries: Vec<(Rc<dyn Animatable>, &'static str, f32)>,
}

impl Changes {
    /// 设置属性目标值
    pub fn set(&mut self, object: &Rc<dyn Animatable>, property_id: &'static str, value: f32) -> &mut Self {
        let object_id = object.object_id();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(obj, prop, _)| obj.object_id() == object_id && *prop == property_id)
        {
            entry.2 = value;
        } else {
            self.entries.push((object.clone(), property_id, value));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct QueueState {
    now: f64,
    tasks: VecDeque<Task>,
    system: AnimationSystem,
    completions: BTreeMap<GroupId, Completion>,
}

/// 主调度队列
///
/// 廉价克隆的句柄，所有克隆共享同一个队列。
#[derive(Clone)]
pub struct MainQueue {
    inner: Rc<RefCell<QueueState>>,
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("MainQueue")
            .field("now", &state.now)
            .field("tasks", &state.tasks.len())
            .field("system", &state.system)
            .finish()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueState {
                now: 0.0,
                tasks: VecDeque::new(),
                system: AnimationSystem::new(),
                completions: BTreeMap::new(),
            })),
        }
    }

    /// 当前时间（秒），由 `tick` 累加
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// 把任务推迟到下一次 `tick` 执行
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().tasks.push_back(Box::new(task));
    }

    /// 在一个动画组里把 `changes` 收集到的属性动画到目标值
    ///
    /// 起始值取各属性的当前值。`completion` 在组内所有动画结束后调用一次，
    /// 任一动画被跳过或被替换时参数为 `false`。没有任何属性变化时，
    /// `completion(true)` 在下一次 `tick` 调用。
    pub fn animate(
        &self,
        duration: f32,
        timing: impl Into<Timing>,
        changes: impl FnOnce(&mut Changes),
        completion: impl FnOnce(bool) + 'static,
    ) -> GroupId {
        let timing = timing.into();
        // 收集阶段不持有借用，闭包可以读取任意属性
        let mut collected = Changes::default();
        changes(&mut collected);

        let mut state = self.inner.borrow_mut();
        let group = state.system.begin_group();
        for (object, property_id, value) in &collected.entries {
            if let Err(err) =
                state
                    .system
                    .animate(object, property_id, *value, duration, timing, Some(group))
            {
                warn!(error = %err, "无法启动属性动画");
            }
        }
        state.system.seal_group(group);
        state.completions.insert(group, Box::new(completion));
        trace!(?group, count = collected.len(), duration, "animate");
        group
    }

    /// 跳过对象上的所有动画
    ///
    /// 属性立即落到目标值，相关完成回调在下一次 `tick` 以 `false` 调用。
    pub fn cancel_object(&self, object_id: ObjectId) {
        self.inner.borrow_mut().system.skip_object_animations(object_id);
    }

    /// 对象是否有正在进行的动画
    pub fn is_animating(&self, object_id: ObjectId) -> bool {
        self.inner.borrow().system.has_object_animations(object_id)
    }

    /// 队列是否空闲（没有任务、动画和待调用的回调）
    pub fn is_idle(&self) -> bool {
        let state = self.inner.borrow();
        state.tasks.is_empty() && state.system.is_idle() && state.completions.is_empty()
    }

    /// 推进一帧
    pub fn tick(&self, dt: f32) {
        // 1. 本轮开始前 post 的任务；任务中新 post 的留到下一轮
        let tasks: Vec<Task> = {
            let mut state = self.inner.borrow_mut();
            state.now += f64::from(dt);
            state.tasks.drain(..).collect()
        };
        for task in tasks {
            task();
        }

        // 2. 动画
        let events = self.inner.borrow_mut().system.update(dt);

        // 3. 完成回调
        let finished: Vec<(Completion, bool)> = {
            let mut state = self.inner.borrow_mut();
            events
                .into_iter()
                .filter_map(|AnimationEvent::GroupFinished { group, finished }| {
                    state
                        .completions
                        .remove(&group)
                        .map(|completion| (completion, finished))
                })
                .collect()
        };
        for (completion, finished) in finished {
            completion(finished);
        }
    }

    /// 以固定步长推进，直到队列空闲
    ///
    /// 返回推进的帧数。
    pub fn run_until_idle(&self, step: f32) -> usize {
        let mut ticks = 0;
        while !self.is_idle() && ticks < MAX_IDLE_TICKS {
            self.tick(step);
            ticks += 1;
        }
        if ticks == MAX_IDLE_TICKS {
            warn!(ticks, "run_until_idle 达到上限，队列仍未空闲");
        }
        ticks
    }

    /// 推进指定时长
    pub fn advance(&self, seconds: f32, step: f32) {
        let step = step.max(f32::EPSILON);
        let mut elapsed = 0.0;
        while elapsed < seconds {
            let dt = step.min(seconds - elapsed);
            self.tick(dt);
            elapsed += dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ObjectId;
    use std::cell::Cell;

    struct Knob {
        id: ObjectId,
        value: Cell<f32>,
    }

    impl Animatable for Knob {
        fn object_id(&self) -> ObjectId {
            self.id
        }

        fn get_property(&self, property_id: &str) -> Option<f32> {
            (property_id == "value").then(|| self.value.get())
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            if property_id == "value" {
                self.value.set(value);
                true
            } else {
                false
            }
        }
    }

    fn knob() -> (Rc<Knob>, Rc<dyn Animatable>) {
        let knob = Rc::new(Knob {
            id: ObjectId::allocate(),
            value: Cell::new(0.0),
        });
        let object: Rc<dyn Animatable> = knob.clone();
        (knob, object)
    }

    #[test]
    fn test_post_runs_on_next_tick() {
        let queue = MainQueue::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        queue.post(move || flag.set(true));
        assert!(!ran.get());
        queue.tick(0.0);
        assert!(ran.get());
    }

    #[test]
    fn test_nested_post_is_deferred() {
        let queue = MainQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let q = queue.clone();
        let l = log.clone();
        queue.post(move || {
            l.borrow_mut().push("outer");
            let l2 = l.clone();
            q.post(move || l2.borrow_mut().push("inner"));
        });
        queue.tick(0.0);
        assert_eq!(*log.borrow(), vec!["outer"]);
        queue.tick(0.0);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_animate_completion_fires_once() {
        let queue = MainQueue::new();
        let (knob, object) = knob();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();

        queue.animate(
            0.2,
            Timing::LINEAR,
            |changes| {
                changes.set(&object, "value", 10.0);
            },
            move |finished| c.borrow_mut().push(finished),
        );

        queue.tick(0.1);
        assert!((knob.value.get() - 5.0).abs() < 1e-4);
        assert!(calls.borrow().is_empty());

        queue.run_until_idle(0.05);
        assert_eq!(knob.value.get(), 10.0);
        assert_eq!(*calls.borrow(), vec![true]);
    }

    #[test]
    fn test_empty_animate_completes_async() {
        let queue = MainQueue::new();
        let done = Rc::new(Cell::new(None));
        let d = done.clone();
        queue.animate(0.3, Timing::default(), |_| {}, move |f| d.set(Some(f)));
        assert_eq!(done.get(), None);
        queue.tick(0.0);
        assert_eq!(done.get(), Some(true));
    }

    #[test]
    fn test_cancel_object_reports_unfinished() {
        let queue = MainQueue::new();
        let (knob, object) = knob();
        let done = Rc::new(Cell::new(None));
        let d = done.clone();

        queue.animate(
            1.0,
            Timing::LINEAR,
            |changes| {
                changes.set(&object, "value", 4.0);
            },
            move |f| d.set(Some(f)),
        );
        queue.tick(0.1);
        assert!(queue.is_animating(knob.id));
        queue.cancel_object(knob.id);
        assert!(!queue.is_animating(knob.id));
        assert_eq!(knob.value.get(), 4.0);

        queue.tick(0.0);
        assert_eq!(done.get(), Some(false));
    }

    #[test]
    fn test_changes_last_write_wins() {
        let (_knob, object) = knob();
        let mut changes = Changes::default();
        changes.set(&object, "value", 1.0).set(&object, "value", 2.0);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.entries[0].2, 2.0);
    }

    #[test]
    fn test_completion_may_start_new_animation() {
        let queue = MainQueue::new();
        let (knob, object) = knob();
        let q = queue.clone();
        let obj = object.clone();

        queue.animate(
            0.1,
            Timing::LINEAR,
            |changes| {
                changes.set(&object, "value", 1.0);
            },
            move |_| {
                q.animate(
                    0.1,
                    Timing::LINEAR,
                    |changes| {
                        changes.set(&obj, "value", 3.0);
                    },
                    |_| {},
                );
            },
        );

        queue.run_until_idle(0.05);
        assert_eq!(knob.value.get(), 3.0);
        assert!(queue.now() > 0.15);
    }
}
