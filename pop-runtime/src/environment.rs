//! # Environment 模块
//!
//! 宿主环境通知：屏幕旋转与键盘事件。
//!
//! 通知载荷是松散类型的 JSON 对象，由消费方解析：
//!
//! | 键 | 类型 | 说明 |
//! |----|------|------|
//! | `animation_duration` | number | 宿主动画时长（秒） |
//! | `animation_curve` | integer | 宿主动画曲线编号 |
//! | `frame_end` | `{origin, size}` | 键盘结束位置 |
//!
//! 载荷格式错误时返回 [`SignalError`]，消费方忽略该事件。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::animation::EasingFunction;
use crate::error::SignalError;
use crate::geometry::Rect;

/// 通知载荷
pub type Payload = Map<String, Value>;

pub const KEY_DURATION: &str = "animation_duration";
pub const KEY_CURVE: &str = "animation_curve";
pub const KEY_FRAME_END: &str = "frame_end";

/// 通知名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationName {
    OrientationDidChange,
    KeyboardWillShow,
    KeyboardWillChangeFrame,
    KeyboardWillHide,
}

impl fmt::Display for NotificationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OrientationDidChange => "orientation_did_change",
            Self::KeyboardWillShow => "keyboard_will_show",
            Self::KeyboardWillChangeFrame => "keyboard_will_change_frame",
            Self::KeyboardWillHide => "keyboard_will_hide",
        };
        f.write_str(name)
    }
}

/// 宿主动画曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCurve {
    EaseInOut,
    EaseIn,
    EaseOut,
    Linear,
    /// 键盘专用曲线
    Keyboard,
}

impl AnimationCurve {
    /// 由宿主曲线编号解析，未知编号返回 `None`
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::EaseInOut),
            1 => Some(Self::EaseIn),
            2 => Some(Self::EaseOut),
            3 => Some(Self::Linear),
            7 => Some(Self::Keyboard),
            _ => None,
        }
    }

    pub fn raw(&self) -> i64 {
        match self {
            Self::EaseInOut => 0,
            Self::EaseIn => 1,
            Self::EaseOut => 2,
            Self::Linear => 3,
            Self::Keyboard => 7,
        }
    }

    pub fn easing(&self) -> EasingFunction {
        match self {
            Self::EaseInOut => EasingFunction::EaseInOut,
            Self::EaseIn => EasingFunction::EaseIn,
            Self::EaseOut => EasingFunction::EaseOut,
            Self::Linear => EasingFunction::Linear,
            Self::Keyboard => EasingFunction::EaseOutCubic,
        }
    }
}

/// 键盘动画参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardAnimation {
    pub duration: f32,
    pub curve: AnimationCurve,
}

impl KeyboardAnimation {
    /// 从载荷中读取时长与曲线
    pub fn from_payload(payload: &Payload) -> Result<Self, SignalError> {
        let duration = payload
            .get(KEY_DURATION)
            .ok_or(SignalError::MissingKey { key: KEY_DURATION })?
            .as_f64()
            .ok_or_else(|| SignalError::InvalidValue {
                key: KEY_DURATION,
                message: "应为数字".to_string(),
            })?;
        if duration < 0.0 {
            return Err(SignalError::InvalidValue {
                key: KEY_DURATION,
                message: format!("时长不能为负数: {}", duration),
            });
        }

        let raw = payload
            .get(KEY_CURVE)
            .ok_or(SignalError::MissingKey { key: KEY_CURVE })?
            .as_i64()
            .ok_or_else(|| SignalError::InvalidValue {
                key: KEY_CURVE,
                message: "应为整数".to_string(),
            })?;
        let curve = AnimationCurve::from_raw(raw).ok_or(SignalError::UnknownCurve { raw })?;

        Ok(Self {
            duration: duration as f32,
            curve,
        })
    }
}

/// 键盘通知信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardInfo {
    pub frame_end: Rect,
    pub animation: KeyboardAnimation,
}

impl KeyboardInfo {
    pub fn from_payload(payload: &Payload) -> Result<Self, SignalError> {
        let frame = payload
            .get(KEY_FRAME_END)
            .ok_or(SignalError::MissingKey { key: KEY_FRAME_END })?;
        let frame_end: Rect =
            serde_json::from_value(frame.clone()).map_err(|err| SignalError::InvalidValue {
                key: KEY_FRAME_END,
                message: err.to_string(),
            })?;
        Ok(Self {
            frame_end,
            animation: KeyboardAnimation::from_payload(payload)?,
        })
    }

    /// 键盘高度
    pub fn height(&self) -> f32 {
        self.frame_end.height()
    }

    /// 构造载荷，供模拟宿主使用
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert(KEY_DURATION.to_string(), Value::from(f64::from(self.animation.duration)));
        payload.insert(KEY_CURVE.to_string(), Value::from(self.animation.curve.raw()));
        payload.insert(
            KEY_FRAME_END.to_string(),
            serde_json::to_value(self.frame_end).unwrap_or(Value::Null),
        );
        payload
    }
}

/// 观察者令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

type Observer = Rc<dyn Fn(&Payload)>;

#[derive(Default)]
struct CenterState {
    observers: RefCell<Vec<(ObserverToken, NotificationName, Observer)>>,
    next_token: Cell<u64>,
}

/// 通知中心
///
/// 廉价克隆的句柄。投递是同步的，观察者按注册顺序调用。
#[derive(Clone, Default)]
pub struct NotificationCenter {
    state: Rc<CenterState>,
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("observers", &self.state.observers.borrow().len())
            .finish()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, name: NotificationName, observer: impl Fn(&Payload) + 'static) -> ObserverToken {
        let token = ObserverToken(self.state.next_token.get() + 1);
        self.state.next_token.set(token.0);
        self.state
            .observers
            .borrow_mut()
            .push((token, name, Rc::new(observer)));
        token
    }

    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        let mut observers = self.state.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(t, _, _)| *t != token);
        observers.len() != before
    }

    /// 投递通知
    pub fn post(&self, name: NotificationName, payload: &Payload) {
        let targets: Vec<Observer> = self
            .state
            .observers
            .borrow()
            .iter()
            .filter(|(_, n, _)| *n == name)
            .map(|(_, _, observer)| observer.clone())
            .collect();
        trace!(%name, observers = targets.len(), "post notification");
        for observer in targets {
            observer(payload);
        }
    }

    /// 观察指定通知的观察者数量
    pub fn observer_count(&self, name: NotificationName) -> usize {
        self.state
            .observers
            .borrow()
            .iter()
            .filter(|(_, n, _)| *n == name)
            .count()
    }

    pub fn total_observers(&self) -> usize {
        self.state.observers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_curve_from_raw() {
        assert_eq!(AnimationCurve::from_raw(0), Some(AnimationCurve::EaseInOut));
        assert_eq!(AnimationCurve::from_raw(7), Some(AnimationCurve::Keyboard));
        assert_eq!(AnimationCurve::from_raw(5), None);
        assert_eq!(AnimationCurve::Keyboard.easing(), EasingFunction::EaseOutCubic);
    }

    #[test]
    fn test_keyboard_info_from_payload() {
        let p = payload(json!({
            "animation_duration": 0.25,
            "animation_curve": 7,
            "frame_end": {"origin": {"x": 0.0, "y": 500.0}, "size": {"width": 400.0, "height": 300.0}},
        }));
        let info = KeyboardInfo::from_payload(&p).unwrap();
        assert_eq!(info.height(), 300.0);
        assert_eq!(info.animation.curve, AnimationCurve::Keyboard);
        assert_eq!(KeyboardInfo::from_payload(&info.to_payload()), Ok(info));
    }

    #[test]
    fn test_malformed_payloads() {
        let missing = payload(json!({"animation_curve": 0}));
        assert_eq!(
            KeyboardAnimation::from_payload(&missing),
            Err(SignalError::MissingKey { key: KEY_DURATION })
        );

        let bad_type = payload(json!({"animation_duration": "fast", "animation_curve": 0}));
        assert!(matches!(
            KeyboardAnimation::from_payload(&bad_type),
            Err(SignalError::InvalidValue { key: KEY_DURATION, .. })
        ));

        let unknown = payload(json!({"animation_duration": 0.2, "animation_curve": 42}));
        assert_eq!(
            KeyboardAnimation::from_payload(&unknown),
            Err(SignalError::UnknownCurve { raw: 42 })
        );

        let no_frame = payload(json!({"animation_duration": 0.2, "animation_curve": 0}));
        assert_eq!(
            KeyboardInfo::from_payload(&no_frame),
            Err(SignalError::MissingKey { key: KEY_FRAME_END })
        );
    }

    #[test]
    fn test_notification_center() {
        let center = NotificationCenter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let token = center.add_observer(NotificationName::KeyboardWillShow, move |_| {
            counter.set(counter.get() + 1)
        });

        center.post(NotificationName::KeyboardWillShow, &Payload::new());
        center.post(NotificationName::KeyboardWillHide, &Payload::new());
        assert_eq!(hits.get(), 1);
        assert_eq!(center.observer_count(NotificationName::KeyboardWillShow), 1);

        assert!(center.remove_observer(token));
        center.post(NotificationName::KeyboardWillShow, &Payload::new());
        assert_eq!(hits.get(), 1);
        assert_eq!(center.total_observers(), 0);
    }
}
