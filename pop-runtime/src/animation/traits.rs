//! # Traits 模块
//!
//! 基于 Trait 的动画系统核心接口定义。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 可动画对象的唯一标识符
//! - `AnimPropertyKey`: 对象 + 属性名组成的动画键
//! - `Animatable`: 可动画对象接口

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// 对象唯一标识符
///
/// 可动画对象在创建时分配，进程内不会重复。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// 分配新的对象 ID
    pub fn allocate() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// 属性键
///
/// 使用 `ObjectId + property_id` 组合作为唯一键：
/// - `object_id`: 对象实例
/// - `property_id`: 属性名称（编译期字符串字面量）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimPropertyKey {
    /// 对象实例 ID
    pub object_id: ObjectId,
    /// 属性名称
    pub property_id: &'static str,
}

impl AnimPropertyKey {
    /// 创建属性键
    pub fn new(object_id: ObjectId, property_id: &'static str) -> Self {
        Self {
            object_id,
            property_id,
        }
    }
}

impl std::fmt::Display for AnimPropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.object_id, self.property_id)
    }
}

/// 可动画对象接口
///
/// 对象通过实现此 trait 声明自己有哪些属性可以被动画。
/// 对象内部使用 `RefCell` 等内部可变性保存属性值，因此 setter 只需 `&self`。
pub trait Animatable: 'static {
    /// 对象 ID
    fn object_id(&self) -> ObjectId;

    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在，返回当前值
    /// - `None`: 属性不存在
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在
    fn set_property(&self, property_id: &str, value: f32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_unique() {
        let a = ObjectId::allocate();
        let b = ObjectId::allocate();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn test_key_display() {
        let id = ObjectId(7);
        let key = AnimPropertyKey::new(id, "alpha");
        assert_eq!(key.to_string(), "ObjectId(7):alpha");
    }
}
