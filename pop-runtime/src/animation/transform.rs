//! # Transform 模块
//!
//! 仿射变换的子集：平移 + 缩放。
//!
//! 变换独立于 frame 保存，修改 frame 不会影响变换，反之亦然。
//! 键盘避让使用平移，缩放类效果使用缩放。

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// 变换状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// 平移
    pub translation: Vec2,
    /// 缩放因子
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// 单位变换（无平移、无缩放）
    pub const fn identity() -> Self {
        Self {
            translation: Vec2::zero(),
            scale: Vec2::one(),
        }
    }

    /// 只有平移的变换
    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            translation: Vec2::new(x, y),
            scale: Vec2::one(),
        }
    }

    /// 均匀缩放的变换
    pub const fn uniform_scale(s: f32) -> Self {
        Self {
            translation: Vec2::zero(),
            scale: Vec2::new(s, s),
        }
    }

    /// 是否为单位变换
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.translation, Vec2::zero());
        assert_eq!(t.scale, Vec2::one());
        assert!(t.is_identity());
    }

    #[test]
    fn test_uniform_scale_keeps_origin() {
        let t = Transform::uniform_scale(0.85);
        assert_eq!(t.translation, Vec2::zero());
        assert_eq!(t.scale, Vec2::new(0.85, 0.85));
    }

    #[test]
    fn test_translation_is_not_identity() {
        assert!(!Transform::translation(0.0, -10.0).is_identity());
    }
}
