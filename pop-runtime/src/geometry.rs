//! # Geometry 模块
//!
//! 弹窗布局用到的基础几何类型：点、尺寸、矩形、安全区边距与屏幕方向。
//!
//! 坐标系与宿主一致：原点在左上角，y 轴向下。

use serde::{Deserialize, Serialize};

/// 二维点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// 原点
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的点
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// 零尺寸
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// 创建新的尺寸
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 宽高是否都为零
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// 矩形（原点 + 尺寸）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// 空矩形
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// 由坐标与宽高创建矩形
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// 以原点为起点的矩形
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// 同尺寸、原点归零的矩形
    pub fn bounds(&self) -> Self {
        Self::from_size(self.size)
    }

    /// 替换原点
    pub fn with_origin(self, x: f32, y: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: self.size,
        }
    }

    /// 替换 x
    pub fn with_x(self, x: f32) -> Self {
        self.with_origin(x, self.origin.y)
    }

    /// 替换 y
    pub fn with_y(self, y: f32) -> Self {
        self.with_origin(self.origin.x, y)
    }

    /// 平移
    pub fn offset_by(self, dx: f32, dy: f32) -> Self {
        self.with_origin(self.origin.x + dx, self.origin.y + dy)
    }

    /// 点是否落在矩形内（含左上边，不含右下边）
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x < self.max_x()
            && point.y >= self.origin.y
            && point.y < self.max_y()
    }
}

/// 安全区边距
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeInsets {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub right: f32,
}

impl EdgeInsets {
    /// 无边距
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// 界面方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Landscape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.max_x(), 110.0);
        assert_eq!(rect.max_y(), 70.0);
        assert_eq!(rect.bounds(), Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_size_zero() {
        assert!(Size::ZERO.is_zero());
        assert!(!Size::new(0.0, 10.0).is_zero());
    }

    #[test]
    fn test_insets_deserialize_partial() {
        let insets: EdgeInsets = serde_json::from_str(r#"{"bottom": 34}"#).unwrap();
        assert_eq!(insets, EdgeInsets::new(0.0, 0.0, 34.0, 0.0));
    }
}
