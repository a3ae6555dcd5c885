//! 容器布局计算。
//!
//! 纯函数，不接触节点，方便单独测试。

use crate::geometry::{EdgeInsets, Point, Rect, Size};
use crate::style::PopPosition;

/// 布局输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    /// 宿主区域尺寸（弹窗根节点的 bounds）
    pub host: Size,
    /// 已解析的内容尺寸
    pub content: Size,
    pub position: PopPosition,
    pub offset: Point,
    pub safe_area: EdgeInsets,
}

/// 布局结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopLayout {
    /// 容器 frame（根节点坐标系）
    pub container: Rect,
    /// 内容 frame（容器坐标系）
    pub content: Rect,
}

/// 计算容器与内容的 frame
///
/// - `Top`：y = 0
/// - `Bottom`：高度加上底部安全区，y = 宿主高度 − 容器高度
/// - `Center`：垂直居中
///
/// 之后 y 加上 `offset.y`；x 水平居中后加上 `offset.x`。
pub fn compute_layout(input: &LayoutInput) -> PopLayout {
    let width = input.content.width;
    let mut height = input.content.height;

    let mut y = match input.position {
        PopPosition::Bottom => {
            height += input.safe_area.bottom;
            input.host.height - height
        }
        PopPosition::Top => 0.0,
        PopPosition::Center => (input.host.height - height) / 2.0,
    };
    y += input.offset.y;
    let x = (input.host.width - width) / 2.0 + input.offset.x;

    PopLayout {
        container: Rect::new(x, y, width, height),
        content: Rect::from_size(input.content),
    }
}
