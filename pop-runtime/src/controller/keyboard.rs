//! 键盘避让的偏移计算。

use crate::geometry::Rect;
use crate::style::PopPosition;

/// 容器底部与键盘之间保留的间距
pub const KEYBOARD_SPACING: f32 = 5.0;

/// 偏移计算的输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardInput {
    pub position: PopPosition,
    /// 宿主高度
    pub host_height: f32,
    pub keyboard_height: f32,
    pub safe_area_bottom: f32,
    pub status_bar_height: f32,
    /// 未变换的容器 frame
    pub container: Rect,
    /// 获得焦点的输入框底边（根节点坐标系）
    pub input_bottom: f32,
}

/// 计算容器需要上移的距离
///
/// 返回值为正表示上移，应用为 `translation(0, -offset)`。
///
/// - 贴底：键盘高度减去底部安全区
/// - 其他位置：容器放得下时居中到状态栏与键盘之间；放不下时刚好让出键盘加间距，
///   但不高于状态栏，同时保证输入框底边仍在键盘之上
pub fn keyboard_offset(input: &KeyboardInput) -> f32 {
    if input.position == PopPosition::Bottom {
        return input.keyboard_height - input.safe_area_bottom;
    }

    let y = input.container.y();
    let height = input.container.height();
    let available = input.host_height - input.keyboard_height - input.status_bar_height;

    if height <= available {
        return y - (input.status_bar_height + (available - height) / 2.0);
    }

    let limit = input.host_height - input.keyboard_height - KEYBOARD_SPACING;
    let mut offset = input.container.max_y() - limit;
    if offset <= 0.0 {
        return 0.0;
    }

    if y - offset < input.status_bar_height {
        offset = y - input.status_bar_height;
        if input.input_bottom - offset > limit {
            offset = input.input_bottom - limit;
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(position: PopPosition, container: Rect) -> KeyboardInput {
        KeyboardInput {
            position,
            host_height: 800.0,
            keyboard_height: 300.0,
            safe_area_bottom: 34.0,
            status_bar_height: 44.0,
            container,
            input_bottom: container.y() + 40.0,
        }
    }

    #[test]
    fn test_bottom_offset() {
        let offset = keyboard_offset(&input(PopPosition::Bottom, Rect::new(0.0, 566.0, 375.0, 234.0)));
        assert_eq!(offset, 266.0);
    }

    #[test]
    fn test_centers_when_it_fits() {
        // 可用高度 800 - 300 - 44 = 456，容器 200 -> 目标 y = 44 + 128 = 172
        let offset = keyboard_offset(&input(PopPosition::Center, Rect::new(0.0, 300.0, 300.0, 200.0)));
        assert_eq!(offset, 128.0);
    }

    #[test]
    fn test_tall_container_stops_at_status_bar() {
        // 高 470 > 456；y = 100，maxY = 570，limit = 495，让出 75 会越过状态栏
        let offset = keyboard_offset(&input(PopPosition::Center, Rect::new(0.0, 100.0, 300.0, 470.0)));
        assert_eq!(offset, 56.0);
    }

    #[test]
    fn test_tall_container_already_clear() {
        let offset = keyboard_offset(&input(PopPosition::Top, Rect::new(0.0, 0.0, 300.0, 480.0)));
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn test_clamped_to_status_bar_then_input() {
        // 高 600，y = 100，maxY = 700 -> 偏移 205 会越过状态栏，夹到 56
        let mut keyboard = input(PopPosition::Center, Rect::new(0.0, 100.0, 300.0, 600.0));
        keyboard.input_bottom = 520.0;
        assert_eq!(keyboard_offset(&keyboard), 56.0);

        // 输入框底边 600 - 56 = 544 > 495，改为让出输入框
        keyboard.input_bottom = 600.0;
        assert_eq!(keyboard_offset(&keyboard), 105.0);
    }
}
