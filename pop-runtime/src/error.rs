//! # Error 模块
//!
//! 定义 pop-runtime 中使用的错误类型。
//!
//! 错误按来源分为三类：
//! - [`LayoutError`]：配置错误（内容尺寸为零），属于调用方必须修复的问题
//! - [`SignalError`]：环境通知的载荷格式错误，收到后忽略该事件即可
//! - [`ConfigError`]：配置文件读取 / 解析 / 校验失败

use thiserror::Error;

/// 布局错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// 竖屏与横屏的内容尺寸都为零
    #[error("内容尺寸为零：弹窗内容必须在首次布局前设置 preferred content size")]
    ZeroContentSize,
}

/// 环境通知载荷错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// 缺少必需字段
    #[error("通知载荷缺少字段 '{key}'")]
    MissingKey { key: &'static str },

    /// 字段值类型或内容无效
    #[error("通知载荷字段 '{key}' 的值无效 - {message}")]
    InvalidValue { key: &'static str, message: String },

    /// 无法识别的动画曲线编号
    #[error("未知的动画曲线编号 {raw}")]
    UnknownCurve { raw: i64 },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取文件失败
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置项取值越界
    #[error("配置项 '{field}' 无效 - {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    /// 创建取值越界错误
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// pop-runtime 统一错误类型
#[derive(Error, Debug)]
pub enum PopError {
    /// 布局错误
    #[error("布局错误: {0}")]
    Layout(#[from] LayoutError),

    /// 环境通知错误
    #[error("环境通知错误: {0}")]
    Signal(#[from] SignalError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type PopResult<T> = Result<T, PopError>;
