//! 标准化错误消息模块
//!
//! 本模块为存储层和应用层错误提供统一的标题与解决建议，供命令行输出使用。

use crate::error::{AppError, RemoteStage, StoreError, ValidationError};

/// 标准化错误消息
#[derive(Debug, Clone)]
pub struct ErrorMessage {
    /// 错误代码
    pub code: &'static str,
    /// 标题
    pub title: &'static str,
    /// 建议的解决方案
    pub suggestions: &'static [&'static str],
}

impl ErrorMessage {
    /// 获取建议列表
    pub fn suggestions(&self) -> &[&'static str] {
        self.suggestions
    }
}

pub static MISSING_INPUT: ErrorMessage = ErrorMessage {
    code: "E001",
    title: "缺少输入",
    suggestions: &["键和值在去除首尾空白后都不能为空"],
};

pub static KEY_ALREADY_EXISTS: ErrorMessage = ErrorMessage {
    code: "E002",
    title: "环境变量已存在",
    suggestions: &["先删除已有的环境变量再重新添加", "或者使用不同的键名"],
};

pub static UNKNOWN_KEY: ErrorMessage = ErrorMessage {
    code: "E003",
    title: "环境变量不存在",
    suggestions: &["使用 `appenv list` 查看当前的环境变量"],
};

pub static KEY_OR_VALUE_INVALID: ErrorMessage = ErrorMessage {
    code: "E004",
    title: "键或值无效",
    suggestions: &["检查键名是否符合平台的命名规则", "检查值的长度与内容"],
};

pub static REMOTE_FAILURE: ErrorMessage = ErrorMessage {
    code: "E010",
    title: "远端服务调用失败",
    suggestions: &["检查网络连接与 API Token", "稍后重试"],
};

pub static REFRESH_FAILURE: ErrorMessage = ErrorMessage {
    code: "E011",
    title: "刷新环境变量失败，本地显示可能已过期",
    suggestions: &["稍后使用 `appenv list` 重新加载"],
};

pub static PARTIAL_REMOVAL: ErrorMessage = ErrorMessage {
    code: "E012",
    title: "部分环境变量已删除",
    suggestions: &["使用 `appenv list` 确认剩余的环境变量", "对剩余的键重新执行删除"],
};

pub static STORE_BUSY: ErrorMessage = ErrorMessage {
    code: "E020",
    title: "另一个操作正在进行",
    suggestions: &["等待当前操作完成后重试"],
};

pub static NO_TARGET: ErrorMessage = ErrorMessage {
    code: "E021",
    title: "未指定目标应用",
    suggestions: &["使用 --app 指定应用", "或在配置文件中设置 default_app"],
};

pub static CONFIG_INVALID: ErrorMessage = ErrorMessage {
    code: "E030",
    title: "配置无效",
    suggestions: &["检查 ~/.appenv/config.toml", "或设置 APPENV_API_TOKEN 环境变量"],
};

/// 查找错误对应的标准化消息
pub fn describe(error: &AppError) -> Option<&'static ErrorMessage> {
    match error {
        AppError::Store(store_error) => describe_store_error(store_error),
        AppError::Config { .. } | AppError::Validation { .. } => Some(&CONFIG_INVALID),
        AppError::Network { .. } => Some(&REMOTE_FAILURE),
        _ => None,
    }
}

/// 查找存储层错误对应的标准化消息
pub fn describe_store_error(error: &StoreError) -> Option<&'static ErrorMessage> {
    let message = match error {
        StoreError::Validation(ValidationError::EmptyField { .. }) => &MISSING_INPUT,
        StoreError::Validation(ValidationError::DuplicateKey { .. }) => &KEY_ALREADY_EXISTS,
        StoreError::Validation(ValidationError::UnknownKey { .. }) => &UNKNOWN_KEY,
        StoreError::Validation(ValidationError::RemoteRejected { .. }) => &KEY_OR_VALUE_INVALID,
        StoreError::Remote(remote) if remote.stage == RemoteStage::Refresh => &REFRESH_FAILURE,
        StoreError::Remote(remote) if remote.is_partial() => &PARTIAL_REMOVAL,
        StoreError::Remote(_) => &REMOTE_FAILURE,
        StoreError::Busy { .. } => &STORE_BUSY,
        StoreError::NoTarget | StoreError::NotLoaded { .. } => &NO_TARGET,
        StoreError::Disposed => return None,
    };
    Some(message)
}

/// 格式化带参数的消息模板，`{0}`、`{1}` 依次替换
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}
