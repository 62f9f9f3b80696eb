use std::io;
use thiserror::Error;

use super::store_error::StoreError;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    #[error("配置错误: {message}")]
    Config { message: String },

    #[error("网络错误: {message}")]
    Network { message: String },

    #[error("序列化错误: {message}")]
    Serialization { message: String },

    #[error("验证错误: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("操作已取消: {operation}")]
    Cancelled { operation: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 应用程序 Result 类型
pub type AppResult<T> = Result<T, AppError>;

/// 便捷的错误创建函数
impl AppError {
    pub fn config_load_failed(path: &str, reason: &str) -> Self {
        Self::Config {
            message: format!("无法加载配置文件 {}: {}", path, reason),
        }
    }

    pub fn config_save_failed(path: &str, reason: &str) -> Self {
        Self::Config {
            message: format!("无法写入配置文件 {}: {}", path, reason),
        }
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn cancelled(operation: &str) -> Self {
        Self::Cancelled {
            operation: operation.to_string(),
        }
    }

    /// 如果是存储层错误则返回其引用
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
