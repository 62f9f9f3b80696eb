use std::fmt;
use thiserror::Error;

/// 远端服务返回的失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// 远端拒绝了请求内容（校验类失败）
    #[error("请求被远端拒绝: {message}")]
    RequestFailed { message: String },

    /// 其他任何失败：网络、认证、服务端错误等
    #[error("远端调用失败: {message}")]
    Unknown { message: String },
}

impl ServiceError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::RequestFailed { message } | Self::Unknown { message } => message,
        }
    }
}

/// 输入校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("字段 '{field}' 不能为空")]
    EmptyField { field: &'static str },

    #[error("环境变量 '{key}' 已存在")]
    DuplicateKey { key: String },

    #[error("环境变量 '{key}' 不存在")]
    UnknownKey { key: String },

    #[error("环境变量 '{key}' 被远端拒绝: {message}")]
    RemoteRejected { key: String, message: String },
}

/// 远端失败发生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    Refresh,
    Add,
    Remove,
}

impl fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStage::Refresh => write!(f, "刷新"),
            RemoteStage::Add => write!(f, "添加"),
            RemoteStage::Remove => write!(f, "删除"),
        }
    }
}

/// 远端调用错误，保留底层原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub stage: RemoteStage,
    /// 失败时正在处理的键
    pub key: Option<String>,
    /// 失败前已经成功删除的键（仅批量删除时非空）
    pub removed: Vec<String>,
    #[source]
    pub cause: ServiceError,
}

impl RemoteError {
    pub fn new(stage: RemoteStage, cause: ServiceError) -> Self {
        Self {
            stage,
            key: None,
            removed: Vec::new(),
            cause,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_removed(mut self, removed: Vec<String>) -> Self {
        self.removed = removed;
        self
    }

    /// 是否为部分完成的批量删除
    pub fn is_partial(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}环境变量失败", self.stage)?;
        if let Some(key) = &self.key {
            write!(f, " ({})", key)?;
        }
        write!(f, ": {}", self.cause)?;
        if !self.removed.is_empty() {
            write!(f, "; 已删除: {}", self.removed.join(", "))?;
        }
        Ok(())
    }
}

/// 环境变量存储的操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("验证错误: {0}")]
    Validation(#[from] ValidationError),

    #[error("远端错误: {0}")]
    Remote(#[from] RemoteError),

    #[error("存储正忙，拒绝并发的{operation}操作")]
    Busy { operation: &'static str },

    #[error("尚未选择目标应用")]
    NoTarget,

    #[error("应用 '{target}' 的环境变量尚未加载")]
    NotLoaded { target: String },

    #[error("存储已释放")]
    Disposed,
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// 批量删除失败前已完成的键
    pub fn removed_keys(&self) -> &[String] {
        match self {
            StoreError::Remote(e) => &e.removed,
            _ => &[],
        }
    }
}

/// 存储操作 Result 类型
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_names_key_and_removed() {
        let err = RemoteError::new(RemoteStage::Remove, ServiceError::unknown("503"))
            .with_key("B")
            .with_removed(vec!["A".to_string()]);

        let text = err.to_string();
        assert!(text.contains("删除"));
        assert!(text.contains("(B)"));
        assert!(text.contains("已删除: A"));
        assert!(err.is_partial());
    }

    #[test]
    fn test_remote_error_keeps_cause_as_source() {
        use std::error::Error;

        let err = RemoteError::new(RemoteStage::Refresh, ServiceError::unknown("timeout"));
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("timeout"));
    }

    #[test]
    fn test_removed_keys_only_for_remote_errors() {
        let err: StoreError = ValidationError::EmptyField { field: "key" }.into();
        assert!(err.is_validation());
        assert!(err.removed_keys().is_empty());
    }
}
