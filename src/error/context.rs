use crate::core::error_messages::{describe, ErrorMessage};
use crate::error::AppError;

/// 用于提供错误上下文和用户友好建议
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub operation: String,
    pub suggestions: Vec<String>,
}

/// 带有上下文的错误
#[derive(thiserror::Error, Debug)]
pub struct ContextualError {
    #[source]
    pub error: AppError,
    pub context: ErrorContext,
}

impl std::fmt::Display for ContextualError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "操作失败: {}\n错误: {}", self.context.operation, self.error)
    }
}

impl ContextualError {
    pub fn new(error: AppError, operation: &str) -> Self {
        let suggestions = describe(&error)
            .map(ErrorMessage::suggestions)
            .unwrap_or_default()
            .iter()
            .map(|s| s.to_string())
            .collect();

        Self {
            error,
            context: ErrorContext {
                operation: operation.to_string(),
                suggestions,
            },
        }
    }

    /// 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        let mut msg = format!("❌ {}\n", self.context.operation);
        match describe(&self.error) {
            Some(described) => {
                msg.push_str(&format!("{}\n", described.title));
                msg.push_str(&format!("原因: {}\n", self.error));
            }
            None => msg.push_str(&format!("原因: {}\n", self.error)),
        }

        if !self.context.suggestions.is_empty() {
            msg.push_str("💡 建议:\n");
            for suggestion in &self.context.suggestions {
                msg.push_str(&format!("  • {}\n", suggestion));
            }
        }

        msg
    }
}

pub type ContextualResult<T> = Result<T, ContextualError>;

/// 为Result添加上下文信息的辅助函数
pub fn with_context<T, E: Into<AppError>>(
    result: Result<T, E>,
    operation: &str,
) -> ContextualResult<T> {
    result.map_err(|e| ContextualError::new(e.into(), operation))
}
