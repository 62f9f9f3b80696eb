use serde::Serialize;

use crate::core::model::{EnvironmentSnapshot, KeyValue};
use crate::error::AppResult;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// 输出格式化器
pub struct OutputFormatter;

fn to_json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

impl OutputFormatter {
    /// 格式化环境变量列表
    pub fn format_snapshot(
        &self,
        snapshot: &EnvironmentSnapshot,
        format: OutputFormat,
    ) -> AppResult<String> {
        match format {
            OutputFormat::Text => {
                let app = snapshot
                    .target()
                    .map(|t| t.to_string())
                    .unwrap_or_default();
                if snapshot.is_empty() {
                    return Ok(format!("No environment variables found for {}\n", app));
                }

                let width = snapshot.keys().map(|k| k.chars().count()).max().unwrap_or(0);
                let mut output = format!("=== {} Config Vars\n", app);
                for entry in snapshot.entries() {
                    output.push_str(&format!("{:width$}  {}\n", entry.key, entry.value));
                }
                Ok(output)
            }
            OutputFormat::Json => to_json(&serde_json::json!({
                "app": snapshot.target(),
                "fetched_at": snapshot.fetched_at(),
                "variables": snapshot.entries(),
            })),
        }
    }

    /// 格式化单个环境变量
    pub fn format_entry(&self, entry: &KeyValue, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!("{}\n", entry.value)),
            OutputFormat::Json => to_json(entry),
        }
    }

    /// 格式化添加结果
    pub fn format_added(&self, entry: &KeyValue, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!("Added {}\n", entry.key)),
            OutputFormat::Json => to_json(&serde_json::json!({
                "added": entry,
                "success": true
            })),
        }
    }

    /// 格式化删除结果
    pub fn format_removed(&self, keys: &[String], format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "Removed {} environment variable(s): {}\n",
                keys.len(),
                keys.join(", ")
            )),
            OutputFormat::Json => to_json(&serde_json::json!({
                "removed": keys,
                "success": true
            })),
        }
    }

    /// 格式化错误信息
    pub fn format_error(&self, message: &str, removed: &[String], format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => format!("{}\n", message.trim_end()),
            OutputFormat::Json => {
                let json_output = serde_json::json!({
                    "error": message.trim_end(),
                    "removed": removed,
                    "success": false
                });
                to_json(&json_output).unwrap_or_else(|_| format!("{}\n", message))
            }
        }
    }
}

/// 默认输出格式化器实例
pub static FORMATTER: OutputFormatter = OutputFormatter;
