use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use crate::cli::commands::{Cli, Commands};
use crate::cli::output::{OutputFormat, FORMATTER};
use crate::core::error_messages::format_template;
use crate::core::model::TargetApplication;
use crate::core::progress::ProgressReporter;
use crate::core::service::RemoteEnvironmentService;
use crate::core::store::EnvironmentVariableStore;
use crate::error::{AppError, AppResult, ContextualError, StoreError, ValidationError};
use crate::infrastructure::config::Config;
use crate::infrastructure::progress::IndicatifProgress;
use crate::infrastructure::remote::HerokuEnvironmentService;
use crate::utils::ValidationUtils;

/// 命令处理器
pub struct CommandHandler {
    store: Arc<EnvironmentVariableStore>,
}

impl CommandHandler {
    /// 根据配置创建基于平台 API 的处理器，并加载目标应用
    pub async fn new(
        config: &Config,
        app: Option<String>,
        progress: Arc<dyn ProgressReporter>,
    ) -> AppResult<Self> {
        config.validate()?;
        let app = resolve_app(app, config)?;
        let token = config
            .resolved_token()
            .ok_or_else(|| AppError::invalid_field("api_token", "未配置 API Token"))?;
        let service = HerokuEnvironmentService::new(&config.api_url, &token, config.timeout_secs)
            .map_err(|e| AppError::Network {
                message: e.to_string(),
            })?;

        Self::with_service(Arc::new(service), app, progress).await
    }

    /// 使用给定的远端服务创建处理器
    pub async fn with_service(
        service: Arc<dyn RemoteEnvironmentService>,
        app: TargetApplication,
        progress: Arc<dyn ProgressReporter>,
    ) -> AppResult<Self> {
        let store = EnvironmentVariableStore::new(service).with_progress(progress);
        store.set_target(app).await?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> &Arc<EnvironmentVariableStore> {
        &self.store
    }

    /// 处理命令，返回要打印到 stdout 的内容
    pub async fn handle_command(&self, command: Commands) -> AppResult<String> {
        let format = OutputFormat::from_json_flag(command.json());
        match command {
            Commands::List { .. } => FORMATTER.format_snapshot(&self.store.snapshot(), format),
            Commands::Show { key, .. } => {
                let snapshot = self.store.snapshot();
                let entry = snapshot.get(&key).ok_or_else(|| {
                    StoreError::from(ValidationError::UnknownKey { key: key.clone() })
                })?;
                FORMATTER.format_entry(entry, format)
            }
            Commands::Add { key, value, .. } => {
                let entry = self.store.add(&key, &value).await?;
                FORMATTER.format_added(&entry, format)
            }
            Commands::Remove { keys, yes, .. } => {
                if !yes && !confirm_removal(&keys)? {
                    return Err(AppError::cancelled("删除环境变量"));
                }
                let removed = self.store.remove(&keys).await?;
                FORMATTER.format_removed(&removed, format)
            }
        }
    }
}

impl Drop for CommandHandler {
    fn drop(&mut self) {
        self.store.dispose();
    }
}

/// 解析目标应用：命令行参数优先，其次为配置
pub fn resolve_app(app: Option<String>, config: &Config) -> AppResult<TargetApplication> {
    let name = app
        .or_else(|| config.default_app.clone())
        .ok_or(StoreError::NoTarget)?;
    ValidationUtils::validate_app_name(&name).map_err(|reason| AppError::invalid_field("app", reason))?;
    Ok(TargetApplication::new(name))
}

/// 删除确认提示
pub fn removal_prompt(keys: &[String]) -> String {
    match keys {
        [single] => format_template("确定要删除环境变量 '{0}' 吗？", &[single.as_str()]),
        _ => {
            let listed: String = keys.iter().map(|k| format!("* {k}\n")).collect();
            format_template("确定要删除以下环境变量吗？\n{0}", &[listed.as_str()])
        }
    }
}

/// 在终端上询问是否删除；非交互终端必须使用 --yes
fn confirm_removal(keys: &[String]) -> AppResult<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(AppError::cancelled("删除环境变量（非交互终端请使用 --yes）"));
    }

    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", removal_prompt(keys).trim_end())?;
    stderr.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// 执行一次完整的命令行调用
pub async fn run(cli: Cli, config: &Config) -> Result<String, ContextualError> {
    let operation = cli.command.operation();
    let progress: Arc<dyn ProgressReporter> = if cli.command.json() || !io::stderr().is_terminal() {
        Arc::new(IndicatifProgress::hidden())
    } else {
        Arc::new(IndicatifProgress::new())
    };

    let handler = CommandHandler::new(config, cli.app, progress)
        .await
        .map_err(|e| ContextualError::new(e, "加载环境变量"))?;
    handler
        .handle_command(cli.command)
        .await
        .map_err(|e| ContextualError::new(e, operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::NoopProgress;
    use crate::error::ServiceError;
    use crate::infrastructure::remote::{InMemoryEnvironmentService, RemoteOperation};

    async fn handler(
        entries: &[(&str, &str)],
    ) -> (Arc<InMemoryEnvironmentService>, CommandHandler) {
        let service = Arc::new(InMemoryEnvironmentService::new().with_variables("demo", entries));
        let handler = CommandHandler::with_service(
            service.clone(),
            TargetApplication::new("demo"),
            Arc::new(NoopProgress),
        )
        .await
        .unwrap();
        (service, handler)
    }

    #[tokio::test]
    async fn test_list_and_show() {
        let (_, handler) = handler(&[("PORT", "80")]).await;

        let listed = handler
            .handle_command(Commands::List { json: false })
            .await
            .unwrap();
        assert!(listed.contains("PORT  80"));

        let shown = handler
            .handle_command(Commands::Show {
                key: "PORT".to_string(),
                json: false,
            })
            .await
            .unwrap();
        assert_eq!(shown, "80\n");
    }

    #[tokio::test]
    async fn test_show_missing_key() {
        let (_, handler) = handler(&[]).await;

        let err = handler
            .handle_command(Commands::Show {
                key: "NOPE".to_string(),
                json: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_store_error(),
            Some(StoreError::Validation(ValidationError::UnknownKey { .. }))
        ));
    }

    #[tokio::test]
    async fn test_add_and_remove_with_yes() {
        let (service, handler) = handler(&[("A", "1")]).await;

        let added = handler
            .handle_command(Commands::Add {
                key: "B".to_string(),
                value: "2".to_string(),
                json: false,
            })
            .await
            .unwrap();
        assert_eq!(added, "Added B\n");

        let removed = handler
            .handle_command(Commands::Remove {
                keys: vec!["A".to_string(), "B".to_string()],
                yes: true,
                json: true,
            })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&removed).unwrap();
        assert_eq!(value["removed"], serde_json::json!(["A", "B"]));
        assert!(handler.store().snapshot().is_empty());
        assert_eq!(service.call_count(RemoteOperation::Delete), 2);
    }

    #[tokio::test]
    async fn test_partial_removal_error_message() {
        let (service, handler) = handler(&[("A", "1"), ("B", "2")]).await;
        service.fail_on(RemoteOperation::Delete, Some("B"), ServiceError::unknown("boom"));

        let err = handler
            .handle_command(Commands::Remove {
                keys: vec!["A".to_string(), "B".to_string()],
                yes: true,
                json: false,
            })
            .await
            .unwrap_err();

        let message = ContextualError::new(err, "删除环境变量").user_message();
        assert!(message.contains("部分环境变量已删除"));
        assert!(message.contains("已删除: A"));
    }

    #[tokio::test]
    async fn test_drop_disposes_store() {
        let (_, handler) = handler(&[]).await;
        let store = Arc::clone(handler.store());

        drop(handler);

        assert_eq!(store.state(), crate::core::store::StoreState::Disposed);
    }

    #[test]
    fn test_resolve_app_prefers_cli() {
        let config = Config {
            default_app: Some("from-config".to_string()),
            ..Config::default()
        };

        assert_eq!(
            resolve_app(Some("from-cli".to_string()), &config).unwrap(),
            TargetApplication::new("from-cli")
        );
        assert_eq!(
            resolve_app(None, &config).unwrap(),
            TargetApplication::new("from-config")
        );
        assert!(matches!(
            resolve_app(None, &Config::default()),
            Err(AppError::Store(StoreError::NoTarget))
        ));
    }

    #[test]
    fn test_removal_prompt() {
        assert_eq!(
            removal_prompt(&["PORT".to_string()]),
            "确定要删除环境变量 'PORT' 吗？"
        );
        assert_eq!(
            removal_prompt(&["A".to_string(), "B".to_string()]),
            "确定要删除以下环境变量吗？\n* A\n* B\n"
        );
    }
}
