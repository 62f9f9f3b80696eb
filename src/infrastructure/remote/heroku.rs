use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use super::http_client::{HttpClient, NetworkError};
use crate::core::model::{KeyValue, TargetApplication};
use crate::core::service::RemoteEnvironmentService;
use crate::error::ServiceError;

/// 平台 API 的配置变量集合；删除时值为 null
type ConfigVars = BTreeMap<String, Option<String>>;

/// 基于平台 HTTP API 的远端环境变量服务
pub struct HerokuEnvironmentService {
    client: HttpClient,
}

impl HerokuEnvironmentService {
    pub fn new(api_url: &str, token: &str, timeout_secs: u64) -> Result<Self, NetworkError> {
        Ok(Self {
            client: HttpClient::new(api_url, token, timeout_secs)?,
        })
    }

    async fn patch(&self, app: &TargetApplication, vars: &ConfigVars) -> Result<(), ServiceError> {
        let _: ConfigVars = self.client.patch_json(&config_vars_path(app), vars).await?;
        Ok(())
    }
}

/// `apps/{app}/config-vars`，应用名按路径段编码
pub fn config_vars_path(app: &TargetApplication) -> String {
    format!("apps/{}/config-vars", urlencoding::encode(app.name()))
}

/// 转换为按键排序的条目，值为 null 的键被忽略
fn into_entries(vars: ConfigVars) -> Vec<KeyValue> {
    vars.into_iter()
        .filter_map(|(key, value)| value.map(|value| KeyValue::new(key, value)))
        .collect()
}

#[async_trait]
impl RemoteEnvironmentService for HerokuEnvironmentService {
    async fn list_variables(
        &self,
        app: &TargetApplication,
    ) -> Result<Vec<KeyValue>, ServiceError> {
        debug!(app = %app, "listing config vars");
        let vars: ConfigVars = self.client.get_json(&config_vars_path(app)).await?;
        Ok(into_entries(vars))
    }

    async fn set_variable(
        &self,
        app: &TargetApplication,
        key: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        debug!(app = %app, key, "setting config var");
        let vars = ConfigVars::from([(key.to_string(), Some(value.to_string()))]);
        self.patch(app, &vars).await
    }

    async fn delete_variable(
        &self,
        app: &TargetApplication,
        key: &str,
    ) -> Result<(), ServiceError> {
        debug!(app = %app, key, "deleting config var");
        let vars = ConfigVars::from([(key.to_string(), None)]);
        self.patch(app, &vars).await
    }
}
