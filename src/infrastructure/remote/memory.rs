use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::model::{KeyValue, TargetApplication};
use crate::core::service::RemoteEnvironmentService;
use crate::error::ServiceError;

/// 远端操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    List,
    Set,
    Delete,
}

/// 一次已记录的远端调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub operation: RemoteOperation,
    pub app: TargetApplication,
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: RemoteOperation,
    key: Option<String>,
    error: ServiceError,
}

/// 进程内的远端服务实现
///
/// 记录每次调用，并可按操作和键注入失败，用于测试存储层的一致性行为。
#[derive(Debug, Default)]
pub struct InMemoryEnvironmentService {
    apps: Mutex<HashMap<TargetApplication, Vec<KeyValue>>>,
    failures: Mutex<Vec<FailureRule>>,
    calls: Mutex<Vec<RemoteCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryEnvironmentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建应用并写入初始环境变量
    pub fn with_variables(self, app: &str, entries: &[(&str, &str)]) -> Self {
        {
            let mut apps = lock(&self.apps);
            let vars = apps.entry(TargetApplication::new(app)).or_default();
            for (key, value) in entries {
                vars.push(KeyValue::new(*key, *value));
            }
        }
        self
    }

    /// 直接修改远端数据，模拟其他客户端的写入
    pub fn insert(&self, app: &TargetApplication, key: &str, value: &str) {
        let mut apps = lock(&self.apps);
        upsert(apps.entry(app.clone()).or_default(), key, value);
    }

    /// 当前远端数据
    pub fn variables(&self, app: &TargetApplication) -> Vec<KeyValue> {
        lock(&self.apps).get(app).cloned().unwrap_or_default()
    }

    /// 注入失败；`key` 为 None 时匹配该操作的所有调用
    pub fn fail_on(&self, operation: RemoteOperation, key: Option<&str>, error: ServiceError) {
        lock(&self.failures).push(FailureRule {
            operation,
            key: key.map(str::to_string),
            error,
        });
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: RemoteOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(
        &self,
        operation: RemoteOperation,
        app: &TargetApplication,
        key: Option<&str>,
    ) -> Result<(), ServiceError> {
        lock(&self.calls).push(RemoteCall {
            operation,
            app: app.clone(),
            key: key.map(str::to_string),
        });

        let failures = lock(&self.failures);
        let matched = failures.iter().find(|rule| {
            rule.operation == operation
                && (rule.key.is_none() || rule.key.as_deref() == key)
        });
        match matched {
            Some(rule) => Err(rule.error.clone()),
            None => Ok(()),
        }
    }
}

fn upsert(vars: &mut Vec<KeyValue>, key: &str, value: &str) {
    match vars.iter_mut().find(|e| e.key == key) {
        Some(existing) => existing.value = value.to_string(),
        None => vars.push(KeyValue::new(key, value)),
    }
}

fn app_not_found(app: &TargetApplication) -> ServiceError {
    ServiceError::unknown(format!("Couldn't find that app: {}", app))
}

#[async_trait]
impl RemoteEnvironmentService for InMemoryEnvironmentService {
    async fn list_variables(
        &self,
        app: &TargetApplication,
    ) -> Result<Vec<KeyValue>, ServiceError> {
        self.record(RemoteOperation::List, app, None)?;
        lock(&self.apps)
            .get(app)
            .cloned()
            .ok_or_else(|| app_not_found(app))
    }

    async fn set_variable(
        &self,
        app: &TargetApplication,
        key: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        self.record(RemoteOperation::Set, app, Some(key))?;
        let mut apps = lock(&self.apps);
        let vars = apps.get_mut(app).ok_or_else(|| app_not_found(app))?;
        upsert(vars, key, value);
        Ok(())
    }

    async fn delete_variable(
        &self,
        app: &TargetApplication,
        key: &str,
    ) -> Result<(), ServiceError> {
        self.record(RemoteOperation::Delete, app, Some(key))?;
        let mut apps = lock(&self.apps);
        let vars = apps.get_mut(app).ok_or_else(|| app_not_found(app))?;
        vars.retain(|e| e.key != key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_delete_round() {
        let app = TargetApplication::new("demo");
        let service = InMemoryEnvironmentService::new().with_variables("demo", &[("A", "1")]);

        service.set_variable(&app, "A", "2").await.unwrap();
        service.set_variable(&app, "B", "3").await.unwrap();
        service.delete_variable(&app, "A").await.unwrap();

        assert_eq!(service.variables(&app), vec![KeyValue::new("B", "3")]);
        assert_eq!(service.call_count(RemoteOperation::Set), 2);
        assert_eq!(service.call_count(RemoteOperation::Delete), 1);
    }

    #[tokio::test]
    async fn test_unknown_app_fails() {
        let service = InMemoryEnvironmentService::new();
        let err = service
            .list_variables(&TargetApplication::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_failure_injection_matches_key() {
        let app = TargetApplication::new("demo");
        let service =
            InMemoryEnvironmentService::new().with_variables("demo", &[("A", "1"), ("B", "2")]);
        service.fail_on(
            RemoteOperation::Delete,
            Some("B"),
            ServiceError::unknown("boom"),
        );

        assert!(service.delete_variable(&app, "A").await.is_ok());
        assert!(service.delete_variable(&app, "B").await.is_err());
        assert_eq!(service.variables(&app), vec![KeyValue::new("B", "2")]);

        service.clear_failures();
        assert!(service.delete_variable(&app, "B").await.is_ok());
    }
}
