//! 远程环境变量存储
//!
//! 维护单个目标应用环境变量的本地快照。快照只会被一次成功的完整刷新整体替换，
//! 添加与删除都先调用远端，成功后再刷新；同一时刻只允许一个变更操作。

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tracing::{debug, error, info, warn};

use crate::core::constants::tasks;
use crate::core::model::{EnvironmentSnapshot, KeyValue, TargetApplication};
use crate::core::progress::{NoopProgress, ProgressReporter};
use crate::core::service::RemoteEnvironmentService;
use crate::error::{
    RemoteError, RemoteStage, ServiceError, StoreError, StoreResult, ValidationError,
};
use crate::utils::validation::ValidationUtils;

/// 存储状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoreState {
    /// 尚未成功加载当前目标的快照
    Uninitialized,
    /// 快照已与远端同步
    Loaded,
    /// 正在执行添加或删除
    Mutating,
    /// 已释放，不再接受任何操作
    Disposed,
}

struct StoreInner {
    target: Option<TargetApplication>,
    state: StoreState,
    selection: Vec<String>,
}

/// 环境变量存储
pub struct EnvironmentVariableStore {
    service: Arc<dyn RemoteEnvironmentService>,
    progress: Arc<dyn ProgressReporter>,
    inner: Mutex<StoreInner>,
    snapshot: watch::Sender<Arc<EnvironmentSnapshot>>,
    /// 变更操作互斥；竞争者直接被拒绝
    mutation: AsyncMutex<()>,
}

impl EnvironmentVariableStore {
    /// 创建新的存储，初始快照为空
    pub fn new(service: Arc<dyn RemoteEnvironmentService>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(EnvironmentSnapshot::empty()));

        Self {
            service,
            progress: Arc::new(NoopProgress),
            inner: Mutex::new(StoreInner {
                target: None,
                state: StoreState::Uninitialized,
                selection: Vec::new(),
            }),
            snapshot,
            mutation: AsyncMutex::new(()),
        }
    }

    /// 设置进度回调
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> StoreState {
        self.inner().state
    }

    pub fn target(&self) -> Option<TargetApplication> {
        self.inner().target.clone()
    }

    /// 当前快照；读取不会被进行中的变更阻塞
    pub fn snapshot(&self) -> Arc<EnvironmentSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<Arc<EnvironmentSnapshot>> {
        self.snapshot.subscribe()
    }

    /// 当前选中的键，按快照顺序排列
    pub fn selection(&self) -> Vec<String> {
        self.inner().selection.clone()
    }

    /// 选中一组键，快照中不存在的键被忽略
    pub fn select<I, S>(&self, keys: I) -> StoreResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_alive()?;
        let requested: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let snapshot = self.snapshot();

        let mut inner = self.inner();
        inner.selection = snapshot
            .keys()
            .filter(|key| requested.iter().any(|r| r.as_str() == *key))
            .map(str::to_string)
            .collect();
        Ok(inner.selection.clone())
    }

    /// 切换目标应用：丢弃旧快照与选择，然后刷新
    pub async fn set_target(&self, app: TargetApplication) -> StoreResult<Arc<EnvironmentSnapshot>> {
        self.ensure_alive()?;
        let _guard = self.begin_mutation("切换目标应用")?;
        {
            let mut inner = self.inner();
            if inner.state == StoreState::Disposed {
                return Err(StoreError::Disposed);
            }
            inner.target = Some(app.clone());
            inner.state = StoreState::Uninitialized;
            inner.selection.clear();
            self.snapshot
                .send_replace(Arc::new(EnvironmentSnapshot::empty()));
        }

        info!(app = %app, "switching target application");
        self.refresh_locked().await
    }

    /// 从远端重新加载完整快照；失败时保留原快照
    ///
    /// 如果有变更正在进行，等待其完成后再刷新。
    pub async fn refresh(&self) -> StoreResult<Arc<EnvironmentSnapshot>> {
        self.ensure_alive()?;
        let _guard = self.mutation.lock().await;
        self.ensure_alive()?;
        self.refresh_locked().await
    }

    /// 添加环境变量，成功后刷新快照
    ///
    /// 远端写入成功后存储若已被释放，返回 [`StoreError::Disposed`]，此时远端已包含该变量。
    pub async fn add(&self, key: &str, value: &str) -> StoreResult<KeyValue> {
        self.ensure_alive()?;
        let entry = ValidationUtils::normalize_entry(key, value)?;
        let _guard = self.begin_mutation("添加")?;
        let target = self.loaded_target()?;

        if self.snapshot().contains_key(&entry.key) {
            debug!(key = %entry.key, "rejecting to add already existing environment variable");
            return Err(ValidationError::DuplicateKey { key: entry.key }.into());
        }

        let _mutating = self.enter_mutating();
        let result = self.add_remote(&target, &entry).await;
        result.map(|_| entry)
    }

    /// 依次删除一组键，遇到第一个失败即停止
    ///
    /// 失败时返回的 [`RemoteError`] 列出失败前已删除的键；无论成功与否都会尝试刷新，
    /// 刷新失败时保留旧快照。
    pub async fn remove<I, S>(&self, keys: I) -> StoreResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_alive()?;
        let keys = ValidationUtils::normalize_keys(keys)?;
        let _guard = self.begin_mutation("删除")?;
        let target = self.loaded_target()?;

        let snapshot = self.snapshot();
        if let Some(missing) = keys.iter().find(|k| !snapshot.contains_key(k)) {
            return Err(ValidationError::UnknownKey {
                key: missing.clone(),
            }
            .into());
        }

        info!(app = %target, count = keys.len(), "about to remove environment variables");
        let _mutating = self.enter_mutating();
        self.remove_remote(&target, &keys).await
    }

    /// 删除当前选中的键
    pub async fn remove_selected(&self) -> StoreResult<Vec<String>> {
        let selection = self.selection();
        if selection.is_empty() {
            return Err(ValidationError::EmptyField { field: "selection" }.into());
        }
        self.remove(selection).await
    }

    /// 释放存储；之后的所有操作返回 [`StoreError::Disposed`]
    pub fn dispose(&self) {
        let mut inner = self.inner();
        if inner.state == StoreState::Disposed {
            return;
        }
        inner.state = StoreState::Disposed;
        inner.target = None;
        inner.selection.clear();
        self.snapshot
            .send_replace(Arc::new(EnvironmentSnapshot::empty()));
        debug!("environment variable store disposed");
    }

    async fn add_remote(&self, target: &TargetApplication, entry: &KeyValue) -> StoreResult<()> {
        self.progress.begin(tasks::ADDING, 2);
        self.progress.worked(1);

        let outcome = self
            .service
            .set_variable(target, &entry.key, &entry.value)
            .await;
        match outcome {
            Ok(()) => {
                self.progress.worked(1);
                self.progress.done();
            }
            Err(ServiceError::RequestFailed { message }) => {
                self.progress.done();
                warn!(app = %target, key = %entry.key, %message, "remote rejected environment variable");
                return Err(ValidationError::RemoteRejected {
                    key: entry.key.clone(),
                    message,
                }
                .into());
            }
            Err(cause) => {
                self.progress.done();
                error!(app = %target, key = %entry.key, error = %cause, "unknown error when trying to add new environment variable");
                return Err(RemoteError::new(RemoteStage::Add, cause)
                    .with_key(entry.key.clone())
                    .into());
            }
        }

        self.refresh_locked().await.map_err(|e| match e {
            StoreError::Remote(remote) => StoreError::Remote(remote.with_key(entry.key.clone())),
            StoreError::Disposed => {
                warn!(app = %target, key = %entry.key, "store disposed after environment variable was added");
                StoreError::Disposed
            }
            other => other,
        })?;
        Ok(())
    }

    async fn remove_remote(
        &self,
        target: &TargetApplication,
        keys: &[String],
    ) -> StoreResult<Vec<String>> {
        self.progress.begin(tasks::REMOVING, keys.len() as u64 + 1);
        self.progress.worked(1);

        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            self.progress.sub_task(&format!("Removing {key}"));
            if let Err(cause) = self.service.delete_variable(target, key).await {
                self.progress.done();
                error!(
                    app = %target,
                    key = %key,
                    removed = removed.len(),
                    error = %cause,
                    "error when trying to remove environment variable(s)"
                );
                let failure = RemoteError::new(RemoteStage::Remove, cause)
                    .with_key(key.clone())
                    .with_removed(removed);

                if let Err(refresh_error) = self.refresh_locked().await {
                    warn!(error = %refresh_error, "reconciling refresh failed, keeping stale snapshot");
                }
                return Err(failure.into());
            }
            removed.push(key.clone());
            self.progress.worked(1);
        }
        self.progress.done();
        info!(app = %target, count = removed.len(), "removal of environment variables complete");

        self.refresh_locked().await.map_err(|e| match e {
            StoreError::Remote(remote) => StoreError::Remote(remote.with_removed(removed.clone())),
            other => other,
        })?;
        Ok(removed)
    }

    /// 调用方必须持有变更锁
    async fn refresh_locked(&self) -> StoreResult<Arc<EnvironmentSnapshot>> {
        let target = self.inner().target.clone().ok_or(StoreError::NoTarget)?;

        let entries = match self.service.list_variables(&target).await {
            Ok(entries) => entries,
            Err(cause) => {
                error!(app = %target, error = %cause, "unknown error when trying to refresh environment variables");
                return Err(RemoteError::new(RemoteStage::Refresh, cause).into());
            }
        };
        let snapshot = Arc::new(EnvironmentSnapshot::new(target, entries));

        let mut inner = self.inner();
        if inner.state == StoreState::Disposed {
            return Err(StoreError::Disposed);
        }
        inner.selection.retain(|key| snapshot.contains_key(key));
        inner.state = StoreState::Loaded;
        self.snapshot.send_replace(Arc::clone(&snapshot));
        debug!(count = snapshot.len(), "environment snapshot replaced");

        Ok(snapshot)
    }

    fn begin_mutation(&self, operation: &'static str) -> StoreResult<AsyncMutexGuard<'_, ()>> {
        let guard = self
            .mutation
            .try_lock()
            .map_err(|_| StoreError::Busy { operation })?;
        self.ensure_alive()?;
        Ok(guard)
    }

    fn loaded_target(&self) -> StoreResult<TargetApplication> {
        let inner = self.inner();
        match (&inner.target, inner.state) {
            (None, _) => Err(StoreError::NoTarget),
            (Some(target), StoreState::Loaded) => Ok(target.clone()),
            (Some(target), _) => Err(StoreError::NotLoaded {
                target: target.to_string(),
            }),
        }
    }

    /// 进入 Mutating；返回的守卫在释放时恢复之前的状态，变更 future 被中途丢弃时同样生效
    fn enter_mutating(&self) -> MutatingGuard<'_> {
        let prior = std::mem::replace(&mut self.inner().state, StoreState::Mutating);
        MutatingGuard { store: self, prior }
    }

    fn ensure_alive(&self) -> StoreResult<()> {
        if self.inner().state == StoreState::Disposed {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    fn inner(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct MutatingGuard<'a> {
    store: &'a EnvironmentVariableStore,
    prior: StoreState,
}

impl Drop for MutatingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.store.inner();
        if inner.state == StoreState::Mutating {
            inner.state = self.prior;
        }
    }
}
