use async_trait::async_trait;

use crate::core::model::{KeyValue, TargetApplication};
use crate::error::ServiceError;

/// 远端环境变量服务抽象接口
///
/// 实现负责实际的网络调用与超时策略；存储层只依赖这三个操作。
#[async_trait]
pub trait RemoteEnvironmentService: Send + Sync {
    /// 获取目标应用的全部环境变量
    async fn list_variables(&self, app: &TargetApplication)
        -> Result<Vec<KeyValue>, ServiceError>;

    /// 设置单个环境变量
    async fn set_variable(
        &self,
        app: &TargetApplication,
        key: &str,
        value: &str,
    ) -> Result<(), ServiceError>;

    /// 删除单个环境变量
    async fn delete_variable(&self, app: &TargetApplication, key: &str)
        -> Result<(), ServiceError>;
}
