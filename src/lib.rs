// 核心模块
pub mod cli;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod utils;

// 重新导出常用类型
pub use error::*;
pub use utils::*;
pub use crate::core::model::{EnvironmentSnapshot, KeyValue, TargetApplication};
pub use crate::core::progress::{NoopProgress, ProgressReporter};
pub use crate::core::service::RemoteEnvironmentService;
pub use crate::core::store::{EnvironmentVariableStore, StoreState};
// 使用命名空间导入常量，避免冲突
pub use crate::core::constants as app_constants;

pub use infrastructure::config::Config;
pub use infrastructure::progress::IndicatifProgress;
pub use infrastructure::remote::{HerokuEnvironmentService, InMemoryEnvironmentService};
