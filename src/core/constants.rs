//! 应用程序常量定义
//!
//! 本模块包含全局使用的常量，避免魔数并提供统一的配置值。

/// 远端 API 相关常量
pub mod api {
    /// 默认 API 地址
    pub const DEFAULT_API_URL: &str = "https://api.heroku.com";
    /// API 版本协商头
    pub const ACCEPT_HEADER: &str = "application/vnd.heroku+json; version=3";
    /// 默认请求超时时间（秒）
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// User-Agent
    pub const USER_AGENT: &str = concat!("appenv/", env!("CARGO_PKG_VERSION"));
}

/// 配置文件相关常量
pub mod config_files {
    /// 配置目录名（位于用户主目录下）
    pub const CONFIG_DIR_NAME: &str = ".appenv";
    /// 配置文件名
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// 读取的环境变量名
pub mod env_keys {
    pub const CONFIG_PATH: &str = "APPENV_CONFIG";
    pub const API_URL: &str = "APPENV_API_URL";
    pub const API_TOKEN: &str = "APPENV_API_TOKEN";
    /// 未设置 APPENV_API_TOKEN 时的回退
    pub const FALLBACK_API_TOKEN: &str = "HEROKU_API_KEY";
    pub const APP: &str = "APPENV_APP";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// 日志相关常量
pub mod log {
    /// 默认日志级别
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

/// 进度任务名称
pub mod tasks {
    pub const ADDING: &str = "Adding environment variable";
    pub const REMOVING: &str = "Removing environment variables";
}
