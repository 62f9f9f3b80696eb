use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::constants::{api, config_files, env_keys, log};
use crate::error::{AppError, AppResult};
use crate::utils::{EnvVarUtils, ValidationUtils};

/// 配置文件结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// 平台 API 地址
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API Token，支持 ${VAR} 引用
    #[serde(default)]
    pub api_token: String,
    /// 未通过 --app 指定时使用的应用
    #[serde(default)]
    pub default_app: Option<String>,
    /// 请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 日志级别，RUST_LOG 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    api::DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    api::DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    log::DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            default_app: None,
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// 从默认路径加载配置
    pub fn load() -> AppResult<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// 从指定文件加载配置，文件不存在时写入默认配置
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config_load_failed(&path.display().to_string(), &e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| AppError::config_load_failed(&path.display().to_string(), &e.to_string()))
    }

    /// 保存配置到文件
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        // 确保配置目录存在
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| AppError::config_save_failed(&path.display().to_string(), &e.to_string()))
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = EnvVarUtils::first_non_empty(&[env_keys::API_URL]) {
            self.api_url = url;
        }
        if let Some(token) = EnvVarUtils::first_non_empty(&[env_keys::API_TOKEN]) {
            self.api_token = token;
        }
        if let Some(app) = EnvVarUtils::first_non_empty(&[env_keys::APP]) {
            self.default_app = Some(app);
        }
    }

    /// 解析后的 API Token；配置为空时回退到平台的标准环境变量
    pub fn resolved_token(&self) -> Option<String> {
        let token = EnvVarUtils::expand_variables(&self.api_token);
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
        EnvVarUtils::first_non_empty(&[env_keys::FALLBACK_API_TOKEN])
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        ValidationUtils::validate_url(&self.api_url)
            .map_err(|reason| AppError::invalid_field("api_url", reason))?;

        if self.timeout_secs == 0 {
            return Err(AppError::invalid_field("timeout_secs", "must be greater than 0"));
        }

        if let Some(app) = &self.default_app {
            ValidationUtils::validate_app_name(app)
                .map_err(|reason| AppError::invalid_field("default_app", reason))?;
        }

        Ok(())
    }
}

/// 获取配置文件路径，APPENV_CONFIG 优先
pub fn get_config_path() -> AppResult<PathBuf> {
    if let Some(path) = EnvVarUtils::first_non_empty(&[env_keys::CONFIG_PATH]) {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().ok_or_else(|| AppError::Config {
        message: "无法获取用户主目录".to_string(),
    })?;
    Ok(home
        .join(config_files::CONFIG_DIR_NAME)
        .join(config_files::CONFIG_FILE_NAME))
}

/// 判断是否设置了指定的环境变量（用于日志输出格式等开关）
pub fn env_flag_equals(name: &str, expected: &str) -> bool {
    env::var(name)
        .map(|value| value.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
