use std::env;
use std::str::FromStr;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::core::constants::env_keys;
use crate::infrastructure::config::env_flag_equals;

/// 初始化日志，RUST_LOG 优先于配置中的级别；LOG_FORMAT=json 输出 JSON
///
/// 日志写入 stderr，保证 stdout 上的 JSON 输出不被污染。
pub fn init_logging(default_level: &str) -> Result<(), String> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let filter = EnvFilter::from_str(&directives)
        .map_err(|e| format!("Invalid log filter '{directives}': {e}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if env_flag_equals(env_keys::LOG_FORMAT, "json") {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(e) = result {
        warn!("Failed to initialize logging, potentially because it is already initialized: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        assert!(init_logging("debug").is_ok());
        assert!(init_logging("debug").is_ok());
    }
}
