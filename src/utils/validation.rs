use crate::core::model::KeyValue;
use crate::error::ValidationError;

/// 验证工具
pub struct ValidationUtils;

impl ValidationUtils {
    /// 去除首尾空白并校验键值都不为空
    pub fn normalize_entry(key: &str, value: &str) -> Result<KeyValue, ValidationError> {
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(ValidationError::EmptyField { field: "key" });
        }
        if value.is_empty() {
            return Err(ValidationError::EmptyField { field: "value" });
        }

        Ok(KeyValue::new(key, value))
    }

    /// 去重并保持调用方给出的顺序
    pub fn normalize_keys<I, S>(keys: I) -> Result<Vec<String>, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref();
            if !result.iter().any(|k| k == key) {
                result.push(key.to_string());
            }
        }

        if result.is_empty() {
            return Err(ValidationError::EmptyField { field: "keys" });
        }
        Ok(result)
    }

    /// 验证应用名称是否有效
    pub fn validate_app_name(name: &str) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Application name cannot be empty".to_string());
        }

        if name.len() > 100 {
            return Err("Application name too long (max 100 characters)".to_string());
        }

        if let Some(ch) = name.chars().find(|c| c.is_whitespace() || *c == '/') {
            return Err(format!("Application name cannot contain '{}'", ch.escape_default()));
        }

        Ok(())
    }

    /// 验证 URL 是否有效
    pub fn validate_url(url: &str) -> Result<(), String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        // 简单的 URL 格式检查
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("URL must start with http:// or https://".to_string());
        }

        match url::Url::parse(url) {
            Ok(_) => Ok(()),
            Err(e) => Err(format!("Invalid URL: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entry_trims() {
        let entry = ValidationUtils::normalize_entry("  PORT ", " 8080\n").unwrap();
        assert_eq!(entry, KeyValue::new("PORT", "8080"));
    }

    #[test]
    fn test_normalize_entry_rejects_blank_fields() {
        for (key, value) in [("", "x"), ("x", ""), ("  ", "  ")] {
            let err = ValidationUtils::normalize_entry(key, value).unwrap_err();
            assert!(matches!(err, ValidationError::EmptyField { .. }));
        }
    }

    #[test]
    fn test_normalize_keys_dedupes_in_order() {
        let keys = ValidationUtils::normalize_keys(["B", "A", "B"]).unwrap();
        assert_eq!(keys, vec!["B".to_string(), "A".to_string()]);

        let empty: [&str; 0] = [];
        assert!(ValidationUtils::normalize_keys(empty).is_err());
    }

    #[test]
    fn test_validate_app_name() {
        assert!(ValidationUtils::validate_app_name("my-app").is_ok());
        assert!(ValidationUtils::validate_app_name("").is_err());
        assert!(ValidationUtils::validate_app_name("my app").is_err());
        assert!(ValidationUtils::validate_app_name("a/b").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(ValidationUtils::validate_url("https://api.heroku.com").is_ok());
        assert!(ValidationUtils::validate_url("ftp://example.com").is_err());
        assert!(ValidationUtils::validate_url("").is_err());
    }
}
