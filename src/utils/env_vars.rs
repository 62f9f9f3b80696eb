use std::env;

/// 环境变量工具
pub struct EnvVarUtils;

impl EnvVarUtils {
    /// 展开字符串中的环境变量引用 (${VAR_NAME})，未定义的引用被移除
    pub fn expand_variables(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start..].find('}') else {
                break;
            };

            result.push_str(&rest[..start]);
            let var_name = &rest[start + 2..start + len];
            if !var_name.is_empty() {
                if let Ok(value) = env::var(var_name) {
                    result.push_str(&value);
                }
            }
            rest = &rest[start + len + 1..];
        }

        result.push_str(rest);
        result
    }

    /// 返回第一个已设置且非空的环境变量值
    pub fn first_non_empty(names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}
