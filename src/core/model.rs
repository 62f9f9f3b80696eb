use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 远端托管的目标应用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetApplication(String);

impl TargetApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 应用名称或 ID
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 单个环境变量，以 key 作为标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 某个目标应用在某一时刻的完整环境变量集合
///
/// 保留远端返回的顺序以保证显示稳定；键在集合内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    target: Option<TargetApplication>,
    entries: Vec<KeyValue>,
    fetched_at: Option<DateTime<Utc>>,
}

impl EnvironmentSnapshot {
    /// 空快照（尚未加载或已丢弃）
    pub fn empty() -> Self {
        Self {
            target: None,
            entries: Vec::new(),
            fetched_at: None,
        }
    }

    /// 由远端返回的条目构造快照，重复的键保留首次出现的位置和最后一次的值
    pub fn new(target: TargetApplication, entries: Vec<KeyValue>) -> Self {
        let mut deduped: Vec<KeyValue> = Vec::with_capacity(entries.len());
        for entry in entries {
            match deduped.iter_mut().find(|e| e.key == entry.key) {
                Some(existing) => existing.value = entry.value,
                None => deduped.push(entry),
            }
        }

        Self {
            target: Some(target),
            entries: deduped,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn target(&self) -> Option<&TargetApplication> {
        self.target.as_ref()
    }

    pub fn entries(&self) -> &[KeyValue] {
        &self.entries
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// 大小写敏感的精确匹配
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否为已从远端加载过的快照
    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
