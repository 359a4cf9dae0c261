use serde::{Deserialize, Serialize};
use std::fmt;

/// 资源名称，非空
///
/// 既用作搜索关键字，也用作完全匹配的键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetName(String);

impl AssetName {
    /// 创建资源名称，空字符串返回 `None`
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 目录服务分配的资源 ID
///
/// 服务端可能以数字返回，这里统一在边界处转成字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Visitor;

        struct AssetIdVisitor;

        impl<'de> Visitor<'de> for AssetIdVisitor {
            type Value = AssetId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer asset id")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AssetId::new(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AssetId::new(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AssetId::new(value.to_string()))
            }
        }

        deserializer.deserialize_any(AssetIdVisitor)
    }
}

/// 搜索结果中的单条资源记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: AssetId,
    pub name: String,
}

/// 资源搜索接口的响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<AssetRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_rejects_empty() {
        assert!(AssetName::new("").is_none());
        assert_eq!(AssetName::new("my-asset").unwrap().as_str(), "my-asset");
    }

    #[test]
    fn test_asset_id_from_number_and_string() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"items":[{"id":12345,"name":"foo","version":"1.0"},{"id":"abc","name":"bar"}]}"#,
        )
        .unwrap();

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].id.as_str(), "12345");
        assert_eq!(response.items[1].id, AssetId::new("abc"));
    }

    #[test]
    fn test_missing_items_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(response.items.is_empty());
    }
}
