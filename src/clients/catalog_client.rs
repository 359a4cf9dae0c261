/// 资源目录 API 客户端
///
/// 封装所有与资源目录服务相关的 HTTP 调用
use crate::config::Config;
use crate::error::ResolveError;
use crate::models::{AssetId, AssetName, SearchResponse};
use crate::utils::logging::truncate_text;
use reqwest::header::COOKIE;
use tracing::debug;

/// 目录服务接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEndpoint {
    /// 当前用户的资源列表（支持搜索）
    Assets,
    /// 单个资源
    Asset,
}

impl CatalogEndpoint {
    fn template(&self) -> &'static str {
        match self {
            CatalogEndpoint::Assets => "/v1/me/assets",
            CatalogEndpoint::Asset => "/v1/me/assets/{id}",
        }
    }

    /// 拼接完整地址，`{id}` 会被替换为资源 ID
    pub fn url(&self, base_url: &str, id: Option<&AssetId>) -> String {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.template());
        match id {
            Some(id) => url.replace("{id}", id.as_str()),
            None => url,
        }
    }
}

/// 一次搜索的结果，保留原始响应体以便排查问题
#[derive(Debug, Clone)]
pub struct CatalogSearch {
    pub raw: String,
    pub response: SearchResponse,
}

/// 资源目录客户端
pub struct CatalogClient {
    base_url: String,
    client: reqwest::Client,
}

impl CatalogClient {
    /// 创建新的目录客户端
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.catalog_api_base_url.clone())
    }

    /// 按名称搜索资源
    ///
    /// # 参数
    /// - `name`: 资源名称，作为模糊搜索关键字
    /// - `cookies`: 原样放入 `Cookie` 请求头
    ///
    /// # 返回
    /// 返回按名称升序排列的候选记录，以及原始响应体
    pub async fn search_assets(
        &self,
        name: &AssetName,
        cookies: &str,
    ) -> Result<CatalogSearch, ResolveError> {
        let endpoint = CatalogEndpoint::Assets.url(&self.base_url, None);
        debug!("搜索资源: {} ({})", name, endpoint);

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("search", name.as_str()),
                ("sort", "asset.name"),
                ("direction", "asc"),
            ])
            .header(COOKIE, cookies)
            .send()
            .await
            .map_err(|source| ResolveError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|source| ResolveError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            debug!("资源搜索返回 {}: {}", status, truncate_text(&raw, 2000));
            return Err(ResolveError::BadStatus { endpoint, status });
        }

        let response: SearchResponse = serde_json::from_str(&raw).map_err(|source| {
            debug!("无法解析资源搜索响应: {}", truncate_text(&raw, 2000));
            ResolveError::JsonParseFailed { source }
        })?;

        Ok(CatalogSearch { raw, response })
    }
}
