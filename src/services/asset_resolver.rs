//! 资源 ID 解析服务 - 业务能力层
//!
//! 目录服务的搜索是子串匹配，这里只把它当作候选集，
//! 真正的结果必须与请求名称逐字节完全一致

use tracing::debug;

use crate::clients::CatalogClient;
use crate::error::ResolveError;
use crate::models::{AssetId, AssetName, SearchResponse};

/// 资源 ID 解析服务
pub struct AssetResolver {
    client: CatalogClient,
}

impl AssetResolver {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// 解析资源 ID
    ///
    /// # 参数
    /// - `name`: 资源名称
    /// - `cookies`: 目录服务的认证 Cookie
    ///
    /// # 返回
    /// 返回唯一完全匹配的资源 ID；没有候选、没有完全匹配或存在多个完全匹配时返回错误
    pub async fn resolve_asset_id(
        &self,
        name: &AssetName,
        cookies: &str,
    ) -> Result<AssetId, ResolveError> {
        debug!("正在查找资源 {} 的 ID...", name);

        let search = self.client.search_assets(name, cookies).await?;

        match pick_exact_match(name, &search.response) {
            Ok(id) => {
                debug!("找到资源 ID: {}", id);
                Ok(id)
            }
            Err(e) => {
                debug!("{}", search.raw);
                Err(e)
            }
        }
    }
}

/// 按目录顺序挑出名称完全一致的记录
pub fn pick_exact_match(
    name: &AssetName,
    response: &SearchResponse,
) -> Result<AssetId, ResolveError> {
    if response.items.is_empty() {
        return Err(ResolveError::NotFound {
            name: name.to_string(),
        });
    }

    let mut matches = response
        .items
        .iter()
        .filter(|record| record.name == name.as_str())
        .map(|record| record.id.clone());

    let first = matches.next().ok_or_else(|| ResolveError::NoExactMatch {
        name: name.to_string(),
        candidates: response.items.len(),
    })?;

    let rest: Vec<AssetId> = matches.collect();
    if !rest.is_empty() {
        let ids = std::iter::once(first)
            .chain(rest)
            .map(AssetId::into_string)
            .collect();
        return Err(ResolveError::AmbiguousMatch {
            name: name.to_string(),
            ids,
        });
    }

    Ok(first)
}
