use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::browser;
use crate::clients::CatalogClient;
use crate::config::Config;
use crate::error::ConfigError;
use crate::infrastructure::{BrowserCache, LocalBrowserCache};
use crate::models::{AssetId, AssetName};
use crate::services::{
    AssetResolver, Cleanup, ProvisionOutcome, RuntimeProvisioner, WorkspaceArchiver,
};
use crate::utils::logging::{log_step, log_startup};

const TOTAL_STEPS: usize = 4;

/// 一次流水线运行的结果
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub provision: ProvisionOutcome,
    pub asset_id: AssetId,
    pub archive_path: PathBuf,
    /// 尝试清理的路径数量
    pub cleaned: usize,
}

/// 发布流水线
///
/// 按顺序执行：准备浏览器 → 解析资源 ID → 打包工作区 → 清理，
/// 每一步的失败都会终止后续步骤（清理除外，它从不失败）
pub struct Pipeline<C> {
    config: Config,
    provisioner: RuntimeProvisioner<C>,
    resolver: AssetResolver,
    archiver: WorkspaceArchiver,
    cleanup: Cleanup,
}

impl Pipeline<LocalBrowserCache> {
    /// 使用本地浏览器缓存创建流水线
    pub fn from_config(config: Config) -> Self {
        let cache = LocalBrowserCache::from_config(&config);
        Self::new(config, cache)
    }
}

impl<C: BrowserCache> Pipeline<C> {
    pub fn new(config: Config, cache: C) -> Self {
        Self {
            provisioner: RuntimeProvisioner::from_config(&config, cache),
            resolver: AssetResolver::new(CatalogClient::from_config(&config)),
            archiver: WorkspaceArchiver::new(config.archive_output_dir.clone()),
            cleanup: Cleanup::new(config.workspace_root.clone()),
            config,
        }
    }

    /// 运行整个流水线
    pub async fn run(&self) -> Result<PipelineReport> {
        let asset_name = AssetName::new(self.config.asset_name.clone()).ok_or_else(|| {
            ConfigError::InvalidValue {
                name: "ASSET_NAME".to_string(),
                reason: "不能为空".to_string(),
            }
        })?;

        log_startup(asset_name.as_str(), self.config.in_ci);

        log_step(1, TOTAL_STEPS, "准备浏览器运行时");
        let provision = self.provisioner.ensure_runtime().await?;
        if self.config.verify_browser_runtime {
            match provision.executable_path() {
                Some(executable) => {
                    browser::verify_runtime(&executable).await?;
                }
                None => debug!("未准备浏览器，跳过冒烟检查"),
            }
        }

        log_step(2, TOTAL_STEPS, "解析资源 ID");
        let asset_id = self
            .resolver
            .resolve_asset_id(&asset_name, &self.config.cookies)
            .await?;
        info!("✓ 资源 ID: {}", asset_id);

        log_step(3, TOTAL_STEPS, "打包工作区");
        let archive_path = self
            .archiver
            .archive(&self.config.workspace_root, asset_name.as_str())
            .await?;

        if let Some(output) = &self.config.github_output {
            write_step_outputs(output, &asset_id, &archive_path)
                .await
                .with_context(|| format!("写入步骤输出失败: {}", output.display()))?;
        }

        log_step(4, TOTAL_STEPS, "清理临时文件");
        for path in &self.config.cleanup_paths {
            self.cleanup.remove_if_present(path).await;
        }
        if self.config.cleanup_paths.is_empty() {
            debug!("没有需要清理的路径");
        }

        Ok(PipelineReport {
            provision,
            asset_id,
            archive_path,
            cleaned: self.config.cleanup_paths.len(),
        })
    }
}

/// 追加 `asset_id` 与 `archive_path` 到 CI 步骤输出文件
async fn write_step_outputs(output: &Path, asset_id: &AssetId, archive_path: &Path) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .await?;

    let content = format!(
        "asset_id={}\narchive_path={}\n",
        asset_id,
        archive_path.display()
    );
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
