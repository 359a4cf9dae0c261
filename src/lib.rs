//! # Asset Publish
//!
//! 在 CI 中把工作区打包成压缩包，并解析它在资源目录中的 ID
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有本地资源，只暴露能力
//! - `LocalBrowserCache` - 浏览器安装缓存（查询 / 安装）
//! - `fs_walk` - 两次目录遍历共用的条目分类规则
//!
//! ### ② 客户端层（Clients）
//! - `CatalogClient` - 资源目录搜索接口
//!
//! ### ③ 业务能力层（Services）
//! - `RuntimeProvisioner` - 确保固定版本的浏览器已安装，本地环境跳过
//! - `AssetResolver` - 模糊搜索 + 完全匹配解析资源 ID
//! - `WorkspaceArchiver` - 流式打包目录树
//! - `build_tree` - 打包前的目录树诊断
//! - `Cleanup` - 尽力删除临时文件，从不失败
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 准备浏览器 → 解析 ID → 打包 → 清理
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{require_env, Config};
pub use error::{AppError, AppResult, ArchiveError, ConfigError, ProvisionError, ResolveError};
pub use models::{AssetId, AssetName};
pub use orchestrator::{Pipeline, PipelineReport};
pub use services::{
    archive_workspace, AssetResolver, Cleanup, RuntimeProvisioner, WorkspaceArchiver,
};
pub use utils::logging;
