//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 按顺序调度各个能力，是整个流水线的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (准备浏览器 → 解析资源 ID → 打包 → 清理)
//!     ↓
//! services (能力层：provisioner / resolver / archiver / cleanup)
//!     ↓
//! clients + infrastructure (目录 API、浏览器缓存、目录遍历)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → services → clients / infrastructure
//! 2. **无业务逻辑**：只做调度和汇总，不做具体匹配或打包判断

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineReport};
