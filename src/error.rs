use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 资源 ID 解析错误
    #[error("资源解析错误: {0}")]
    Resolve(#[from] ResolveError),
    /// 浏览器运行时准备错误
    #[error("运行时准备错误: {0}")]
    Provision(#[from] ProvisionError),
    /// 打包错误
    #[error("打包错误: {0}")]
    Archive(#[from] ArchiveError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// 资源 ID 解析错误
#[derive(Debug, Error)]
pub enum ResolveError {
    /// 网络请求失败
    #[error("资源搜索请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 目录服务返回非成功状态码
    #[error("资源搜索返回错误状态 ({endpoint}): {status}")]
    BadStatus {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    /// 响应 JSON 解析失败
    #[error("资源搜索响应解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: serde_json::Error,
    },
    /// 搜索结果为空
    #[error("未找到资源 \"{name}\" 的 ID，详细信息见调试日志")]
    NotFound { name: String },
    /// 搜索结果中没有完全匹配的名称
    #[error("未找到与 \"{name}\" 完全匹配的资源 (候选 {candidates} 个)，详细信息见调试日志")]
    NoExactMatch { name: String, candidates: usize },
    /// 多条记录的名称完全相同
    #[error("资源 \"{name}\" 存在多个完全匹配的记录: {ids:?}")]
    AmbiguousMatch { name: String, ids: Vec<String> },
}

impl ResolveError {
    /// 搜索结果为空或没有完全匹配时返回 true
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::NotFound { .. } | ResolveError::NoExactMatch { .. }
        )
    }
}

/// 浏览器运行时准备错误
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// 读取缓存目录失败
    #[error("读取浏览器缓存目录失败 ({}): {source}", .path.display())]
    CacheReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 下载失败
    #[error("下载浏览器失败 ({url}): {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 下载服务器返回非成功状态码
    #[error("下载浏览器失败 ({url}): HTTP {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    /// 写入文件失败
    #[error("写入浏览器文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 解压失败
    #[error("解压浏览器压缩包失败 ({}): {source}", .path.display())]
    ExtractFailed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    /// 当前平台不受支持
    #[error("当前平台不支持安装浏览器: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },
    /// 后台任务异常退出
    #[error("安装任务异常退出: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// 打包错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 打包根目录不存在或不是目录
    #[error("打包目录不存在: {}", .path.display())]
    RootNotFound { path: PathBuf },
    /// 打包根名称不合法
    #[error("打包根名称不合法: \"{name}\"")]
    InvalidRootName { name: String },
    /// 读取文件或目录失败
    #[error("读取失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入压缩包失败
    #[error("写入压缩包失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// zip 写入器错误
    #[error("zip 写入失败 ({}): {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    /// 后台任务异常退出
    #[error("打包任务异常退出: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

// ========== 便捷构造函数 ==========

impl ArchiveError {
    pub(crate) fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

impl ProvisionError {
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvisionError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_covers_both_kinds() {
        let empty = ResolveError::NotFound {
            name: "foo".to_string(),
        };
        let inexact = ResolveError::NoExactMatch {
            name: "foo".to_string(),
            candidates: 2,
        };
        let ambiguous = ResolveError::AmbiguousMatch {
            name: "foo".to_string(),
            ids: vec!["1".to_string(), "2".to_string()],
        };

        assert!(empty.is_not_found());
        assert!(inexact.is_not_found());
        assert!(!ambiguous.is_not_found());
    }

    #[test]
    fn test_app_error_wraps_config_error() {
        let err: AppError = ConfigError::EnvVarNotFound {
            var_name: "GITHUB_WORKSPACE".to_string(),
        }
        .into();

        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("GITHUB_WORKSPACE"));
    }
}
