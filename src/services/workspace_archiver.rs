//! 工作区打包服务 - 业务能力层
//!
//! 把目录树逐个文件流式写入 zip，压缩包内所有条目都位于同一个根目录下

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::{require_env, WORKSPACE_ENV};
use crate::error::{AppResult, ArchiveError};
use crate::infrastructure::fs_walk::{sorted_children, EntryKind};
use crate::services::manifest::describe_tree;

/// Deflate 压缩级别（最高）
const COMPRESSION_LEVEL: i32 = 9;

/// 压缩包中的一个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 源文件路径
    pub source: PathBuf,
    /// 压缩包内路径，始终以 `<根名称>/` 开头
    pub archive_path: String,
    /// 是否压缩（目前所有条目都压缩）
    pub compress: bool,
}

/// 工作区打包服务
///
/// 职责：
/// - 深度优先遍历目录，只收录普通文件
/// - 逐个文件流式写入，不在内存中缓存整棵树
/// - 返回前确保 zip 已 finish 并落盘
pub struct WorkspaceArchiver {
    output_dir: PathBuf,
}

impl WorkspaceArchiver {
    /// 压缩包写入 `output_dir/<根名称>.zip`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 打包目录
    ///
    /// # 参数
    /// - `root_path`: 要打包的目录
    /// - `archive_root_name`: 压缩包内的根目录名，同时决定文件名
    ///
    /// # 返回
    /// 返回压缩包的绝对路径
    pub async fn archive(
        &self,
        root_path: &Path,
        archive_root_name: &str,
    ) -> Result<PathBuf, ArchiveError> {
        validate_root_name(archive_root_name)?;

        let root = std::fs::canonicalize(root_path)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| ArchiveError::RootNotFound {
                path: root_path.to_path_buf(),
            })?;
        let output_dir = std::fs::canonicalize(&self.output_dir)
            .map_err(|e| ArchiveError::write_failed(&self.output_dir, e))?;
        let output_path = output_dir.join(format!("{}.zip", archive_root_name));

        debug!("正在打包: {} -> {}", root.display(), output_path.display());

        // 诊断输出失败不影响打包
        match describe_tree(root.clone(), Some(output_path.clone())).await {
            Ok(tree) => debug!("压缩包内容: {}", tree),
            Err(e) => warn!("无法生成目录树: {}", e),
        }

        let count = {
            let root = root.clone();
            let output_path = output_path.clone();
            let root_name = archive_root_name.to_string();
            tokio::task::spawn_blocking(move || write_archive(&root, &root_name, &output_path))
                .await??
        };

        info!("✓ 打包完成: {} 个文件 -> {}", count, output_path.display());
        Ok(output_path)
    }
}

/// 打包工作区（根目录取自 `GITHUB_WORKSPACE`），输出到当前目录
pub async fn archive_workspace(asset_name: &str) -> AppResult<PathBuf> {
    let workspace = PathBuf::from(require_env(WORKSPACE_ENV)?);
    let cwd = std::env::current_dir().map_err(|e| ArchiveError::write_failed(".", e))?;
    Ok(WorkspaceArchiver::new(cwd)
        .archive(&workspace, asset_name)
        .await?)
}

/// 根名称只能是单个路径段
fn validate_root_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ArchiveError::InvalidRootName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// 遍历目录，对每个普通文件调用 `visit`
///
/// `exclude` 指向的文件会被跳过（压缩包本身位于被打包目录内时）
pub fn visit_entries<F>(
    root: &Path,
    archive_root_name: &str,
    exclude: Option<&Path>,
    visit: &mut F,
) -> Result<(), ArchiveError>
where
    F: FnMut(ArchiveEntry) -> Result<(), ArchiveError>,
{
    visit_dir(root, archive_root_name, exclude, visit)
}

fn visit_dir<F>(
    dir: &Path,
    prefix: &str,
    exclude: Option<&Path>,
    visit: &mut F,
) -> Result<(), ArchiveError>
where
    F: FnMut(ArchiveEntry) -> Result<(), ArchiveError>,
{
    let children = sorted_children(dir).map_err(|e| ArchiveError::read_failed(dir, e))?;

    for child in children {
        let name = child
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ArchiveError::read_failed(
                    &child,
                    io::Error::new(io::ErrorKind::InvalidData, "文件名不是合法的 UTF-8"),
                )
            })?;
        let archive_path = format!("{}/{}", prefix, name);

        match EntryKind::of(&child).map_err(|e| ArchiveError::read_failed(&child, e))? {
            EntryKind::Directory => visit_dir(&child, &archive_path, exclude, visit)?,
            EntryKind::File => {
                if exclude == Some(child.as_path()) {
                    debug!("跳过压缩包自身: {}", child.display());
                    continue;
                }
                visit(ArchiveEntry {
                    source: child,
                    archive_path,
                    compress: true,
                })?;
            }
            EntryKind::Unsupported => debug!("跳过不支持的条目: {}", child.display()),
        }
    }

    Ok(())
}

/// 写入整个压缩包，返回写入的文件数
fn write_archive(
    root: &Path,
    archive_root_name: &str,
    output_path: &Path,
) -> Result<usize, ArchiveError> {
    let file = File::create(output_path).map_err(|e| ArchiveError::write_failed(output_path, e))?;
    let mut zip = ZipWriter::new(file);
    let mut count = 0usize;

    visit_entries(root, archive_root_name, Some(output_path), &mut |entry| {
        add_entry(&mut zip, &entry, output_path)?;
        count += 1;
        Ok(())
    })?;

    let mut file = zip.finish().map_err(|source| ArchiveError::Zip {
        path: output_path.to_path_buf(),
        source,
    })?;
    file.flush()
        .and_then(|_| file.sync_all())
        .map_err(|e| ArchiveError::write_failed(output_path, e))?;

    Ok(count)
}

fn add_entry(
    zip: &mut ZipWriter<File>,
    entry: &ArchiveEntry,
    output_path: &Path,
) -> Result<(), ArchiveError> {
    let mut source =
        File::open(&entry.source).map_err(|e| ArchiveError::read_failed(&entry.source, e))?;
    let metadata = source
        .metadata()
        .map_err(|e| ArchiveError::read_failed(&entry.source, e))?;

    let mut options = FileOptions::default().large_file(metadata.len() >= u32::MAX as u64);
    options = if entry.compress {
        options
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
    } else {
        options.compression_method(CompressionMethod::Stored)
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    zip.start_file(entry.archive_path.as_str(), options)
        .map_err(|source| ArchiveError::Zip {
            path: output_path.to_path_buf(),
            source,
        })?;
    io::copy(&mut source, zip).map_err(|e| ArchiveError::read_failed(&entry.source, e))?;

    debug!("已添加: {}", entry.archive_path);
    Ok(())
}
