//! 目录树诊断
//!
//! 只用于打包前输出日志，对压缩包本身没有任何影响

use std::io;
use std::path::{Path, PathBuf};

use crate::infrastructure::fs_walk::{display_name, sorted_children, EntryKind};
use crate::models::DirectoryTreeNode;

/// 递归描述目录树
///
/// 不支持的条目（符号链接等）返回 `None`
pub fn build_tree(path: &Path) -> io::Result<Option<DirectoryTreeNode>> {
    build_tree_excluding(path, None)
}

/// 同 [`build_tree`]，但完全省略 `exclude` 指向的文件
///
/// 与打包时跳过压缩包自身的规则一致，保证两次遍历的成员相同
pub fn build_tree_excluding(
    path: &Path,
    exclude: Option<&Path>,
) -> io::Result<Option<DirectoryTreeNode>> {
    match EntryKind::of(path)? {
        EntryKind::File => Ok(Some(DirectoryTreeNode::File(display_name(path)))),
        EntryKind::Directory => {
            let children = sorted_children(path)?
                .iter()
                .filter(|child| exclude != Some(child.as_path()))
                .map(|child| build_tree_excluding(child, exclude))
                .collect::<io::Result<Vec<_>>>()?;
            Ok(Some(DirectoryTreeNode::Directory {
                name: display_name(path),
                children,
            }))
        }
        EntryKind::Unsupported => Ok(None),
    }
}

/// 在阻塞线程池中构建目录树并格式化为 JSON
pub async fn describe_tree(path: PathBuf, exclude: Option<PathBuf>) -> anyhow::Result<String> {
    let tree = tokio::task::spawn_blocking(move || build_tree_excluding(&path, exclude.as_deref()))
        .await??;
    Ok(serde_json::to_string_pretty(&tree)?)
}
