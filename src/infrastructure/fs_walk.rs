//! 目录遍历 - 基础设施层
//!
//! 诊断目录树和打包使用同一套条目分类与排序规则，保证两次遍历得到的文件集合一致

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 目录条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// 符号链接、套接字、设备文件等，不参与打包
    Unsupported,
}

impl EntryKind {
    /// 判断路径的条目类型，不跟随符号链接
    pub fn of(path: &Path) -> io::Result<Self> {
        let file_type = fs::symlink_metadata(path)?.file_type();
        Ok(if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Unsupported
        })
    }
}

/// 列出目录的直接子项，按文件名排序
pub fn sorted_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}

/// 路径的最后一段，用于日志与目录树
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"a").unwrap();

        assert_eq!(EntryKind::of(dir.path()).unwrap(), EntryKind::Directory);
        assert_eq!(EntryKind::of(&file).unwrap(), EntryKind::File);
        assert!(EntryKind::of(&dir.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        assert_eq!(EntryKind::of(&link).unwrap(), EntryKind::Unsupported);
    }

    #[test]
    fn test_sorted_children() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let names: Vec<String> = sorted_children(dir.path())
            .unwrap()
            .iter()
            .map(|p| display_name(p))
            .collect();
        assert_eq!(names, vec!["a.txt", "b", "c.txt"]);
    }
}
