use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// 目录树节点，仅用于打包前的诊断输出
///
/// 序列化形式：文件为字符串，目录为 `{ "目录名": [子节点...] }`，
/// 不支持的条目（符号链接、套接字等）为 `null`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryTreeNode {
    File(String),
    Directory {
        name: String,
        children: Vec<Option<DirectoryTreeNode>>,
    },
}

impl DirectoryTreeNode {
    pub fn name(&self) -> &str {
        match self {
            DirectoryTreeNode::File(name) => name,
            DirectoryTreeNode::Directory { name, .. } => name,
        }
    }

    /// 树中所有文件相对于根节点的路径（不含根节点自身名称），以 `/` 分隔
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let DirectoryTreeNode::Directory { children, .. } = self {
            for child in children.iter().flatten() {
                child.collect_paths("", &mut paths);
            }
        }
        paths
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            DirectoryTreeNode::File(name) => out.push(format!("{}{}", prefix, name)),
            DirectoryTreeNode::Directory { name, children } => {
                let prefix = format!("{}{}/", prefix, name);
                for child in children.iter().flatten() {
                    child.collect_paths(&prefix, out);
                }
            }
        }
    }
}

impl Serialize for DirectoryTreeNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DirectoryTreeNode::File(name) => serializer.serialize_str(name),
            DirectoryTreeNode::Directory { name, children } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, children)?;
                map.end()
            }
        }
    }
}
