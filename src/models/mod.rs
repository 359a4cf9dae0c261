pub mod asset;
pub mod cache;
pub mod tree;

pub use asset::{AssetId, AssetName, AssetRecord, SearchResponse};
pub use cache::{BrowserKind, CacheEntry, Platform};
pub use tree::DirectoryTreeNode;
