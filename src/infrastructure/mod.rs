pub mod browser_cache;
pub mod fs_walk;

pub use browser_cache::{BrowserCache, LocalBrowserCache};
