use std::path::Path;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Handler};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 使用已准备好的可执行文件启动无头浏览器
///
/// 返回浏览器以及后台事件循环的任务句柄
pub async fn launch_headless_browser(executable: &Path) -> Result<(Browser, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");
    debug!("可执行文件: {}", executable.display());

    let config = BrowserConfig::builder()
        .new_headless_mode()
        .chrome_executable(executable)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",             // CI 容器内没有可用的沙盒
            "--disable-dev-shm-usage",  // 防止共享内存不足
        ])
        .build()
        .map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            anyhow::anyhow!("配置无头浏览器失败: {}", e)
        })?;

    let (browser, handler) = Browser::launch(config)
        .await
        .with_context(|| format!("启动无头浏览器失败: {}", executable.display()))?;
    debug!("无头浏览器启动成功");

    Ok((browser, spawn_handler(handler)))
}

/// 在后台处理浏览器事件
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// 冒烟检查：启动浏览器、读取版本号后关闭
///
/// # 返回
/// 返回浏览器的产品版本，例如 `HeadlessChrome/131.0.6778.108`
pub async fn verify_runtime(executable: &Path) -> Result<String> {
    let (mut browser, handler_task) = launch_headless_browser(executable).await?;

    let version = browser
        .version()
        .await
        .context("读取浏览器版本失败")?;
    info!("✓ 浏览器可用: {}", version.product);

    browser.close().await.context("关闭浏览器失败")?;
    let _ = browser.wait().await;
    handler_task.abort();

    Ok(version.product)
}
