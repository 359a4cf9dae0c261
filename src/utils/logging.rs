/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 设置了 `RUST_LOG` 时以其为准，否则详细模式为 debug，默认为 info。
/// 重复调用不会报错（测试中常见）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("asset_publish={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `asset_name`: 资源名称
/// - `in_ci`: 是否运行在 CI 中
pub fn log_startup(asset_name: &str, in_ci: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始发布资源: {}", asset_name);
    info!("🖥️ 运行环境: {}", if in_ci { "CI" } else { "本地" });
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录步骤开始信息
///
/// # 参数
/// - `step`: 步骤编号
/// - `total`: 步骤总数
/// - `title`: 步骤名称
pub fn log_step(step: usize, total: usize, title: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 [{}/{}] {}", step, total, title);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `asset_id`: 解析出的资源 ID
/// - `archive_path`: 压缩包路径
/// - `cleaned`: 清理的路径数量
pub fn print_final_summary(asset_id: &str, archive_path: &str, cleaned: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 发布准备完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🆔 资源 ID: {}", asset_id);
    info!("🗜️ 压缩包: {}", archive_path);
    info!("🧹 清理路径: {} 个", cleaned);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
