use anyhow::Result;
use asset_publish::{logging, Config, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 运行流水线
    let report = Pipeline::from_config(config).run().await?;

    logging::print_final_summary(
        report.asset_id.as_str(),
        &report.archive_path.display().to_string(),
        report.cleaned,
    );

    Ok(())
}
