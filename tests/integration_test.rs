use asset_publish::browser::verify_runtime;
use asset_publish::clients::CatalogClient;
use asset_publish::config::Config;
use asset_publish::infrastructure::LocalBrowserCache;
use asset_publish::logging;
use asset_publish::models::AssetName;
use asset_publish::services::{PinnedBuild, RuntimeContext, RuntimeProvisioner};
use asset_publish::AssetResolver;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_resolve_real_asset() {
    // 初始化日志
    logging::init(true);

    // 需要 ASSET_NAME 与 CATALOG_COOKIES
    let config = Config {
        asset_name: std::env::var("ASSET_NAME").expect("需要设置 ASSET_NAME"),
        cookies: std::env::var("CATALOG_COOKIES").expect("需要设置 CATALOG_COOKIES"),
        ..Config::default()
    };

    let resolver = AssetResolver::new(CatalogClient::from_config(&config));
    let name = AssetName::new(config.asset_name.clone()).expect("资源名称不能为空");

    let id = resolver
        .resolve_asset_id(&name, &config.cookies)
        .await
        .expect("解析资源 ID 失败");

    println!("资源 {} 的 ID: {}", name, id);
}

#[tokio::test]
#[ignore]
async fn test_provision_and_launch_browser() {
    // 初始化日志
    logging::init(true);

    let cache_dir = tempfile::tempdir().unwrap();
    let config = Config {
        browser_cache_dir: cache_dir.path().to_path_buf(),
        ..Config::default()
    };

    let provisioner = RuntimeProvisioner::new(
        RuntimeContext::Ci,
        LocalBrowserCache::from_config(&config),
        PinnedBuild::chrome(config.chrome_build_id.clone()),
    );

    let first = provisioner.ensure_runtime().await.expect("安装浏览器失败");
    let executable = first.executable_path().expect("应当有可执行文件");
    assert!(executable.is_file(), "可执行文件应当存在");

    let product = verify_runtime(&executable).await.expect("浏览器无法启动");
    assert!(product.contains("131.0.6778.108"));
}
