use asset_publish::config::Config;
use asset_publish::infrastructure::LocalBrowserCache;
use asset_publish::models::Platform;
use asset_publish::services::ProvisionOutcome;
use asset_publish::{archive_workspace, logging, AppError, Pipeline, ResolveError};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 准备一个工作区：a.txt, sub/b.txt, sub/sub2/c.txt 以及需要清理的 .git
fn prepare_workspace(root: &Path) {
    fs::create_dir_all(root.join("sub/sub2")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("a.txt"), b"alpha").unwrap();
    fs::write(root.join("sub/b.txt"), b"bravo").unwrap();
    fs::write(root.join("sub/sub2/c.txt"), b"charlie").unwrap();
    fs::write(root.join(".git/HEAD"), b"ref: refs/heads/main").unwrap();
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

fn test_config(workspace: &Path, output: &Path, catalog: &str) -> Config {
    Config {
        workspace_root: workspace.to_path_buf(),
        asset_name: "myasset".to_string(),
        cookies: "session=abc".to_string(),
        catalog_api_base_url: catalog.to_string(),
        archive_output_dir: output.to_path_buf(),
        cleanup_paths: vec![".git".to_string(), "missing.tmp".to_string()],
        github_output: Some(output.join("github_output")),
        ..Config::default()
    }
}

async fn mount_catalog(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/me/assets"))
        .and(query_param("search", "myasset"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pipeline_local_end_to_end() {
    logging::init(true);

    let server = MockServer::start().await;
    mount_catalog(
        &server,
        r#"{"items":[{"id":11,"name":"myasset-legacy"},{"id":12,"name":"myasset"}]}"#,
    )
    .await;

    let workspace = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    prepare_workspace(workspace.path());

    let config = test_config(workspace.path(), output.path(), &server.uri());
    let report = Pipeline::from_config(config).run().await.unwrap();

    assert_eq!(report.provision, ProvisionOutcome::Skipped);
    assert_eq!(report.asset_id.as_str(), "12");
    assert_eq!(report.cleaned, 2);

    // .git 在打包之后才被清理，所以仍在压缩包中
    assert_eq!(
        zip_names(&report.archive_path),
        vec![
            "myasset/.git/HEAD",
            "myasset/a.txt",
            "myasset/sub/b.txt",
            "myasset/sub/sub2/c.txt",
        ]
    );
    assert!(!workspace.path().join(".git").exists());
    assert!(workspace.path().join("a.txt").exists());

    let outputs = fs::read_to_string(output.path().join("github_output")).unwrap();
    assert!(outputs.contains("asset_id=12\n"));
    assert!(outputs.contains("archive_path="));
}

#[tokio::test]
async fn test_pipeline_stops_when_asset_not_found() {
    let server = MockServer::start().await;
    mount_catalog(&server, r#"{"items":[{"id":11,"name":"myasset-legacy"}]}"#).await;

    let workspace = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    prepare_workspace(workspace.path());

    let config = test_config(workspace.path(), output.path(), &server.uri());
    let err = Pipeline::from_config(config).run().await.unwrap_err();

    let resolve = err
        .downcast_ref::<ResolveError>()
        .expect("应当是资源解析错误");
    assert!(resolve.is_not_found());

    // 后续步骤不执行
    assert!(!output.path().join("myasset.zip").exists());
    assert!(workspace.path().join(".git").exists());
}

#[tokio::test]
async fn test_pipeline_ci_reuses_installed_browser() {
    let server = MockServer::start().await;
    mount_catalog(&server, r#"{"items":[{"id":"abc","name":"myasset"}]}"#).await;

    let workspace = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    prepare_workspace(workspace.path());
    fs::create_dir_all(cache_dir.path().join("chrome/linux-131.0.6778.108")).unwrap();

    let config = Config {
        in_ci: true,
        browser_cache_dir: cache_dir.path().to_path_buf(),
        // 已安装时不应访问下载服务器
        browser_download_base_url: "http://127.0.0.1:9".to_string(),
        ..test_config(workspace.path(), output.path(), &server.uri())
    };
    let cache = LocalBrowserCache::from_config(&config).with_platform(Platform::Linux);
    let report = Pipeline::new(config, cache).run().await.unwrap();

    match report.provision {
        ProvisionOutcome::AlreadyInstalled(entry) => {
            assert_eq!(entry.build_id, "131.0.6778.108");
        }
        other => panic!("应当复用已安装的浏览器，实际: {:?}", other),
    }
    assert_eq!(report.asset_id.as_str(), "abc");
}

#[tokio::test]
async fn test_archive_workspace_requires_env_before_io() {
    std::env::remove_var("GITHUB_WORKSPACE");

    let result = archive_workspace("never-written").await;

    assert!(matches!(result, Err(AppError::Config(_))));
    assert!(!Path::new("never-written.zip").exists());
}

#[tokio::test]
async fn test_archive_round_trip_bytes() {
    let workspace = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    prepare_workspace(workspace.path());

    let archiver = asset_publish::WorkspaceArchiver::new(output.path());
    let zip_path = assert_ok!(archiver.archive(workspace.path(), "bundle").await);

    let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let mut content = String::new();
    archive
        .by_name("bundle/sub/sub2/c.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "charlie");

    assert_err!(archiver.archive(&workspace.path().join("nope"), "bundle").await);
}
