// ==========================================
// SqlUploader 集成测试
// ==========================================
// 测试目标: 文件顺序 / 失败不中断 / 两种执行模式
// ==========================================

use async_trait::async_trait;
use restaurant_ops_import::config::{UploadConfig, UploadFile, UploadMode};
use restaurant_ops_import::logging;
use restaurant_ops_import::uploader::{SqlExecutor, SqlUploader, UploadError, UploadResult};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 记录所有请求；SQL 中含 "BROKEN" 时返回 HTTP 400
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str) -> UploadResult<String> {
        self.calls.lock().unwrap().push(sql.to_string());
        if sql.contains("BROKEN") {
            Err(UploadError::HttpStatus {
                status: 400,
                body: format!("syntax error near BROKEN {}", "x".repeat(1000)),
            })
        } else {
            Ok("[]".to_string())
        }
    }
}

fn write_sql(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config(base: &Path, files: &[&str], mode: UploadMode) -> UploadConfig {
    UploadConfig {
        base_path: base.to_path_buf(),
        mode,
        statement_delay_ms: 0,
        file_delay_ms: 0,
        files: files
            .iter()
            .map(|f| UploadFile {
                path: f.to_string(),
                description: None,
            })
            .collect(),
        ..Default::default()
    }
}

fn uploader(
    config: UploadConfig,
) -> (SqlUploader<RecordingExecutor>, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RecordingExecutor {
        calls: calls.clone(),
    };
    (SqlUploader::new(executor, Arc::new(config)), calls)
}

#[tokio::test]
async fn test_statements_mode_preserves_order() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    write_sql(
        dir.path(),
        "schema/core.sql",
        "-- 核心表\nCREATE TABLE store (id int);\nCREATE TABLE product (id int);\n",
    );
    write_sql(
        dir.path(),
        "functions/touch.sql",
        "CREATE FUNCTION touch() RETURNS trigger AS $$\nBEGIN\n  RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;\n",
    );

    let cfg = config(
        dir.path(),
        &["schema/core.sql", "functions/touch.sql", "data/missing.sql"],
        UploadMode::Statements,
    );
    let extension_count = cfg.extensions.len();
    let (uploader, calls) = uploader(cfg);

    let summary = uploader.upload_all(true).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), extension_count + 3);
    assert!(calls[0].starts_with("CREATE EXTENSION"));
    assert_eq!(calls[extension_count], "CREATE TABLE store (id int);");
    assert_eq!(calls[extension_count + 1], "CREATE TABLE product (id int);");
    assert!(calls[extension_count + 2].contains("RETURN NEW;"));

    assert_eq!(summary.extensions_succeeded, extension_count);
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.statements_succeeded(), 3);
    assert_eq!(summary.missing_files.len(), 1);
    assert!(summary.missing_files[0].ends_with("missing.sql"));
    assert_eq!(summary.succeeded_files().len(), 2);
    assert_eq!(summary.failed_files().len(), 1);
}

#[tokio::test]
async fn test_failures_do_not_stop_upload() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let mut broken = String::new();
    for i in 0..5 {
        broken.push_str(&format!("INSERT INTO t VALUES ({i}) BROKEN;\n"));
    }
    broken.push_str("INSERT INTO t VALUES (99);\n");
    write_sql(dir.path(), "data/a.sql", &broken);
    write_sql(dir.path(), "data/b.sql", "SELECT 1;\n");

    let cfg = config(dir.path(), &["data/a.sql", "data/b.sql"], UploadMode::Statements);
    let preview_chars = cfg.statement_error_preview_chars;
    let max_previews = cfg.max_error_previews;
    let (uploader, calls) = uploader(cfg);

    let summary = uploader.upload_all(false).await;

    assert_eq!(calls.lock().unwrap().len(), 7);
    let first = &summary.files[0];
    assert_eq!(first.statements, 6);
    assert_eq!(first.failed, 5);
    assert_eq!(first.succeeded, 1);
    assert!(!first.is_success());
    assert_eq!(first.error_previews.len(), max_previews);
    assert!(first
        .error_previews
        .iter()
        .all(|p| p.chars().count() <= preview_chars));

    assert!(summary.files[1].is_success());
    assert_eq!(summary.statements_failed(), 5);
}

#[tokio::test]
async fn test_whole_file_mode_sends_one_request_per_file() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let content = "CREATE TABLE a (id int);\nCREATE TABLE b (id int);\n";
    write_sql(dir.path(), "schema/a.sql", content);
    write_sql(dir.path(), "schema/b.sql", "BROKEN;\n");

    let cfg = config(dir.path(), &["schema/a.sql", "schema/b.sql"], UploadMode::WholeFile);
    let preview_chars = cfg.file_error_preview_chars;
    let (uploader, calls) = uploader(cfg);

    let summary = uploader.upload_all(false).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], content);
    assert!(summary.files[0].is_success());
    assert!(!summary.files[1].is_success());
    assert_eq!(
        summary.files[1].error_previews[0].chars().count(),
        preview_chars
    );
}

#[tokio::test]
async fn test_explicit_paths_skip_extensions() {
    let dir = TempDir::new().unwrap();
    write_sql(dir.path(), "only.sql", "SELECT 1;\nSELECT 2;\n");

    let cfg = config(dir.path(), &[], UploadMode::Statements);
    let (uploader, calls) = uploader(cfg);

    let summary = uploader
        .upload_paths(&[dir.path().join("only.sql")])
        .await;

    assert_eq!(*calls.lock().unwrap(), vec!["SELECT 1;", "SELECT 2;"]);
    assert_eq!(summary.extensions_succeeded, 0);
    assert_eq!(summary.statements_succeeded(), 2);
}
