// ==========================================
// PlatformImporter 集成测试
// ==========================================
// 测试目标: xlsx → platform_daily_metrics 的完整流程
// ==========================================

mod test_helpers;

use restaurant_ops_import::config::{ImportConfig, PlatformFile};
use restaurant_ops_import::domain::{CleanValue, MetricKey};
use restaurant_ops_import::importer::{ImportError, PlatformImporter};
use restaurant_ops_import::logging;
use restaurant_ops_import::repository::{PlatformMetricsRepository, PlatformMetricsRepositoryImpl};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_helpers::{create_test_db, write_platform_file, Cell, PlatformRow};

const SHIMAO: &str = "宁桂杏山野烤肉（世贸店）";
const DEYANG: &str = "野百灵贵州酸汤火锅（德阳店）";

fn create_importer(
    conn: Arc<Mutex<Connection>>,
) -> PlatformImporter<PlatformMetricsRepositoryImpl> {
    PlatformImporter::new(
        PlatformMetricsRepositoryImpl::from_connection(conn),
        Arc::new(ImportConfig::default()),
    )
    .expect("默认列映射应可构建")
}

fn key(date: &str, store_id: i64, platform_id: i64) -> MetricKey {
    MetricKey {
        report_date: date.to_string(),
        store_id,
        platform_id,
    }
}

#[tokio::test]
async fn test_import_file_maps_and_tallies() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("美团4-6月.xlsx");

    write_platform_file(
        &path,
        vec![
            PlatformRow::new("2025-04-01", SHIMAO, 1200.0),
            PlatformRow::new("2025-04-01", DEYANG, 800.0),
            PlatformRow::new("2025-04-01", "未登记门店", 10.0),
            PlatformRow::new("2025-04-02", "未登记门店", 11.0),
            PlatformRow::new("2025-04-02", SHIMAO, 1300.0),
        ],
    )
    .unwrap();

    let importer = create_importer(conn.clone());
    let summary = importer.import_file(&path, "meituan").await.unwrap();

    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.inserted, 3);
    assert_eq!(summary.skipped_unknown_store, 2);
    assert_eq!(summary.unmatched_stores, vec!["未登记门店".to_string()]);
    assert!(summary.is_balanced());
    assert_eq!(summary.file_name, "美团4-6月.xlsx");
    assert!(!summary.batch_id.is_empty());

    let repo = PlatformMetricsRepositoryImpl::from_connection(conn);
    assert_eq!(repo.count().await.unwrap(), 3);

    let fields = repo.find(&key("2025-04-01", 8, 1)).await.unwrap().unwrap();
    assert_eq!(fields.get("exposure_count"), Some(&CleanValue::Int(1200)));
    assert_eq!(fields.get("positive_rate"), Some(&CleanValue::Real(0.98)));
    assert_eq!(fields.get("ranking_popularity"), Some(&CleanValue::Int(3)));
    assert_eq!(fields.get("city"), Some(&CleanValue::Text("德阳".into())));
    assert_eq!(fields.get("gmv_before_discount"), Some(&CleanValue::Real(1288.5)));
    // 文件中没有的列保持 NULL
    assert_eq!(fields.get("visit_users"), Some(&CleanValue::Null));
}

#[tokio::test]
async fn test_reimport_overwrites_without_duplicates() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("点评4-6月.xlsx");
    let importer = create_importer(conn.clone());

    write_platform_file(&path, vec![PlatformRow::new("2025-04-01", SHIMAO, 1200.0)]).unwrap();
    importer.import_file(&path, "dianping").await.unwrap();

    // 第二次导入: 曝光次数变化，好评率为 "-"（应覆盖为 NULL）
    let mut changed = PlatformRow::new("2025-04-01", SHIMAO, 1500.0);
    changed.positive_rate = Cell::Text("-");
    write_platform_file(&path, vec![changed]).unwrap();
    let summary = importer.import_file(&path, "dianping").await.unwrap();
    assert_eq!(summary.inserted, 1);

    let repo = PlatformMetricsRepositoryImpl::from_connection(conn);
    assert_eq!(repo.count().await.unwrap(), 1);
    let fields = repo.find(&key("2025-04-01", 8, 2)).await.unwrap().unwrap();
    assert_eq!(fields.get("exposure_count"), Some(&CleanValue::Int(1500)));
    assert_eq!(fields.get("positive_rate"), Some(&CleanValue::Null));
}

#[tokio::test]
async fn test_failing_row_is_rolled_back_alone() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    {
        let guard = conn.lock().unwrap();
        guard
            .execute_batch(
                "CREATE TRIGGER reject_exposure BEFORE INSERT ON platform_daily_metrics
                 WHEN NEW.exposure_count = 666
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("美团6-9月.xlsx");
    write_platform_file(
        &path,
        vec![
            PlatformRow::new("2025-06-01", SHIMAO, 100.0),
            PlatformRow::new("2025-06-02", SHIMAO, 666.0),
            PlatformRow::new("2025-06-03", SHIMAO, 300.0),
        ],
    )
    .unwrap();

    let importer = create_importer(conn.clone());
    let summary = importer.import_file(&path, "meituan").await.unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped_write_failed, 1);
    assert!(summary.is_balanced());

    let repo = PlatformMetricsRepositoryImpl::from_connection(conn);
    assert_eq!(repo.count().await.unwrap(), 2);
    assert!(repo.find(&key("2025-06-02", 8, 1)).await.unwrap().is_none());
    assert!(repo.find(&key("2025-06-03", 8, 1)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_import_plan_skips_missing_and_unknown_platform() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    let dir = TempDir::new().unwrap();
    write_platform_file(
        &dir.path().join("美团4-6月.xlsx"),
        vec![PlatformRow::new("2025-04-01", SHIMAO, 1.0)],
    )
    .unwrap();
    write_platform_file(
        &dir.path().join("饿了么4-6月.xlsx"),
        vec![PlatformRow::new("2025-04-01", SHIMAO, 1.0)],
    )
    .unwrap();

    let plan = vec![
        PlatformFile {
            file: "美团4-6月.xlsx".into(),
            platform: "meituan".into(),
        },
        PlatformFile {
            file: "美团6-9月.xlsx".into(),
            platform: "meituan".into(),
        },
        PlatformFile {
            file: "饿了么4-6月.xlsx".into(),
            platform: "eleme".into(),
        },
    ];

    let importer = create_importer(conn);
    let run = importer.import_plan(dir.path(), &plan).await;

    assert_eq!(run.files.len(), 1);
    assert_eq!(run.total_inserted(), 1);
    assert_eq!(run.missing_files, vec!["美团6-9月.xlsx".to_string()]);
    assert_eq!(run.failed_files.len(), 1);
    assert_eq!(run.failed_files[0].0, "饿了么4-6月.xlsx");
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let (_db, conn) = create_test_db().unwrap();
    let importer = create_importer(conn);
    let result = importer
        .import_file(std::path::Path::new("不存在.xlsx"), "meituan")
        .await;
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}
