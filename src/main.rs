// ==========================================
// 门店运营数据导入 - 命令行入口
// ==========================================
// 子命令: init-db / platform / sales / upload
// 错误: 各层 thiserror 错误在此统一转为 anyhow
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use restaurant_ops_import::cli::{Cli, Commands};
use restaurant_ops_import::config::{default_db_path, ImportConfig, UploadConfig};
use restaurant_ops_import::db::{init_schema, open_sqlite_connection};
use restaurant_ops_import::domain::{FileImportSummary, RunSummary};
use restaurant_ops_import::importer::{PlatformImporter, SalesImporter};
use restaurant_ops_import::repository::{
    PlatformMetricsRepositoryImpl, SalesSummaryRepositoryImpl,
};
use restaurant_ops_import::uploader::{ManagementApiClient, SqlUploader, UploadSummary};
use restaurant_ops_import::{logging, APP_NAME, VERSION};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_with_default(logging::default_level(cli.verbose));
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config = Arc::new(
        ImportConfig::load_or_default(cli.config.as_ref()).context("加载导入配置失败")?,
    );
    let db_path = cli
        .db
        .clone()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(default_db_path);

    match cli.command {
        Commands::InitDb => {
            open_database(&db_path, &config)?;
            println!("✔ 数据库已初始化: {}", db_path);
        }

        Commands::Platform {
            dir,
            file,
            platform,
        } => {
            let conn = open_database(&db_path, &config)?;
            let importer = PlatformImporter::new(
                PlatformMetricsRepositoryImpl::from_connection(conn),
                config.clone(),
            )?;

            println!("{}", "=".repeat(50));
            println!("平台数据导入");
            println!("{}", "=".repeat(50));

            let run = match (file, platform) {
                (Some(file), Some(platform)) => {
                    single_file_run(&file, importer.import_file(&file, &platform).await)
                }
                _ => importer.import_plan(&dir, &config.platform.files).await,
            };
            print_run_summary(&run);
        }

        Commands::Sales {
            dir,
            file,
            store,
            period,
        } => {
            let conn = open_database(&db_path, &config)?;
            let importer = SalesImporter::new(
                SalesSummaryRepositoryImpl::from_connection(conn),
                config.clone(),
            );

            println!("{}", "=".repeat(50));
            println!("菜品销售导入");
            println!("{}", "=".repeat(50));

            let run = match (file, store, period) {
                (Some(file), Some(store), Some(period)) => single_file_run(
                    &file,
                    importer.import_file(&file, &store, &period).await,
                ),
                _ => importer.import_plan(&dir, &config.sales.files).await,
            };
            print_run_summary(&run);
        }

        Commands::Upload {
            files,
            upload_config,
            mode,
            base_path,
            skip_extensions,
        } => {
            let mut upload = match upload_config {
                Some(path) => UploadConfig::load(path).context("加载上传配置失败")?,
                None => UploadConfig::default(),
            }
            .with_env();
            if let Some(mode) = mode {
                upload.mode = mode;
            }
            if let Some(base_path) = base_path {
                upload.base_path = base_path;
            }

            let client = ManagementApiClient::from_config(&upload)?;
            let upload = Arc::new(upload);
            let uploader = SqlUploader::new(client, upload.clone());

            println!("{}", "=".repeat(60));
            println!("SQL 上传 ({:?})", upload.mode);
            println!("{}", "=".repeat(60));

            let summary = if files.is_empty() {
                uploader.upload_all(!skip_extensions).await
            } else {
                uploader.upload_paths(&files).await
            };
            print_upload_summary(&summary);
        }
    }

    Ok(())
}

/// 打开本地库并确保表结构存在
fn open_database(db_path: &str, config: &ImportConfig) -> Result<Arc<Mutex<Connection>>> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }
    }
    let conn = open_sqlite_connection(db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn, &config.column_table()?).context("初始化表结构失败")?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn single_file_run<E: std::fmt::Display>(
    file: &Path,
    result: Result<FileImportSummary, E>,
) -> RunSummary {
    let mut run = RunSummary::default();
    match result {
        Ok(summary) => run.files.push(summary),
        Err(e) => run
            .failed_files
            .push((file.display().to_string(), e.to_string())),
    }
    run
}

fn print_run_summary(run: &RunSummary) {
    for file in &run.files {
        println!("\n处理文件: {}", file.file_name);
        println!("  读取行数: {}", file.total_rows);
        println!("  导入: {}, 跳过: {}", file.inserted, file.skipped());
        if file.skipped() > 0 {
            println!(
                "    未匹配门店 {} / 主键缺失 {} / 销售额为 0 {} / 写入失败 {}",
                file.skipped_unknown_store,
                file.skipped_missing_key,
                file.skipped_zero_sales,
                file.skipped_write_failed
            );
        }
        if !file.unmatched_stores.is_empty() {
            println!("  未匹配门店: {:?}", file.unmatched_stores);
        }
        if !file.uncategorized_products.is_empty() {
            println!("  未匹配产品: {} 个", file.uncategorized_products.len());
        }
        if file.pre_discount_total != 0.0 || file.revenue_total != 0.0 {
            println!("  销售额: ¥{:.2}", file.pre_discount_total);
            println!("  菜品收入: ¥{:.2}", file.revenue_total);
        }
    }
    for missing in &run.missing_files {
        println!("\n文件不存在: {}", missing);
    }
    for (file, err) in &run.failed_files {
        println!("\n导入失败: {} ({})", file, err);
    }

    println!("\n{}", "=".repeat(50));
    println!(
        "导入完成! 总计: {} 条, 跳过: {} 条",
        run.total_inserted(),
        run.total_skipped()
    );
    println!("{}", "=".repeat(50));
}

fn print_upload_summary(summary: &UploadSummary) {
    if summary.extensions_succeeded + summary.extensions_failed > 0 {
        println!(
            "\n扩展: 成功 {}, 失败 {}",
            summary.extensions_succeeded, summary.extensions_failed
        );
    }
    for file in &summary.files {
        println!(
            "  {} {}: 成功 {}, 失败 {}",
            if file.is_success() { "✓" } else { "✗" },
            file.path,
            file.succeeded,
            file.failed
        );
        for preview in &file.error_previews {
            println!("      {}", preview);
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("上传完成汇总");
    println!("{}", "=".repeat(60));
    println!("成功: {} 个文件", summary.succeeded_files().len());
    println!("失败: {} 个文件", summary.failed_files().len());
    println!(
        "语句: 成功 {}, 失败 {}",
        summary.statements_succeeded(),
        summary.statements_failed()
    );
    let failed = summary.failed_files();
    if !failed.is_empty() {
        println!("\n失败文件:");
        for f in failed {
            println!("  - {}", f);
        }
    }
}
