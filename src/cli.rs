// ==========================================
// 门店运营数据导入 - 命令行参数
// ==========================================
// 子命令: init-db / platform / sales / upload
// 全局参数: --db / --config / -v
// ==========================================

use crate::config::UploadMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ops-import")]
#[command(about = "门店运营数据导入: 平台日指标 / POS 菜品销售 / SQL 上传", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 本地 SQLite 数据库路径（默认: 用户数据目录/restaurant-ops-import/ops_data.db）
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// 导入配置 JSON（门店映射 / 列映射 / 文件清单）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 日志详细程度（-v debug，-vv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 创建本地库表结构
    InitDb,

    /// 导入美团/点评平台日指标
    Platform {
        /// 导出文件所在目录（按配置文件清单导入）
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// 只导入单个文件（需同时指定 --platform）
        #[arg(short, long, requires = "platform")]
        file: Option<PathBuf>,

        /// 平台代码，如 meituan / dianping
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// 导入 POS 菜品销售统计
    Sales {
        /// 统计表所在目录（按配置文件清单导入）
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// 只导入单个文件（需同时指定 --store 与 --period）
        #[arg(short, long, requires_all = ["store", "period"])]
        file: Option<PathBuf>,

        /// 门店名称（销售门店映射中的键）
        #[arg(short, long)]
        store: Option<String>,

        /// 汇总周期标签，如 2025-01至2025-11
        #[arg(long)]
        period: Option<String>,
    },

    /// 上传 SQL 文件到托管数据库（令牌取自 SUPABASE_ACCESS_TOKEN）
    Upload {
        /// 只上传这些文件（不执行扩展启用）
        files: Vec<PathBuf>,

        /// 上传配置 JSON
        #[arg(long)]
        upload_config: Option<PathBuf>,

        /// 执行模式
        #[arg(short, long, value_enum)]
        mode: Option<UploadMode>,

        /// SQL 文件根目录（覆盖配置）
        #[arg(long)]
        base_path: Option<PathBuf>,

        /// 跳过扩展启用
        #[arg(long)]
        skip_extensions: bool,
    },
}
