// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// RUST_LOG 优先；未设置时使用命令行给定的默认级别
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统（默认 info）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=debug 或 RUST_LOG=restaurant_ops_import=trace
///
/// # 示例
/// ```no_run
/// use restaurant_ops_import::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_default("info");
}

/// 按 `-v` 次数选择默认级别
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(5), "trace");
    }
}
