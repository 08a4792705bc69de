/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::BatchResult;

/// 日志中用户输入的最大长度
pub const MAX_LOG_INPUT_CHARS: usize = 200;

/// 初始化 tracing
///
/// 设置了 `RUST_LOG` 时以其为准，否则依 `verbose_logging` 选择 debug 或 info
pub fn init(config: &Config) {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n出差里程计算日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 出差里程批次计算");
    info!("📄 输入文件: {}", config.input_file);
    info!("🗺️ 地图输出目录: {}", config.maps_output_dir);
    info!(
        "📸 互动截图: {}",
        if config.interactive_capture { "启用" } else { "停用" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 记录总数
/// - `flagged`: 需要计算的记录数
pub fn log_batch_start(total: usize, flagged: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理批次: 共 {} 条记录，{} 条需要计算", total, flagged);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批次完成: 已计算 {}/{}，错误 {} 条",
        result.computed_count,
        result.total_count,
        result.errors.len()
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `result`: 批次结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(result: &BatchResult, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已计算: {}/{}", result.computed_count, result.total_count);
    info!("❌ 错误: {}", result.errors.len());
    for message in &result.errors {
        info!("   - {}", message);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
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

/// 清理要写入日志的用户输入
///
/// 换行改为空白，移除其他控制字元与 `%n` `%r` `%t`，压缩连续空白并限制长度
pub fn sanitize_log_input(text: &str) -> String {
    let text = truncate_text(text, MAX_LOG_INPUT_CHARS);
    let text: String = text
        .chars()
        .filter_map(|c| match c {
            '\r' | '\n' => Some(' '),
            '\t' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let text = text.replace("%n", "").replace("%r", "").replace("%t", "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("台北101", 10), "台北101");
        assert_eq!(truncate_text("台北市信義區", 2), "台北...");
    }

    #[test]
    fn test_sanitize_strips_line_breaks_and_controls() {
        assert_eq!(
            sanitize_log_input("總公司\r\n[INFO] 伪造\u{7}日志"),
            "總公司 [INFO] 伪造日志"
        );
        assert_eq!(sanitize_log_input("  a%n b%t  "), "a b");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "路".repeat(300);
        let cleaned = sanitize_log_input(&long);
        assert_eq!(cleaned.chars().count(), MAX_LOG_INPUT_CHARS + 3);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        init_log_file(path.to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("出差里程计算日志"));
    }
}
