//! 警告写入服务 - 业务能力层
//!
//! 只负责"把失败记录写入 warn 文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 警告写入服务
///
/// 职责：
/// - 将无法计算的记录追加写入 warn.txt
/// - 每条错误一行，带批次时间
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 写入一批错误讯息
    ///
    /// # 参数
    /// - `errors`: 批次产生的错误讯息（已带序号）
    pub fn write_all(&self, errors: &[String]) -> AppResult<()> {
        if errors.is_empty() {
            return Ok(());
        }

        debug!("写入 {} 条警告到 {}", errors.len(), self.warn_file_path);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let content: String = errors
            .iter()
            .map(|message| format!("[{}] {}\n", stamp, message))
            .collect();

        file.write_all(content.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warn.txt");
        let writer = WarnWriter::with_path(path.to_string_lossy());

        writer.write_all(&["第 1 条记录缺少起点或终点".to_string()]).unwrap();
        writer.write_all(&[]).unwrap();
        writer
            .write_all(&["第 3 条记录起点和终点完全相同: A".to_string()])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("第 1 条记录缺少起点或终点"));
        assert!(lines[1].ends_with("第 3 条记录起点和终点完全相同: A"));
    }
}
