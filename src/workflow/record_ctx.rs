//! 记录处理上下文
//!
//! 封装"我正在处理批次中的第几条记录"这一信息

use std::fmt::Display;

use crate::models::TravelRecord;
use crate::utils::logging::sanitize_log_input;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 记录在批次中的序号（从1开始）
    pub index: usize,

    /// 起点名称（已去除前后空白）
    pub origin_name: String,

    /// 终点名称（已去除前后空白）
    pub destination_name: String,
}

impl RecordCtx {
    /// 从记录创建上下文
    pub fn new(index: usize, record: &TravelRecord) -> Self {
        Self {
            index,
            origin_name: record.origin_name(),
            destination_name: record.destination_name(),
        }
    }

    /// 起点或终点名称是否为空
    pub fn has_missing_endpoint(&self) -> bool {
        self.origin_name.is_empty() || self.destination_name.is_empty()
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[记录 #{} {} → {}]",
            self.index,
            sanitize_log_input(&self.origin_name),
            sanitize_log_input(&self.destination_name)
        )
    }
}
