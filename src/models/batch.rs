use serde::{Deserialize, Serialize};

use crate::models::record::TravelRecord;

/// 批次输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub records: Vec<TravelRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_origin: Option<String>,
}

/// 批次处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// 全部记录，顺序与输入一致
    pub records: Vec<TravelRecord>,
    pub total_count: usize,
    /// 单程距离栏位存在且非 null 的记录数
    pub computed_count: usize,
    /// 每条失败记录一行，带 1 起算的序号
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new(records: Vec<TravelRecord>, errors: Vec<String>) -> Self {
        let computed_count = records.iter().filter(|r| r.is_computed()).count();
        Self {
            total_count: records.len(),
            computed_count,
            records,
            errors,
        }
    }

    /// 给调用方的摘要讯息
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            format!("成功计算 {} 条记录", self.computed_count)
        } else {
            format!("部分记录计算失败: {} 条", self.errors.len())
        }
    }
}
