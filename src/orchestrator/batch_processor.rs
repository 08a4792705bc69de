//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 依输入顺序逐条处理记录：
//!
//! 1. 未勾选计算的记录原样保留
//! 2. 其余记录交给 `RecordFlow` 计算
//! 3. 单条记录的任何错误（包括 panic）都转换成带序号的错误讯息，批次继续
//! 4. 汇总为 `BatchResult`
//!
//! 整个批次只有在没有任何记录时才返回错误。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::{BatchResult, TravelRecord};
use crate::services::PlaceTable;
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{RecordCtx, RecordFlow};

/// 批量记录处理器
pub struct BatchOrchestrator {
    flow: RecordFlow,
    places: Arc<PlaceTable>,
}

impl BatchOrchestrator {
    pub fn new(flow: RecordFlow, places: Arc<PlaceTable>) -> Self {
        Self { flow, places }
    }

    /// 共用的地点对应表，可在批次之间新增对应
    pub fn places(&self) -> &Arc<PlaceTable> {
        &self.places
    }

    /// 处理一批记录
    ///
    /// # 参数
    /// - `records`: 输入记录
    /// - `fixed_origin`: 固定起点地址，套用到每一条记录的起点
    ///
    /// # 返回
    /// 全部记录（顺序不变）、错误讯息与统计
    pub async fn process_batch(
        &self,
        records: Vec<TravelRecord>,
        fixed_origin: Option<&str>,
    ) -> AppResult<BatchResult> {
        if records.is_empty() {
            return Err(BusinessError::EmptyBatch.into());
        }

        let fixed_origin = fixed_origin.map(str::trim).filter(|s| !s.is_empty());
        let flagged = records.iter().filter(|r| r.is_compute_flagged()).count();
        log_batch_start(records.len(), flagged);
        if let Some(address) = fixed_origin {
            info!("📌 使用固定起点: {}", address);
        }

        let mut output = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for (offset, record) in records.into_iter().enumerate() {
            let index = offset + 1;

            if !record.is_compute_flagged() {
                output.push(record);
                continue;
            }

            let ctx = RecordCtx::new(index, &record);
            let outcome = AssertUnwindSafe(self.flow.run(&record, &ctx, fixed_origin))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(computed)) => output.push(computed),
                Ok(Err(e)) => {
                    let message = record_error_message(index, &e);
                    warn!("{} ❌ {}", ctx, message);
                    errors.push(message);
                    output.push(record);
                }
                Err(panic) => {
                    let message = format!("第 {} 条记录处理失败: {}", index, panic_message(&*panic));
                    error!("{} 💥 {}", ctx, message);
                    errors.push(message);
                    output.push(record);
                }
            }
        }

        let result = BatchResult::new(output, errors);
        log_batch_complete(&result);
        Ok(result)
    }
}

/// 错误讯息带 1 起算的记录序号
pub fn record_error_message(index: usize, err: &AppError) -> String {
    match err {
        AppError::Business(business) => format!("第 {} 条记录{}", index, business),
        other => format!("第 {} 条记录计算失败: {}", index, other),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知错误".to_string()
    }
}
