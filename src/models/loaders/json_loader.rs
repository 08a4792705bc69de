use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::batch::{BatchRequest, BatchResult};
use crate::models::record::TravelRecord;

/// 输入文件可以是记录数组，也可以是带 `fixed_origin` 的对象
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchInput {
    Records(Vec<TravelRecord>),
    Request(BatchRequest),
}

/// 从 JSON 文件加载批次输入
pub async fn load_batch_request(path: &Path) -> AppResult<BatchRequest> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    parse_batch_request(&content)
}

/// 解析批次输入
pub fn parse_batch_request(content: &str) -> AppResult<BatchRequest> {
    let input: BatchInput = serde_json::from_str(content)?;
    Ok(match input {
        BatchInput::Records(records) => BatchRequest {
            records,
            fixed_origin: None,
        },
        BatchInput::Request(request) => request,
    })
}

/// 把批次结果写成格式化的 JSON 文件
pub async fn write_batch_result(path: &Path, result: &BatchResult) -> AppResult<()> {
    let content = serde_json::to_string_pretty(result)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    tracing::info!("结果已写入: {}", path.display());
    Ok(())
}
