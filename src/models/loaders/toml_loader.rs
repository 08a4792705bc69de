use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::{AppError, AppResult, FileError};

#[derive(Debug, Default, Deserialize)]
struct PlaceTableFile {
    /// 保留文件中的书写顺序，模糊匹配时先写的优先
    #[serde(default)]
    places: toml::Table,
}

/// 从 TOML 文件加载地点对应表
///
/// 文件格式：
/// ```toml
/// [places]
/// "總公司" = "台北市信義區信義路五段7號"
/// ```
///
/// 文件不存在时返回空表
pub async fn load_place_table(path: &Path) -> AppResult<Vec<(String, String)>> {
    if !path.exists() {
        tracing::debug!("地点对应表不存在，跳过: {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let entries = parse_place_table(&content).map_err(|e| match e {
        AppError::File(FileError::TomlParseFailed { source, .. }) => {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })
        }
        other => other,
    })?;

    tracing::info!("成功加载 {} 个地点对应", entries.len());
    Ok(entries)
}

/// 解析地点对应表内容，按文件顺序返回，忽略空白名称、空白地址或非文字的地址
pub fn parse_place_table(content: &str) -> AppResult<Vec<(String, String)>> {
    let file: PlaceTableFile = toml::from_str(content)?;
    Ok(file
        .places
        .into_iter()
        .filter_map(|(name, value)| match value.as_str() {
            Some(address) => Some((name.trim().to_string(), address.trim().to_string())),
            None => {
                tracing::warn!("⚠️ 地点 {} 的地址不是文字，已忽略", name);
                None
            }
        })
        .filter(|(name, address)| !name.is_empty() && !address.is_empty())
        .collect())
}
