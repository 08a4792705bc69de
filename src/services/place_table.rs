//! 地点对应表 - 业务能力层
//!
//! 常用地点名称到正式地址的对应，地理编码失败时使用

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

/// 内建的常用地点
pub const DEFAULT_PLACES: [(&str, &str); 6] = [
    ("安環高雄處", "高雄市前鎮區復興四路12號"),
    ("總公司", "台北市信義區信義路五段7號"),
    ("經濟部產業園區管理局", "高雄市前鎮區中一路2號"),
    ("高雄市政府", "高雄市苓雅區四維三路2號"),
    ("科技園區", "新竹市東區新安路2號"),
    ("工業區管理處", "台中市西屯區工業區一路2號"),
];

/// 地点对应表
///
/// 先精确比对，再做双向包含的模糊比对，模糊比对按加入顺序取第一个命中
#[derive(Debug, Default)]
pub struct PlaceTable {
    entries: RwLock<Vec<(String, String)>>,
}

impl PlaceTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带内建地点的表
    pub fn with_defaults() -> Self {
        let table = Self::new();
        table.extend(
            DEFAULT_PLACES
                .iter()
                .map(|(name, address)| (name.to_string(), address.to_string())),
        );
        table
    }

    /// 查询地点地址
    ///
    /// # 参数
    /// - `name`: 地点名称
    ///
    /// # 返回
    /// 命中时返回地址，名称为空或未命中返回 `None`
    pub fn get_address(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let entries = self.read();

        if let Some((_, address)) = entries.iter().find(|(key, _)| key == name) {
            return Some(address.clone());
        }

        let fuzzy = entries
            .iter()
            .find(|(key, _)| key.contains(name) || name.contains(key.as_str()));
        if let Some((key, address)) = fuzzy {
            debug!("地点模糊比对: {} ≈ {}", name, key);
            return Some(address.clone());
        }

        None
    }

    /// 新增或覆盖一个对应
    pub fn add_mapping(&self, name: impl Into<String>, address: impl Into<String>) {
        let name = name.into().trim().to_string();
        let address = address.into().trim().to_string();
        if name.is_empty() || address.is_empty() {
            return;
        }

        let mut entries = self.write();
        match entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = address,
            None => entries.push((name, address)),
        }
    }

    /// 批量加入对应
    pub fn extend(&self, mappings: impl IntoIterator<Item = (String, String)>) {
        for (name, address) in mappings {
            self.add_mapping(name, address);
        }
    }

    /// 全部对应（按加入顺序）
    pub fn all_mappings(&self) -> Vec<(String, String)> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, String)>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, String)>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
