//! 地址解析服务 - 业务能力层
//!
//! 把自由输入的地点名称转换成可以交给地图服务的地址。
//! 解析永远不会失败：所有层级都落空时直接使用原始名称。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::Geocoder;
use crate::models::{ResolutionTier, ResolvedAddress};
use crate::services::place_table::PlaceTable;
use crate::utils::logging::sanitize_log_input;

/// 地址解析服务
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<PlaceTable>,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, places: Arc<PlaceTable>) -> Self {
        Self { geocoder, places }
    }

    /// 共用的地点对应表
    pub fn places(&self) -> &Arc<PlaceTable> {
        &self.places
    }

    /// 解析地点名称
    ///
    /// # 参数
    /// - `name`: 地点名称
    /// - `fixed_override`: 固定地址，只有起点会传入
    ///
    /// # 返回
    /// 第一个成功层级的结果，并标记是哪个层级产生的
    pub async fn resolve(&self, name: &str, fixed_override: Option<&str>) -> ResolvedAddress {
        let name = name.trim();

        for tier in ResolutionTier::ORDER {
            if let Some(address) = self.try_tier(tier, name, fixed_override).await {
                info!(
                    "📍 地址解析 [{}]: {} → {}",
                    tier,
                    sanitize_log_input(name),
                    sanitize_log_input(&address)
                );
                return ResolvedAddress::new(name, address, tier);
            }
        }

        // Literal 层级总会返回地址
        ResolvedAddress::new(name, name, ResolutionTier::Literal)
    }

    async fn try_tier(
        &self,
        tier: ResolutionTier,
        name: &str,
        fixed_override: Option<&str>,
    ) -> Option<String> {
        match tier {
            ResolutionTier::FixedOrigin => fixed_override
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_string),
            ResolutionTier::LiveGeocode => self.geocode(name).await,
            ResolutionTier::LookupTable => {
                let address = self.places.get_address(name);
                if address.is_none() {
                    debug!("地点对应表未命中: {}", sanitize_log_input(name));
                }
                address
            }
            ResolutionTier::Literal => {
                warn!(
                    "⚠️ 无法解析地点，直接使用原始名称: {}",
                    sanitize_log_input(name)
                );
                Some(name.to_string())
            }
        }
    }

    async fn geocode(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }

        match self.geocoder.geocode(name).await {
            Ok(Some(result)) if !result.formatted_address.trim().is_empty() => {
                Some(result.formatted_address)
            }
            Ok(_) => {
                debug!("地理编码无结果: {}", sanitize_log_input(name));
                None
            }
            Err(e) => {
                warn!("地理编码失败 ({}): {}", sanitize_log_input(name), e);
                None
            }
        }
    }
}
