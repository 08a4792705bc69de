//! 里程核对服务 - 业务能力层
//!
//! 重新计算单程距离，与申报的距离比对

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::AppResult;
use crate::services::address_resolver::AddressResolver;
use crate::services::route_resolver::RouteResolver;

/// 差距小于此值视为相符（公里）
pub const MATCH_TOLERANCE_KM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MileageStatus {
    Match,
    Mismatch,
}

/// 核对结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageComparison {
    pub declared_km: f64,
    pub calculated_km: f64,
    /// 绝对差距，四舍五入到两位小数
    pub difference_km: f64,
    pub status: MileageStatus,
}

impl MileageComparison {
    pub fn new(declared_km: f64, calculated_km: f64) -> Self {
        let difference = (declared_km - calculated_km).abs();
        let status = if difference < MATCH_TOLERANCE_KM {
            MileageStatus::Match
        } else {
            MileageStatus::Mismatch
        };
        Self {
            declared_km,
            calculated_km,
            difference_km: (difference * 100.0).round() / 100.0,
            status,
        }
    }
}

/// 里程核对服务
pub struct MileageAudit {
    addresses: Arc<AddressResolver>,
    routes: Arc<RouteResolver>,
}

impl MileageAudit {
    pub fn new(addresses: Arc<AddressResolver>, routes: Arc<RouteResolver>) -> Self {
        Self { addresses, routes }
    }

    /// 核对申报的单程距离
    ///
    /// # 参数
    /// - `declared_km`: 申报的单程公里数
    /// - `origin` / `destination`: 地点名称，会先经过地址解析
    pub async fn compare(
        &self,
        declared_km: f64,
        origin: &str,
        destination: &str,
    ) -> AppResult<MileageComparison> {
        let origin = self.addresses.resolve(origin, None).await;
        let destination = self.addresses.resolve(destination, None).await;
        let route = self
            .routes
            .get_route(&origin.address, &destination.address, false)
            .await?;

        let comparison = MileageComparison::new(declared_km, route.one_way_km);
        info!(
            "📏 里程核对: 申报 {} 公里, 计算 {} 公里, 差距 {} 公里 ({:?})",
            comparison.declared_km,
            comparison.calculated_km,
            comparison.difference_km,
            comparison.status
        );
        Ok(comparison)
    }
}
