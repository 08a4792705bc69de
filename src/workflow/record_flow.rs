//! 记录处理流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整计算流程
//!
//! 流程顺序：
//! 1. 检查起终点名称
//! 2. 解析起点（可使用固定起点）与终点地址
//! 3. 地址相撞检查
//! 4. 查询路线 → 0 公里检查
//! 5. 产生地图（失败不影响结果）
//! 6. 写回全部计算栏位

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppResult, BusinessError};
use crate::models::{ComputedFields, ResolvedAddress, TravelRecord};
use crate::services::{AddressResolver, MapRenderer, RouteResolver};
use crate::workflow::record_ctx::RecordCtx;

/// 记录处理流程
///
/// - 编排单条记录的计算流程
/// - 只依赖业务能力（services）
/// - 成功时返回新的记录，失败时原记录保持不变
pub struct RecordFlow {
    addresses: Arc<AddressResolver>,
    routes: Arc<RouteResolver>,
    renderer: Arc<MapRenderer>,
}

impl RecordFlow {
    pub fn new(
        addresses: Arc<AddressResolver>,
        routes: Arc<RouteResolver>,
        renderer: Arc<MapRenderer>,
    ) -> Self {
        Self {
            addresses,
            routes,
            renderer,
        }
    }

    /// 计算一条记录
    ///
    /// # 参数
    /// - `record`: 已确认需要计算的记录
    /// - `ctx`: 记录上下文
    /// - `fixed_origin`: 固定起点地址
    ///
    /// # 返回
    /// 写入计算栏位后的新记录
    pub async fn run(
        &self,
        record: &TravelRecord,
        ctx: &RecordCtx,
        fixed_origin: Option<&str>,
    ) -> AppResult<TravelRecord> {
        if ctx.has_missing_endpoint() {
            return Err(BusinessError::MissingEndpoint.into());
        }

        // ========== 地址解析 ==========
        let origin = self.addresses.resolve(&ctx.origin_name, fixed_origin).await;
        let destination = self.addresses.resolve(&ctx.destination_name, None).await;

        let (origin_address, destination_address) =
            self.guard_collision(ctx, &origin, &destination)?;

        // ========== 路线 ==========
        info!("{} 🔍 查询路线...", ctx);
        let route = self
            .routes
            .get_route(&origin_address, &destination_address, true)
            .await?;

        if route.one_way_km == 0.0 {
            return Err(BusinessError::ZeroDistance {
                origin: origin_address,
                destination: destination_address,
            }
            .into());
        }

        // ========== 地图 ==========
        let artifact = self
            .renderer
            .render(&route, &origin_address, &destination_address, route.one_way_km)
            .await;
        if artifact.is_none() {
            warn!("{} ⚠️ 无法产生地图，地图栏位留空", ctx);
        }

        let computed = ComputedFields::from_route(
            &route,
            &origin_address,
            &destination_address,
            artifact.as_ref(),
        );

        info!(
            "{} ✓ 单程 {} 公里 / 往返 {} 公里",
            ctx, computed.one_way_km, computed.round_trip_km
        );
        Ok(record.with_computed(&computed))
    }

    /// 起终点解析到同一地址时的处理
    ///
    /// 名称相同视为错误；名称不同则改用原始名称查询路线
    fn guard_collision(
        &self,
        ctx: &RecordCtx,
        origin: &ResolvedAddress,
        destination: &ResolvedAddress,
    ) -> AppResult<(String, String)> {
        if origin.address != destination.address {
            return Ok((origin.address.clone(), destination.address.clone()));
        }

        if ctx.origin_name == ctx.destination_name {
            return Err(BusinessError::IdenticalEndpoints {
                name: ctx.origin_name.clone(),
            }
            .into());
        }

        warn!(
            "{} ⚠️ 起终点解析到相同地址 ({} / {})，改用原始名称",
            ctx, origin.tier, destination.tier
        );
        Ok((ctx.origin_name.clone(), ctx.destination_name.clone()))
    }
}
