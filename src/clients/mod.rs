//! 外部服务接口
//!
//! 每个外部能力都以 trait 表示，服务层只依赖 trait，
//! 测试中可以替换成假实现。

pub mod google_maps;

use async_trait::async_trait;
use std::path::Path;

use crate::error::AppResult;
use crate::models::{DirectionsRoute, GeocodeResult, StaticMapRequest};

pub use google_maps::{directions_page_url, GoogleMapsClient};

/// 地理编码能力
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 把地点名称转换成正式地址，查无结果时返回 `Ok(None)`
    async fn geocode(&self, query: &str) -> AppResult<Option<GeocodeResult>>;
}

/// 路线规划能力
#[async_trait]
pub trait DirectionsApi: Send + Sync {
    /// 查询路线，查无路线时返回空列表
    ///
    /// # 参数
    /// - `origin` / `destination`: 起点与终点地址
    /// - `mode`: 交通方式，例如 `driving`
    /// - `alternatives`: 是否要求返回备选路线
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: &str,
        alternatives: bool,
    ) -> AppResult<Vec<DirectionsRoute>>;
}

/// 静态地图能力
#[async_trait]
pub trait StaticMapApi: Send + Sync {
    /// 返回图片的原始字节
    async fn static_map(&self, request: &StaticMapRequest) -> AppResult<Vec<u8>>;
}

/// 路线页面截图能力
#[async_trait]
pub trait RouteCapture: Send + Sync {
    /// 打开起终点的导航页面并截图到 `output`
    async fn capture(&self, origin: &str, destination: &str, output: &Path) -> AppResult<()>;
}
