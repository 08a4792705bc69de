//! 路线数据
//!
//! `DirectionsRoute` 系列是服务商返回内容的领域表示，
//! `RouteDetail` 则是整理后写回记录的路线资讯。

use serde::Serialize;

/// 服务商返回的一条路线
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionsRoute {
    pub legs: Vec<RouteLeg>,
    /// 整条路线的编码路径
    pub overview_polyline: String,
}

/// 路线中的一段行程
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteLeg {
    pub distance_meters: u64,
    pub duration_text: String,
    pub duration_seconds: u64,
    pub steps: Vec<RouteStep>,
}

/// 逐步导航的一步
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteStep {
    pub html_instructions: String,
    pub distance_text: String,
}

/// 整理后的路线资讯
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDetail {
    /// 单程公里数（四舍五入到小数点后两位）
    pub one_way_km: f64,
    /// 往返公里数，恒等于单程的两倍
    pub round_trip_km: f64,
    pub duration_text: String,
    pub duration_seconds: u64,
    /// 纯文字的导航步骤，每步附带距离
    pub steps: Vec<String>,
    /// 主路线编码路径
    pub polyline: String,
    /// 其他备选路线的编码路径
    pub alternative_polylines: Vec<String>,
    /// Google Maps 导航网址
    pub map_url: String,
}

impl RouteDetail {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// 编号后的步骤文字，每步一行
    pub fn steps_text(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 公尺转公里并四舍五入到两位小数
pub fn meters_to_km(meters: u64) -> f64 {
    (meters as f64 / 1000.0 * 100.0).round() / 100.0
}
