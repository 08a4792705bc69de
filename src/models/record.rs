//! 出差记录
//!
//! 记录本身是一个有序的字段表，键名就是上传表格的栏位名称，
//! 计算结果以固定的英文键名写回，下游的报表导出依赖这些键名。

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::artifact::MapArtifact;
use crate::models::route::RouteDetail;

/// 记录栏位名称
pub mod fields {
    pub const DEPARTMENT: &str = "部門";
    pub const PERSON: &str = "姓名";
    pub const PROJECT: &str = "計畫別";
    pub const ORIGIN_NAME: &str = "起點名稱";
    pub const DESTINATION_NAME: &str = "目的地名稱";
    pub const START_TIME: &str = "出差日期時間（開始）";
    pub const END_TIME: &str = "出差日期時間（結束）";
    /// 是否需要计算（自驾）
    pub const COMPUTE_FLAG: &str = "IsDriving";

    pub const ONE_WAY_KM: &str = "OneWayKm";
    pub const ROUND_TRIP_KM: &str = "RoundTripKm";
    pub const GOOGLE_MAP_URL: &str = "GoogleMapUrl";
    pub const STEP_COUNT: &str = "StepCount";
    pub const POLYLINE: &str = "Polyline";
    pub const ROUTE_STEPS: &str = "RouteSteps";
    pub const ORIGIN_ADDRESS: &str = "OriginAddress";
    pub const DESTINATION_ADDRESS: &str = "DestinationAddress";
    pub const ESTIMATED_TIME: &str = "EstimatedTime";
    pub const STATIC_MAP_IMAGE: &str = "StaticMapImage";

    /// 计算后写入的全部栏位
    pub const COMPUTED: [&str; 10] = [
        ONE_WAY_KM,
        ROUND_TRIP_KM,
        GOOGLE_MAP_URL,
        STEP_COUNT,
        POLYLINE,
        ROUTE_STEPS,
        ORIGIN_ADDRESS,
        DESTINATION_ADDRESS,
        ESTIMATED_TIME,
        STATIC_MAP_IMAGE,
    ];
}

/// 一条出差记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelRecord(Map<String, Value>);

impl TravelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// 读取文字栏位（去除前后空白），数字会被转换成文字
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn origin_name(&self) -> String {
        self.text(fields::ORIGIN_NAME)
    }

    pub fn destination_name(&self) -> String {
        self.text(fields::DESTINATION_NAME)
    }

    /// 计算旗标是否明确设置为"是"
    pub fn is_compute_flagged(&self) -> bool {
        match self.0.get(fields::COMPUTE_FLAG) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_uppercase().as_str(),
                "Y" | "YES" | "TRUE" | "1" | "是"
            ),
            _ => false,
        }
    }

    pub fn one_way_km(&self) -> Option<f64> {
        self.0.get(fields::ONE_WAY_KM).and_then(Value::as_f64)
    }

    /// 单程距离栏位存在且非 null
    pub fn is_computed(&self) -> bool {
        matches!(self.0.get(fields::ONE_WAY_KM), Some(v) if !v.is_null())
    }

    /// 返回写入计算结果后的新记录，原记录不变
    pub fn with_computed(&self, computed: &ComputedFields) -> TravelRecord {
        let mut next = self.clone();
        next.insert(fields::ONE_WAY_KM, json!(computed.one_way_km));
        next.insert(fields::ROUND_TRIP_KM, json!(computed.round_trip_km));
        next.insert(fields::GOOGLE_MAP_URL, computed.map_url.clone());
        next.insert(fields::STEP_COUNT, computed.step_count);
        next.insert(fields::POLYLINE, computed.polyline.clone());
        next.insert(fields::ROUTE_STEPS, computed.route_steps.clone());
        next.insert(fields::ORIGIN_ADDRESS, computed.origin_address.clone());
        next.insert(fields::DESTINATION_ADDRESS, computed.destination_address.clone());
        next.insert(fields::ESTIMATED_TIME, computed.estimated_time.clone());
        next.insert(
            fields::STATIC_MAP_IMAGE,
            computed
                .static_map_image
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        next
    }
}

impl From<Map<String, Value>> for TravelRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 一次成功计算产生的全部栏位
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedFields {
    pub one_way_km: f64,
    pub round_trip_km: f64,
    pub map_url: String,
    pub step_count: usize,
    pub polyline: String,
    pub route_steps: String,
    pub origin_address: String,
    pub destination_address: String,
    pub estimated_time: String,
    pub static_map_image: Option<String>,
}

impl ComputedFields {
    pub fn from_route(
        route: &RouteDetail,
        origin_address: &str,
        destination_address: &str,
        artifact: Option<&MapArtifact>,
    ) -> Self {
        Self {
            one_way_km: route.one_way_km,
            round_trip_km: route.round_trip_km,
            map_url: route.map_url.clone(),
            step_count: route.step_count(),
            polyline: route.polyline.clone(),
            route_steps: route.steps_text(),
            origin_address: origin_address.to_string(),
            destination_address: destination_address.to_string(),
            estimated_time: route.duration_text.clone(),
            static_map_image: artifact.map(MapArtifact::display_path),
        }
    }
}
