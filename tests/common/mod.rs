#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use route_mileage::clients::{DirectionsApi, Geocoder, RouteCapture, StaticMapApi};
use route_mileage::error::{AppError, AppResult, BrowserError};
use route_mileage::models::{
    DirectionsRoute, GeocodeResult, RouteLeg, RouteStep, StaticMapRequest, TravelRecord,
};
use route_mileage::services::{
    AddressResolver, MapOverlay, MapRenderer, PlaceTable, RenderSettings, RouteResolver,
};
use route_mileage::{BatchOrchestrator, RecordFlow};

pub fn record(origin: &str, destination: &str, flag: &str) -> TravelRecord {
    serde_json::from_value(json!({
        "部門": "工安組",
        "姓名": "王小明",
        "計畫別": "A-01",
        "起點名稱": origin,
        "目的地名稱": destination,
        "出差日期時間（開始）": "2025-03-01 09:00",
        "出差日期時間（結束）": "2025-03-01 17:00",
        "IsDriving": flag,
    }))
    .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(16, 16, image::Rgba([230, 230, 230, 255]))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn text<'a>(record: &'a TravelRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

// ========== 地理编码 ==========

#[derive(Default)]
pub struct FakeGeocoder {
    known: HashMap<String, String>,
}

impl FakeGeocoder {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            known: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> AppResult<Option<GeocodeResult>> {
        Ok(self.known.get(query).map(|address| GeocodeResult {
            lat: 25.03,
            lng: 121.56,
            formatted_address: address.clone(),
        }))
    }
}

// ========== 路线 ==========

#[derive(Default)]
pub struct FakeDirections {
    distances: HashMap<(String, String), u64>,
    panic_on: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeDirections {
    pub fn with(routes: &[(&str, &str, u64)]) -> Self {
        Self {
            distances: routes
                .iter()
                .map(|(o, d, m)| ((o.to_string(), d.to_string()), *m))
                .collect(),
            ..Self::default()
        }
    }

    pub fn panicking_on(mut self, origin: &str) -> Self {
        self.panic_on = Some(origin.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

fn fake_route(meters: u64, polyline: &str) -> DirectionsRoute {
    DirectionsRoute {
        overview_polyline: polyline.to_string(),
        legs: vec![RouteLeg {
            distance_meters: meters,
            duration_text: "12 分鐘".into(),
            duration_seconds: 720,
            steps: vec![
                RouteStep {
                    html_instructions: "朝<b>西</b>方前進".into(),
                    distance_text: "450 公尺".into(),
                },
                RouteStep {
                    html_instructions: "向左轉，走<b>中山南路</b>".into(),
                    distance_text: "2.1 公里".into(),
                },
            ],
        }],
    }
}

#[async_trait]
impl DirectionsApi for FakeDirections {
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        _mode: &str,
        _alternatives: bool,
    ) -> AppResult<Vec<DirectionsRoute>> {
        self.calls
            .lock()
            .unwrap()
            .push((origin.to_string(), destination.to_string()));

        if self.panic_on.as_deref() == Some(origin) {
            panic!("directions provider crashed");
        }

        Ok(self
            .distances
            .get(&(origin.to_string(), destination.to_string()))
            .map(|meters| vec![fake_route(*meters, "primary_path"), fake_route(*meters + 800, "alt_path")])
            .unwrap_or_default())
    }
}

// ========== 截图 ==========

pub struct FakeCapture {
    pub succeed: bool,
    pub calls: AtomicUsize,
}

impl FakeCapture {
    pub fn working() -> Self {
        Self {
            succeed: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn broken() -> Self {
        Self {
            succeed: false,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RouteCapture for FakeCapture {
    async fn capture(&self, _origin: &str, _destination: &str, output: &Path) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.succeed {
            return Err(BrowserError::NavigationFailed {
                url: "https://www.google.com/maps/dir/".into(),
                message: "timeout".into(),
            }
            .into());
        }
        std::fs::write(output, png_bytes())?;
        Ok(())
    }
}

// ========== 静态地图 ==========

/// 依序返回预设回应，用完后一律返回图片
pub struct FakeStaticMaps {
    scripted: Mutex<Vec<AppResult<Vec<u8>>>>,
    always_fail: bool,
    pub requests: Mutex<Vec<StaticMapRequest>>,
}

impl FakeStaticMaps {
    pub fn working() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(responses: Vec<AppResult<Vec<u8>>>) -> Self {
        Self {
            scripted: Mutex::new(responses),
            always_fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn broken() -> Self {
        Self {
            always_fail: true,
            ..Self::working()
        }
    }
}

#[async_trait]
impl StaticMapApi for FakeStaticMaps {
    async fn static_map(&self, request: &StaticMapRequest) -> AppResult<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        if self.always_fail {
            return Err(AppError::api_bad_response("staticmap", "403", None));
        }
        let mut scripted = self.scripted.lock().unwrap();
        if scripted.is_empty() {
            Ok(png_bytes())
        } else {
            scripted.remove(0)
        }
    }
}

// ========== 组装 ==========

pub struct Harness {
    pub orchestrator: BatchOrchestrator,
    pub directions: Arc<FakeDirections>,
    pub capture: Arc<FakeCapture>,
    pub static_maps: Arc<FakeStaticMaps>,
    pub places: Arc<PlaceTable>,
    pub addresses: Arc<AddressResolver>,
    pub routes: Arc<RouteResolver>,
    pub output_dir: tempfile::TempDir,
}

pub fn harness(
    geocoder: FakeGeocoder,
    directions: FakeDirections,
    capture: FakeCapture,
    static_maps: FakeStaticMaps,
) -> Harness {
    let output_dir = tempfile::tempdir().unwrap();
    let directions = Arc::new(directions);
    let capture = Arc::new(capture);
    let static_maps = Arc::new(static_maps);
    let places = Arc::new(PlaceTable::with_defaults());

    let addresses = Arc::new(AddressResolver::new(Arc::new(geocoder), places.clone()));
    let routes = Arc::new(RouteResolver::new(directions.clone(), "driving"));
    let renderer = Arc::new(MapRenderer::new(
        capture.clone(),
        static_maps.clone(),
        MapOverlay::without_font(),
        RenderSettings {
            output_dir: output_dir.path().join("maps"),
            width: 800,
            height: 600,
            map_type: "roadmap".into(),
        },
    ));

    let flow = RecordFlow::new(addresses.clone(), routes.clone(), renderer);
    Harness {
        orchestrator: BatchOrchestrator::new(flow, places.clone()),
        directions,
        capture,
        static_maps,
        places,
        addresses,
        routes,
        output_dir,
    }
}
