/// Google Maps Web Service 客户端
///
/// 封装地理编码、路线规划与静态地图三个 HTTP 接口
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::clients::{DirectionsApi, Geocoder, StaticMapApi};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::models::{DirectionsRoute, GeocodeResult, RouteLeg, RouteStep, StaticMapRequest};

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DIRECTIONS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";
const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";
const DIRECTIONS_PAGE: &str = "https://www.google.com/maps/dir/";

/// Google Maps 客户端
pub struct GoogleMapsClient {
    http: reqwest::Client,
    api_key: String,
    language: String,
}

impl GoogleMapsClient {
    /// 创建客户端
    ///
    /// 未设置 API Key 时仍可创建，但每次调用都会返回配置错误
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient {
                source: Box::new(e),
            })?;

        Ok(Self {
            http,
            api_key: config.google_maps_api_key.clone(),
            language: config.maps_language.clone(),
        })
    }

    fn ensure_api_key(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        self.ensure_api_key()?;

        let response = self
            .http
            .get(endpoint)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api_bad_response(
                endpoint,
                status.as_str(),
                response.text().await.ok(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e.without_url()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, query: &str) -> AppResult<Option<GeocodeResult>> {
        let response: GeocodeResponse = self
            .get_json(
                GEOCODE_ENDPOINT,
                &[("address", query), ("language", self.language.as_str())],
            )
            .await?;

        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().next().map(|r| GeocodeResult {
                lat: r.geometry.location.lat,
                lng: r.geometry.location.lng,
                formatted_address: r.formatted_address,
            })),
            "ZERO_RESULTS" => Ok(None),
            other => Err(AppError::api_bad_response(
                GEOCODE_ENDPOINT,
                other,
                response.error_message,
            )),
        }
    }
}

#[async_trait]
impl DirectionsApi for GoogleMapsClient {
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: &str,
        alternatives: bool,
    ) -> AppResult<Vec<DirectionsRoute>> {
        let alternatives = if alternatives { "true" } else { "false" };
        let response: DirectionsResponse = self
            .get_json(
                DIRECTIONS_ENDPOINT,
                &[
                    ("origin", origin),
                    ("destination", destination),
                    ("mode", mode),
                    ("alternatives", alternatives),
                    ("language", self.language.as_str()),
                ],
            )
            .await?;

        debug!("路线查询状态: {} ({} 条)", response.status, response.routes.len());

        match response.status.as_str() {
            "OK" => Ok(response.routes.into_iter().map(RouteEntry::into_route).collect()),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(Vec::new()),
            other => Err(AppError::api_bad_response(
                DIRECTIONS_ENDPOINT,
                other,
                response.error_message,
            )),
        }
    }
}

#[async_trait]
impl StaticMapApi for GoogleMapsClient {
    async fn static_map(&self, request: &StaticMapRequest) -> AppResult<Vec<u8>> {
        self.ensure_api_key()?;

        let mut params = request.query_params();
        params.push(("language", self.language.clone()));
        params.push(("key", self.api_key.clone()));

        let response = self
            .http
            .get(STATIC_MAP_ENDPOINT)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(STATIC_MAP_ENDPOINT, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::api_bad_response(
                STATIC_MAP_ENDPOINT,
                status.as_str(),
                response.text().await.ok(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(STATIC_MAP_ENDPOINT, e.without_url()))?;
        Ok(bytes.to_vec())
    }
}

/// 组合 Google Maps 导航网址
///
/// 网址中的起终点会被正确编码
pub fn directions_page_url(origin: &str, destination: &str) -> AppResult<String> {
    let url = Url::parse_with_params(
        DIRECTIONS_PAGE,
        &[
            ("api", "1"),
            ("origin", origin),
            ("destination", destination),
            ("travelmode", "driving"),
        ],
    )
    .map_err(|e| {
        AppError::Api(ApiError::BadResponse {
            endpoint: DIRECTIONS_PAGE.to_string(),
            status: "INVALID_URL".to_string(),
            message: Some(e.to_string()),
        })
    })?;
    Ok(url.to_string())
}

// ========== 响应结构 ==========

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    #[serde(default)]
    overview_polyline: Option<Polyline>,
    #[serde(default)]
    legs: Vec<LegEntry>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: u64,
}

#[derive(Debug, Deserialize)]
struct LegEntry {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
struct StepEntry {
    #[serde(default)]
    html_instructions: String,
    distance: TextValue,
}

impl RouteEntry {
    fn into_route(self) -> DirectionsRoute {
        DirectionsRoute {
            overview_polyline: self.overview_polyline.map(|p| p.points).unwrap_or_default(),
            legs: self
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    distance_meters: leg.distance.value,
                    duration_text: leg.duration.text,
                    duration_seconds: leg.duration.value,
                    steps: leg
                        .steps
                        .into_iter()
                        .map(|step| RouteStep {
                            html_instructions: step.html_instructions,
                            distance_text: step.distance.text,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
