//! 地图图片服务 - 业务能力层
//!
//! 依序尝试互动截图、含备选路线的静态地图、精简静态地图，
//! 第一个成功的层级产生图片后再加上文字标注。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::clients::{RouteCapture, StaticMapApi};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, BrowserError};
use crate::models::{MapArtifact, MarkerStyle, PathStyle, RenderTier, RouteDetail, StaticMapRequest};
use crate::services::map_overlay::{MapOverlay, OverlayText};

static ARTIFACT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// 静态地图参数
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub map_type: String,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: PathBuf::from(&config.maps_output_dir),
            width: config.static_map_width,
            height: config.static_map_height,
            map_type: config.static_map_type.clone(),
        }
    }
}

/// 地图图片服务
pub struct MapRenderer {
    capture: Arc<dyn RouteCapture>,
    static_maps: Arc<dyn StaticMapApi>,
    overlay: MapOverlay,
    settings: RenderSettings,
}

impl MapRenderer {
    pub fn new(
        capture: Arc<dyn RouteCapture>,
        static_maps: Arc<dyn StaticMapApi>,
        overlay: MapOverlay,
        settings: RenderSettings,
    ) -> Self {
        Self {
            capture,
            static_maps,
            overlay,
            settings,
        }
    }

    /// 产生路线地图
    ///
    /// # 参数
    /// - `route`: 路线资讯
    /// - `origin` / `destination`: 实际使用的起终点地址
    /// - `distance_km`: 标注用的距离
    ///
    /// # 返回
    /// 每次调用都产生新文件；三个层级都失败时返回 `None`
    pub async fn render(
        &self,
        route: &RouteDetail,
        origin: &str,
        destination: &str,
        distance_km: f64,
    ) -> Option<MapArtifact> {
        if let Err(e) = tokio::fs::create_dir_all(&self.settings.output_dir).await {
            error!(
                "❌ 无法建立地图目录 {}: {}",
                self.settings.output_dir.display(),
                e
            );
            return None;
        }

        for tier in RenderTier::ORDER {
            let generated_at = Local::now();
            match self
                .try_tier(tier, route, origin, destination, generated_at)
                .await
            {
                Ok(path) => {
                    info!("🗺️ 地图产生成功 [{}]: {}", tier, path.display());
                    let annotated = self
                        .annotate(&path, route, origin, destination, distance_km, generated_at)
                        .await;
                    return Some(MapArtifact {
                        path,
                        tier,
                        annotated,
                        distance_km,
                        origin_address: origin.to_string(),
                        destination_address: destination.to_string(),
                        generated_at,
                    });
                }
                Err(e) => warn!("⚠️ 地图层级 [{}] 失败，尝试下一层: {}", tier, e),
            }
        }

        error!("❌ 所有地图层级都失败: {} -> {}", origin, destination);
        None
    }

    async fn try_tier(
        &self,
        tier: RenderTier,
        route: &RouteDetail,
        origin: &str,
        destination: &str,
        generated_at: DateTime<Local>,
    ) -> AppResult<PathBuf> {
        match tier {
            RenderTier::InteractiveCapture => {
                let path = self.artifact_path(tier, origin, destination, generated_at, "png");
                let result = self.capture.capture(origin, destination, &path).await;
                match result.and_then(|_| ensure_written(&path)) {
                    Ok(()) => Ok(path),
                    Err(e) => {
                        discard(&path).await;
                        Err(e)
                    }
                }
            }
            RenderTier::StaticWithOverlay | RenderTier::StaticMinimal => {
                let request = self.static_request(tier, route, origin, destination);
                let bytes = self.static_maps.static_map(&request).await?;
                let format = image::guess_format(&bytes).map_err(|_| ApiError::NotAnImage {
                    endpoint: "staticmap".to_string(),
                    length: bytes.len(),
                })?;
                let extension = format.extensions_str().first().copied().unwrap_or("png");
                let path = self.artifact_path(tier, origin, destination, generated_at, extension);
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                Ok(path)
            }
        }
    }

    fn static_request(
        &self,
        tier: RenderTier,
        route: &RouteDetail,
        origin: &str,
        destination: &str,
    ) -> StaticMapRequest {
        let mut paths = Vec::new();
        let mut markers = Vec::new();

        if !route.polyline.is_empty() {
            paths.push(PathStyle::primary(&route.polyline));
        }
        if tier == RenderTier::StaticWithOverlay {
            paths.extend(route.alternative_polylines.iter().map(PathStyle::alternative));
            markers.push(MarkerStyle::new("green", 'A', origin));
            markers.push(MarkerStyle::new("red", 'B', destination));
        }

        StaticMapRequest {
            width: self.settings.width,
            height: self.settings.height,
            map_type: self.settings.map_type.clone(),
            paths,
            markers,
        }
    }

    /// 产生不会重复的文件路径
    fn artifact_path(
        &self,
        tier: RenderTier,
        origin: &str,
        destination: &str,
        generated_at: DateTime<Local>,
        extension: &str,
    ) -> PathBuf {
        let sequence = ARTIFACT_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        let stamp = generated_at.format("%Y%m%d_%H%M%S_%3f");

        let mut hasher = Sha256::new();
        hasher.update(origin.as_bytes());
        hasher.update(b"|");
        hasher.update(destination.as_bytes());
        hasher.update(generated_at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
        let salt: String = hasher
            .finalize()
            .iter()
            .take(4)
            .map(|b| format!("{b:02x}"))
            .collect();

        self.settings.output_dir.join(format!(
            "{}_{}_{}_{}.{}",
            tier.file_prefix(),
            stamp,
            salt,
            sequence,
            extension
        ))
    }

    /// 在阻塞线程上标注，失败只记录日志，原图保持可用
    async fn annotate(
        &self,
        path: &Path,
        route: &RouteDetail,
        origin: &str,
        destination: &str,
        distance_km: f64,
        generated_at: DateTime<Local>,
    ) -> bool {
        let text = OverlayText {
            distance_km,
            duration_text: Some(route.duration_text.clone()),
            origin_address: origin.to_string(),
            destination_address: destination.to_string(),
            generated_at,
        };
        let overlay = self.overlay.clone();
        let target = path.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || overlay.annotate(&target, &text)).await;

        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("⚠️ 地图标注失败，保留原图: {}", e);
                false
            }
            Err(e) => {
                warn!("⚠️ 地图标注任务中断，保留原图: {}", e);
                false
            }
        }
    }
}

fn ensure_written(path: &Path) -> AppResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(BrowserError::MissingOutput {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

async fn discard(path: &Path) {
    if tokio::fs::remove_file(path).await.is_ok() {
        debug!("已删除不完整的截图: {}", path.display());
    }
}
