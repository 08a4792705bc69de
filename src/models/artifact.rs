use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

/// 地图图片的产生方式，按尝试顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTier {
    /// 无头浏览器截取 Google Maps 路线页面
    InteractiveCapture,
    /// 静态地图 + 主路线 + 备选路线 + 起终点标记
    StaticWithOverlay,
    /// 只有主路线的静态地图
    StaticMinimal,
}

impl RenderTier {
    pub const ORDER: [RenderTier; 3] = [
        RenderTier::InteractiveCapture,
        RenderTier::StaticWithOverlay,
        RenderTier::StaticMinimal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RenderTier::InteractiveCapture => "互动截图",
            RenderTier::StaticWithOverlay => "静态地图（含备选路线）",
            RenderTier::StaticMinimal => "精简静态地图",
        }
    }

    /// 输出文件名前缀
    pub fn file_prefix(self) -> &'static str {
        match self {
            RenderTier::InteractiveCapture => "gmap_route",
            RenderTier::StaticWithOverlay | RenderTier::StaticMinimal => "map",
        }
    }
}

impl fmt::Display for RenderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 产生的地图图片
#[derive(Debug, Clone, PartialEq)]
pub struct MapArtifact {
    pub path: PathBuf,
    pub tier: RenderTier,
    /// 是否已成功加上文字标注
    pub annotated: bool,
    pub distance_km: f64,
    pub origin_address: String,
    pub destination_address: String,
    pub generated_at: DateTime<Local>,
}

impl MapArtifact {
    /// 写回记录用的路径，统一使用 `/` 分隔
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}
