use std::fmt;

/// 地址解析层级，按尝试顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionTier {
    /// 固定起点
    FixedOrigin,
    /// 地理编码
    LiveGeocode,
    /// 地点对应表
    LookupTable,
    /// 直接使用原始名称
    Literal,
}

impl ResolutionTier {
    /// 解析顺序，前一层成功就不再尝试后面的层级
    pub const ORDER: [ResolutionTier; 4] = [
        ResolutionTier::FixedOrigin,
        ResolutionTier::LiveGeocode,
        ResolutionTier::LookupTable,
        ResolutionTier::Literal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResolutionTier::FixedOrigin => "固定起点",
            ResolutionTier::LiveGeocode => "Google Maps 地理编码",
            ResolutionTier::LookupTable => "地点对应表",
            ResolutionTier::Literal => "原始名称",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 解析后的地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// 原始地点名称
    pub name: String,
    /// 实际用于调用地图服务的地址
    pub address: String,
    /// 产生此地址的层级（只用于日志，不写回记录）
    pub tier: ResolutionTier,
}

impl ResolvedAddress {
    pub fn new(name: impl Into<String>, address: impl Into<String>, tier: ResolutionTier) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            tier,
        }
    }
}

/// 地理编码结果
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}
