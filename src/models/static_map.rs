//! 静态地图请求参数

/// 地图上的一条路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStyle {
    /// 颜色，格式为 `0xRRGGBBAA`
    pub color: String,
    pub weight: u32,
    /// 编码路径
    pub encoded: String,
}

impl PathStyle {
    pub fn primary(encoded: impl Into<String>) -> Self {
        Self {
            color: "0x4285F4FF".to_string(),
            weight: 6,
            encoded: encoded.into(),
        }
    }

    /// 备选路线使用较淡的颜色与较细的线
    pub fn alternative(encoded: impl Into<String>) -> Self {
        Self {
            color: "0x9AA0A6AA".to_string(),
            weight: 4,
            encoded: encoded.into(),
        }
    }

    /// 转换为 `path=` 参数值
    pub fn to_param(&self) -> String {
        format!("color:{}|weight:{}|enc:{}", self.color, self.weight, self.encoded)
    }
}

/// 地图上的标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub color: String,
    pub label: char,
    /// 地址或 `lat,lng`
    pub location: String,
}

impl MarkerStyle {
    pub fn new(color: impl Into<String>, label: char, location: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label,
            location: location.into(),
        }
    }

    /// 转换为 `markers=` 参数值
    pub fn to_param(&self) -> String {
        format!("color:{}|label:{}|{}", self.color, self.label, self.location)
    }
}

/// 静态地图请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMapRequest {
    pub width: u32,
    pub height: u32,
    pub map_type: String,
    pub paths: Vec<PathStyle>,
    pub markers: Vec<MarkerStyle>,
}

impl StaticMapRequest {
    /// 组合成查询参数（同名参数可重复出现）
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("size", format!("{}x{}", self.width, self.height)),
            ("maptype", self.map_type.clone()),
        ];
        params.extend(self.paths.iter().map(|p| ("path", p.to_param())));
        params.extend(self.markers.iter().map(|m| ("markers", m.to_param())));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_repeat_paths_and_markers() {
        let request = StaticMapRequest {
            width: 800,
            height: 600,
            map_type: "roadmap".into(),
            paths: vec![PathStyle::primary("abc"), PathStyle::alternative("def")],
            markers: vec![MarkerStyle::new("green", 'A', "台北101")],
        };

        let params = request.query_params();

        assert_eq!(params[0], ("size", "800x600".to_string()));
        assert_eq!(params[1], ("maptype", "roadmap".to_string()));
        assert_eq!(params[2], ("path", "color:0x4285F4FF|weight:6|enc:abc".to_string()));
        assert_eq!(params[3], ("path", "color:0x9AA0A6AA|weight:4|enc:def".to_string()));
        assert_eq!(params[4], ("markers", "color:green|label:A|台北101".to_string()));
    }
}
