use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 地图服务配置 ---
    /// Google Maps API Key，留空时所有地图服务调用都会返回配置错误
    pub google_maps_api_key: String,
    /// 地理编码与路线文字使用的语言
    pub maps_language: String,
    /// 路线交通方式
    pub travel_mode: String,
    /// HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    pub static_map_width: u32,
    pub static_map_height: u32,
    pub static_map_type: String,
    /// 地图图片输出目录
    pub maps_output_dir: String,
    /// 字体文件路径（用于在地图上标注文字）
    pub map_font_path: Option<String>,

    // --- 无头浏览器配置 ---
    /// 是否启用互动截图（第一层）
    pub interactive_capture: bool,
    /// 浏览器可执行文件路径，留空时自动寻找
    pub chrome_executable: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// 页面导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 等待路线面板出现的最长时间（毫秒）
    pub selector_wait_ms: u64,
    /// 导航完成后的固定等待（毫秒）
    pub settle_ms: u64,
    /// 截图前的固定等待（毫秒）
    pub final_settle_ms: u64,
    /// 工作线程额外给予的缓冲时间（秒）
    pub capture_grace_secs: u64,

    // --- 批次输入输出 ---
    /// 地点对应表（TOML）
    pub place_table_file: String,
    pub input_file: String,
    pub output_file: String,
    /// 固定起点地址
    pub fixed_origin: Option<String>,

    // --- 日志 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    /// 失败记录写入的文件
    pub warn_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_maps_api_key: String::new(),
            maps_language: "zh-TW".to_string(),
            travel_mode: "driving".to_string(),
            http_timeout_secs: 30,
            static_map_width: 800,
            static_map_height: 600,
            static_map_type: "roadmap".to_string(),
            maps_output_dir: "temp/maps".to_string(),
            map_font_path: None,
            interactive_capture: true,
            chrome_executable: None,
            viewport_width: 1500,
            viewport_height: 750,
            navigation_timeout_ms: 30_000,
            selector_wait_ms: 15_000,
            settle_ms: 3_000,
            final_settle_ms: 10_000,
            capture_grace_secs: 30,
            place_table_file: "places.toml".to_string(),
            input_file: "records.json".to_string(),
            output_file: "records_computed.json".to_string(),
            fixed_origin: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            google_maps_api_key: env_string("GOOGLE_MAPS_API_KEY", default.google_maps_api_key),
            maps_language: env_string("MAPS_LANGUAGE", default.maps_language),
            travel_mode: env_string("TRAVEL_MODE", default.travel_mode),
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", default.http_timeout_secs),
            static_map_width: env_parse("STATIC_MAP_WIDTH", default.static_map_width),
            static_map_height: env_parse("STATIC_MAP_HEIGHT", default.static_map_height),
            static_map_type: env_string("STATIC_MAP_TYPE", default.static_map_type),
            maps_output_dir: env_string("MAPS_OUTPUT_DIR", default.maps_output_dir),
            map_font_path: env_optional("MAP_FONT_PATH").or(default.map_font_path),
            interactive_capture: env_parse("INTERACTIVE_CAPTURE", default.interactive_capture),
            chrome_executable: env_optional("CHROME_EXECUTABLE").or(default.chrome_executable),
            viewport_width: env_parse("VIEWPORT_WIDTH", default.viewport_width),
            viewport_height: env_parse("VIEWPORT_HEIGHT", default.viewport_height),
            navigation_timeout_ms: env_parse("NAVIGATION_TIMEOUT_MS", default.navigation_timeout_ms),
            selector_wait_ms: env_parse("SELECTOR_WAIT_MS", default.selector_wait_ms),
            settle_ms: env_parse("SETTLE_MS", default.settle_ms),
            final_settle_ms: env_parse("FINAL_SETTLE_MS", default.final_settle_ms),
            capture_grace_secs: env_parse("CAPTURE_GRACE_SECS", default.capture_grace_secs),
            place_table_file: env_string("PLACE_TABLE_FILE", default.place_table_file),
            input_file: env_string("INPUT_FILE", default.input_file),
            output_file: env_string("OUTPUT_FILE", default.output_file),
            fixed_origin: env_optional("FIXED_ORIGIN").or(default.fixed_origin),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
            output_log_file: env_string("OUTPUT_LOG_FILE", default.output_log_file),
            warn_file: env_string("WARN_FILE", default.warn_file),
        }
    }

    /// 是否已设置 API Key
    pub fn has_api_key(&self) -> bool {
        !self.google_maps_api_key.trim().is_empty()
    }
}

fn env_string(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// 空字符串视为未设置
fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
