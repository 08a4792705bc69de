use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 地图服务 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 路线计算错误
    #[error("路线错误: {0}")]
    Route(#[from] RouteError),
    /// 地图图片生成错误
    #[error("地图错误: {0}")]
    Render(#[from] RenderError),
    /// 隔离线程执行错误
    #[error("执行器错误: {0}")]
    Worker(#[from] WorkerError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {source}")]
    LaunchFailed { source: BoxError },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 创建上下文或页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed { source: BoxError },
    /// 导航失败
    #[error("导航到 {url} 失败: {message}")]
    NavigationFailed { url: String, message: String },
    /// 截图失败
    #[error("截图失败: {source}")]
    ScreenshotFailed { source: BoxError },
    /// 页面操作超过时间上限
    #[error("页面操作超过 {limit:?} 仍未完成")]
    PageTimedOut { limit: Duration },
    /// 截图文件没有生成
    #[error("截图文件不存在或为空: {}", path.display())]
    MissingOutput { path: PathBuf },
    /// 已在配置中关闭
    #[error("互动截图已停用")]
    Disabled,
    /// 其他 CDP 协议错误
    #[error("CDP 协议错误: {source}")]
    Protocol { source: BoxError },
}

/// 地图服务 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed { endpoint: String, source: BoxError },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: String,
        message: Option<String>,
    },
    /// 返回内容不是图片
    #[error("API返回的内容不是图片 ({endpoint}): {length} bytes")]
    NotAnImage { endpoint: String, length: usize },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed { source: BoxError },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxError },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxError },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed { path: String, source: BoxError },
}

/// 路线计算错误
#[derive(Debug, Error)]
pub enum RouteError {
    /// 服务商没有返回任何路线
    #[error("无法取得路线，请检查地址是否正确: {origin} -> {destination}")]
    NoRoute { origin: String, destination: String },
    /// 路线缺少 leg 资料
    #[error("路线缺少行程段资料: {origin} -> {destination}")]
    MissingLeg { origin: String, destination: String },
}

/// 地图图片生成错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 找不到可用字体
    #[error("找不到可用的字体文件")]
    FontUnavailable,
    /// 字体文件无法解析
    #[error("字体无法解析: {source}")]
    InvalidFont { source: BoxError },
    /// 图片编解码失败
    #[error("图片处理失败 ({}): {source}", path.display())]
    ImageFailed { path: PathBuf, source: BoxError },
}

/// 隔离线程执行错误
#[derive(Debug, Error)]
pub enum WorkerError {
    /// 任务超时
    #[error("任务 {label} 超时 ({timeout:?})")]
    TimedOut { label: String, timeout: Duration },
    /// 工作线程意外结束
    #[error("任务 {label} 的工作线程意外结束")]
    Disconnected { label: String },
    /// 无法创建线程或运行时
    #[error("无法启动任务 {label}: {source}")]
    SpawnFailed { label: String, source: BoxError },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 批次为空
    #[error("没有提供资料")]
    EmptyBatch,
    /// 缺少起点或终点
    #[error("缺少起点或终点")]
    MissingEndpoint,
    /// 起点终点完全相同
    #[error("起点和终点完全相同: {name}")]
    IdenticalEndpoints { name: String },
    /// 距离为 0
    #[error("计算结果为 0 公里，请检查地址是否正确: {origin} -> {destination}")]
    ZeroDistance { origin: String, destination: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未设置地图服务 API Key
    #[error("Google Maps API Key 未设定")]
    MissingApiKey,
    /// HTTP 客户端初始化失败
    #[error("HTTP 客户端初始化失败: {source}")]
    HttpClient { source: BoxError },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Protocol {
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| format!("{}{}", url.origin().ascii_serialization(), url.path()))
            .unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            // 网址带有 API Key，不放进错误讯息
            source: Box::new(err.without_url()),
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Render(RenderError::ImageFailed {
            path: PathBuf::new(),
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应
    pub fn api_bad_response(
        endpoint: impl Into<String>,
        status: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status: status.into(),
            message,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片处理错误
    pub fn image_failed(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Render(RenderError::ImageFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
