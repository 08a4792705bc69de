//! Google Maps 路线页面截图
//!
//! 每次截图都启动独立的无头浏览器，结束后依次关闭页面、上下文与浏览器。

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::headless::launch_headless_browser;
use crate::clients::{directions_page_url, RouteCapture};
use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError, WorkerError};
use crate::infrastructure::run_bounded;

/// 路线面板已经出现的标志
const ROUTE_READY_SELECTORS: [&str; 6] = [
    r#"div[role="main"]"#,
    r#"[data-value="駕車"]"#,
    r#"[aria-label*="分鐘"]"#,
    r#"[aria-label*="公里"]"#,
    "canvas",
    r#"[jsaction*="route"]"#,
];

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(500);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);
/// 截图与写文件的预留时间
const SCREENSHOT_ALLOWANCE: Duration = Duration::from_secs(10);
/// 启动浏览器、建立上下文与关闭浏览器的预留时间
const SESSION_OVERHEAD: Duration = Duration::from_secs(15);

/// 截图参数
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_executable: Option<String>,
    pub navigation_timeout: Duration,
    pub selector_wait: Duration,
    pub settle: Duration,
    pub final_settle: Duration,
    pub grace: Duration,
}

impl CaptureOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chrome_executable: config.chrome_executable.clone(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            selector_wait: Duration::from_millis(config.selector_wait_ms),
            settle: Duration::from_millis(config.settle_ms),
            final_settle: Duration::from_millis(config.final_settle_ms),
            grace: Duration::from_secs(config.capture_grace_secs),
        }
    }

    /// 页面操作（导航到截图完成）的时间上限
    pub fn page_budget(&self) -> Duration {
        self.navigation_timeout
            + self.settle
            + self.selector_wait
            + SELECTOR_POLL_INTERVAL
            + self.final_settle
            + SCREENSHOT_ALLOWANCE
    }

    /// 一次截图预计最多花费的时间，包括启动与关闭浏览器（不含缓冲）
    pub fn time_budget(&self) -> Duration {
        self.page_budget() + SESSION_OVERHEAD
    }
}

/// 打开导航页面并截图
///
/// 页面操作超时、失败或成功后，都会依次关闭页面、上下文与浏览器
pub async fn capture_route_screenshot(
    options: &CaptureOptions,
    url: &str,
    output: &Path,
) -> AppResult<()> {
    let (mut browser, handler) = launch_headless_browser(options).await?;

    let result = capture_in_session(&mut browser, options, url, output).await;

    if let Err(e) = browser.close().await {
        debug!("关闭浏览器失败: {}", e);
    }
    if let Err(e) = browser.wait().await {
        debug!("等待浏览器退出失败: {}", e);
    }
    sleep(SHUTDOWN_GRACE).await;
    handler.abort();

    result
}

async fn capture_in_session(
    browser: &mut Browser,
    options: &CaptureOptions,
    url: &str,
    output: &Path,
) -> AppResult<()> {
    let context_id = browser
        .create_browser_context(CreateBrowserContextParams::default())
        .await
        .map_err(|e| BrowserError::PageCreationFailed {
            source: Box::new(e),
        })?;

    let params = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id.clone())
        .build()
        .map_err(|message| BrowserError::ConfigurationFailed { message })?;

    let page = match browser.new_page(params).await {
        Ok(page) => page,
        Err(e) => {
            if let Err(dispose) = browser.dispose_browser_context(context_id).await {
                debug!("释放浏览器上下文失败: {}", dispose);
            }
            return Err(BrowserError::PageCreationFailed {
                source: Box::new(e),
            }
            .into());
        }
    };

    let result = within(
        options.page_budget(),
        capture_page(&page, options, url, output),
    )
    .await;

    if let Err(e) = page.close().await {
        debug!("关闭页面失败: {}", e);
    }
    if let Err(e) = browser.dispose_browser_context(context_id).await {
        debug!("释放浏览器上下文失败: {}", e);
    }

    result
}

async fn capture_page(
    page: &Page,
    options: &CaptureOptions,
    url: &str,
    output: &Path,
) -> AppResult<()> {
    debug!("导航到: {}", url);
    match tokio::time::timeout(options.navigation_timeout, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            return Err(BrowserError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            }
            .into())
        }
        Err(_) => {
            return Err(BrowserError::NavigationFailed {
                url: url.to_string(),
                message: format!("超过 {:?} 未完成载入", options.navigation_timeout),
            }
            .into())
        }
    }

    sleep(options.settle).await;

    if !wait_for_route_panel(page, options.selector_wait).await {
        // 路线面板没有出现时仍然截图
        warn!("⚠️ 等待路线面板超时，仍继续截图");
    }

    sleep(options.final_settle).await;

    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .full_page(false)
        .build();
    page.save_screenshot(params, output)
        .await
        .map_err(|e| BrowserError::ScreenshotFailed {
            source: Box::new(e),
        })?;

    let written = tokio::fs::metadata(output)
        .await
        .map(|meta| meta.len() > 0)
        .unwrap_or(false);
    if !written {
        return Err(BrowserError::MissingOutput {
            path: output.to_path_buf(),
        }
        .into());
    }

    info!("📸 截图完成: {}", output.display());
    Ok(())
}

/// 给页面操作加上时间上限，超时后返回错误让调用方继续收尾
async fn within<T>(
    limit: Duration,
    step: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(limit, step).await {
        Ok(result) => result,
        Err(_) => {
            warn!("⚠️ 页面操作超过 {:?}，中止并释放资源", limit);
            Err(BrowserError::PageTimedOut { limit }.into())
        }
    }
}

/// 同步入口
///
/// 整个浏览器生命周期交给独立线程执行，调用方最多等待 `time_budget + grace`；
/// 放弃等待后浏览器仍会在该线程中关闭
pub fn capture_route_screenshot_blocking(
    options: &CaptureOptions,
    url: &str,
    output: &Path,
) -> AppResult<()> {
    let options = options.clone();
    let url = url.to_string();
    let output = output.to_path_buf();
    let timeout = options.time_budget();
    let grace = options.grace;

    run_bounded("route-capture", timeout, grace, move || async move {
        capture_route_screenshot(&options, &url, &output).await
    })
}

/// 轮询直到任一路线标志出现
async fn wait_for_route_panel(page: &Page, limit: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        for selector in ROUTE_READY_SELECTORS {
            if page.find_element(selector).await.is_ok() {
                debug!("路线面板已出现: {}", selector);
                return true;
            }
        }
        sleep(SELECTOR_POLL_INTERVAL).await;
    }
    false
}

/// 基于无头浏览器的路线截图
pub struct HeadlessCapture {
    options: CaptureOptions,
    enabled: bool,
}

impl HeadlessCapture {
    pub fn new(config: &Config) -> Self {
        Self {
            options: CaptureOptions::from_config(config),
            enabled: config.interactive_capture,
        }
    }
}

#[async_trait]
impl RouteCapture for HeadlessCapture {
    async fn capture(&self, origin: &str, destination: &str, output: &Path) -> AppResult<()> {
        if !self.enabled {
            return Err(BrowserError::Disabled.into());
        }

        let url = directions_page_url(origin, destination)?;
        let options = self.options.clone();
        let output: PathBuf = output.to_path_buf();

        tokio::task::spawn_blocking(move || {
            capture_route_screenshot_blocking(&options, &url, &output)
        })
        .await
        .map_err(|e| -> AppError {
            WorkerError::SpawnFailed {
                label: "route-capture".to_string(),
                source: Box::new(e),
            }
            .into()
        })?
    }
}
