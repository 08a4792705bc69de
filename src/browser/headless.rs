use std::path::Path;

use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::capture::CaptureOptions;
use crate::error::{AppResult, BrowserError};

/// 截图时使用的桌面版浏览器标识
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 启动无头浏览器
///
/// # 返回
/// 浏览器实例与后台事件循环的句柄，关闭浏览器后应终止该句柄
pub async fn launch_headless_browser(options: &CaptureOptions) -> AppResult<(Browser, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");

    let user_agent = format!("--user-agent={DESKTOP_USER_AGENT}");
    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .window_size(options.viewport_width, options.viewport_height)
        .viewport(Viewport {
            width: options.viewport_width,
            height: options.viewport_height,
            ..Viewport::default()
        })
        .args(vec![
            "--disable-blink-features=AutomationControlled",
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--no-sandbox",
            "--disable-gpu",
            user_agent.as_str(),
        ]);

    if let Some(executable) = &options.chrome_executable {
        debug!("使用指定的浏览器: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }

    let config = builder.build().map_err(|message| {
        error!("配置无头浏览器失败: {}", message);
        BrowserError::ConfigurationFailed { message }
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok((browser, handle))
}
