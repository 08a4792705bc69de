//! 有时间上限的隔离执行器
//!
//! 无头浏览器截图需要自己的事件循环。任务放到独立线程上的新运行时
//! 执行，调用方最多等待 `timeout + grace`。调用方放弃等待后任务仍会
//! 执行到结束，任务自己的收尾步骤（例如关闭浏览器）不会被中断。

use std::future::Future;
use std::sync::mpsc;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, warn};

use crate::error::{AppResult, WorkerError};

/// 执行异步任务，并保证调用方在限定时间内返回
///
/// # 参数
/// - `label`: 任务名称，用于日志与线程名
/// - `timeout`: 任务预计最长耗时，任务自身应在此之内结束
/// - `grace`: 额外等待的缓冲时间
/// - `task`: 产生 future 的闭包，future 在新的运行时中执行
///
/// # 返回
/// 任务结果；超过 `timeout + grace` 返回 `WorkerError::TimedOut`
pub fn run_bounded<T, F, Fut>(
    label: &str,
    timeout: Duration,
    grace: Duration,
    task: F,
) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + 'static,
{
    if Handle::try_current().is_ok() {
        debug!("任务 {} 在独立线程执行（调用方位于运行时中）", label);
    } else {
        debug!("任务 {} 在独立线程执行", label);
    }

    let (tx, rx) = mpsc::channel();
    let thread_label = label.to_string();

    std::thread::Builder::new()
        .name(format!("worker-{label}"))
        .spawn(move || {
            let result = build_runtime(&thread_label).and_then(|runtime| runtime.block_on(task()));
            // 调用方可能已经放弃等待
            if tx.send(result).is_err() {
                debug!("任务 {} 在调用方放弃等待后才结束", thread_label);
            }
        })
        .map_err(|e| WorkerError::SpawnFailed {
            label: label.to_string(),
            source: Box::new(e),
        })?;

    let limit = timeout + grace;
    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!("任务 {} 超过 {:?} 仍未结束，放弃等待", label, limit);
            Err(WorkerError::TimedOut {
                label: label.to_string(),
                timeout: limit,
            }
            .into())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(WorkerError::Disconnected {
            label: label.to_string(),
        }
        .into()),
    }
}

fn build_runtime(label: &str) -> AppResult<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            WorkerError::SpawnFailed {
                label: label.to_string(),
                source: Box::new(e),
            }
            .into()
        })
}
