//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 组装客户端、服务与流程
//! - 读取批次输入，写出结果与 warn 文件
//! - 输出全局统计信息
//!
//! ### `batch_processor` - 批量记录处理器
//! - 依序处理每条记录（`Vec<TravelRecord>`）
//! - 隔离单条记录的失败，汇总错误讯息
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! batch_processor (处理 Vec<TravelRecord>)
//!     ↓
//! workflow::RecordFlow (处理单条记录)
//!     ↓
//! services (能力层：地址 / 路线 / 地图)
//!     ↓
//! clients / browser / infrastructure
//! ```

pub mod app;
pub mod batch_processor;

// 重新导出主要类型
pub use app::App;
pub use batch_processor::{record_error_message, BatchOrchestrator};
