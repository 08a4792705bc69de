//! # Route Mileage
//!
//! 出差记录的批次里程计算：解析地点、查询路线、产生带标注的路线地图
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，数据只向下流动：
//!
//! ### ① 基础设施层（Infrastructure / Clients / Browser）
//! - `clients/` - 外部服务的 trait 与 Google Maps 实现
//! - `browser/` - 无头浏览器截图
//! - `infrastructure/` - 有时间上限的隔离执行器
//!
//! ### ② 业务能力层（Services）
//! - `AddressResolver` - 固定起点 → 地理编码 → 地点对应表 → 原始名称
//! - `RouteResolver` - 主路线与备选路线
//! - `MapRenderer` - 互动截图 → 静态地图 → 精简静态地图，再加标注
//! - `MileageAudit` / `WarnWriter`
//!
//! ### ③ 流程层（Workflow）
//! - `RecordCtx` - 记录上下文（序号 + 起终点名称）
//! - `RecordFlow` - 单条记录的完整计算流程
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchOrchestrator` - 批次处理与错误隔离
//! - `App` - 命令行入口
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{BatchResult, MapArtifact, ResolvedAddress, RouteDetail, TravelRecord};
pub use orchestrator::{App, BatchOrchestrator};
pub use workflow::{RecordCtx, RecordFlow};
