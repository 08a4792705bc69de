//! 应用入口 - 编排层
//!
//! 组装所有服务，读取批次输入，写出结果与警告文件

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::HeadlessCapture;
use crate::clients::GoogleMapsClient;
use crate::config::Config;
use crate::models::{load_batch_request, load_place_table, write_batch_result, BatchResult};
use crate::orchestrator::batch_processor::BatchOrchestrator;
use crate::services::{
    AddressResolver, MapOverlay, MapRenderer, MileageAudit, PlaceTable, RenderSettings,
    RouteResolver, WarnWriter,
};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::RecordFlow;

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: BatchOrchestrator,
    audit: MileageAudit,
    warn_writer: WarnWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        if !config.has_api_key() {
            warn!("⚠️ 未设置 GOOGLE_MAPS_API_KEY，所有地图服务调用都会失败");
        }

        let client = Arc::new(GoogleMapsClient::new(&config)?);

        let places = Arc::new(PlaceTable::with_defaults());
        let extra = load_place_table(Path::new(&config.place_table_file))
            .await
            .with_context(|| format!("无法加载地点对应表: {}", config.place_table_file))?;
        places.extend(extra);
        info!("📚 地点对应表共 {} 笔", places.len());

        let addresses = Arc::new(AddressResolver::new(client.clone(), places.clone()));
        let routes = Arc::new(RouteResolver::new(client.clone(), config.travel_mode.clone()));
        let renderer = Arc::new(MapRenderer::new(
            Arc::new(HeadlessCapture::new(&config)),
            client,
            MapOverlay::load(config.map_font_path.as_deref()),
            RenderSettings::from_config(&config),
        ));

        let flow = RecordFlow::new(addresses.clone(), routes.clone(), renderer);
        let orchestrator = BatchOrchestrator::new(flow, places);
        let audit = MileageAudit::new(addresses, routes);
        let warn_writer = WarnWriter::with_path(config.warn_file.clone());

        Ok(Self {
            config,
            orchestrator,
            audit,
            warn_writer,
        })
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    pub fn mileage_audit(&self) -> &MileageAudit {
        &self.audit
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchResult> {
        info!("\n📁 正在读取批次输入: {}", self.config.input_file);
        let request = load_batch_request(Path::new(&self.config.input_file))
            .await
            .with_context(|| format!("无法读取批次输入: {}", self.config.input_file))?;

        let fixed_origin = choose_fixed_origin(
            request.fixed_origin.as_deref(),
            self.config.fixed_origin.as_deref(),
        );

        let result = self
            .orchestrator
            .process_batch(request.records, fixed_origin)
            .await?;

        write_batch_result(Path::new(&self.config.output_file), &result).await?;
        self.warn_writer.write_all(&result.errors)?;

        info!("{}", result.message());
        print_final_stats(&result, &self.config.output_log_file);

        Ok(result)
    }
}

/// 输入文件中的固定起点优先于环境变量，空白值视为未设置
fn choose_fixed_origin<'a>(from_file: Option<&'a str>, from_env: Option<&'a str>) -> Option<&'a str> {
    let present = |value: Option<&'a str>| value.map(str::trim).filter(|v| !v.is_empty());
    present(from_file).or_else(|| present(from_env))
}
