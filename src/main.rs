// src/main.rs

use axum::{Router, routing::post, serve};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

mod api;
mod config;
mod exclusion;
mod logging;
mod mock_store;
mod model;
mod resource;
mod serving;
mod store;

use config::{PipelineVersion, ServingConfig};
use logging::runtime_logger::RuntimeLogger;
use mock_store::{InMemoryAdEventStore, InMemoryBrowsingHistory, InMemoryCreativeAdStore};
use resource::adapters::{FileResourceAdapter, ResourceAdapter};
use resource::{AntiTargetingResource, SubdivisionTargetingResource};
use store::{AdEventStore, BrowsingHistoryProvider, CreativeAdStore};

#[derive(Clone)]
pub struct AppState {
    pub runtime_logger: Arc<RuntimeLogger>,
    pub config: Arc<ServingConfig>,
    pub ad_event_store: Arc<dyn AdEventStore>,
    pub browsing_history_provider: Arc<dyn BrowsingHistoryProvider>,
    pub creative_ad_store: Arc<dyn CreativeAdStore>,
    pub anti_targeting: Arc<AntiTargetingResource>,
    pub subdivision: Arc<SubdivisionTargetingResource>,
}

#[derive(Parser, Debug)]
#[command(version = "1.0", about = "Ad eligibility-and-exclusion serving core")]
struct CliArgs {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// 管线版本：v1 / v2 / v3
    #[arg(long, default_value = "v2")]
    pipeline_version: PipelineVersion,
    /// dismissed 排除规则的时间窗口（小时），0 表示停用
    #[arg(long, default_value_t = 48)]
    dismissed_window_hours: i64,
    /// 浏览历史最大条数
    #[arg(long, default_value_t = 5000)]
    browsing_history_max_count: usize,
    /// 浏览历史最大时效（天）
    #[arg(long, default_value_t = 180)]
    browsing_history_max_age_days: u32,
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let log_file = rolling::hourly(&args.log_dir, "serving_log.json");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber)
        .expect("Unable to set global tracing subscriber");
    info!("Ad serving core starting on port {}", args.port);

    // 初始化运行日志记录器
    let runtime_logger = RuntimeLogger::new(&args.log_dir, "serving", 1000, 100, 1000);
    runtime_logger.log("INFO", "Ad serving core is starting...").await;

    // serving 配置在启动时定型，之后只读共享
    let config = Arc::new(ServingConfig {
        version: args.pipeline_version,
        dismissed_window_hours: args.dismissed_window_hours,
        browsing_history_max_count: args.browsing_history_max_count,
        browsing_history_max_age_days: args.browsing_history_max_age_days,
        ..Default::default()
    });

    // 从 /static 目录加载共享资源快照（所有并发 serving 只读共享，绝不变更）
    let adapter = FileResourceAdapter::new(
        "static/anti_targeting.json",
        "static/subdivision_targeting.json",
    );
    let anti_targeting = Arc::new(AntiTargetingResource::new(adapter.get_anti_targeting()));
    let subdivision = Arc::new(SubdivisionTargetingResource::new(adapter.get_subdivision()));

    // 初始化演示用的内存协作方（随机目录 + 预置事件历史）
    let catalog = mock_store::init_catalog();
    let ad_events = mock_store::seed_ad_events(&catalog);
    let state = Arc::new(AppState {
        runtime_logger: runtime_logger.clone(),
        config,
        ad_event_store: Arc::new(InMemoryAdEventStore::new(ad_events)),
        browsing_history_provider: Arc::new(InMemoryBrowsingHistory::new(vec![
            "https://example.com/".to_string(),
            "https://news.example.org/tech".to_string(),
        ])),
        creative_ad_store: Arc::new(InMemoryCreativeAdStore::new(catalog)),
        anti_targeting,
        subdivision,
    });

    let serving_server = tokio::spawn({
        let state = state.clone();
        let port = args.port;
        let runtime_logger = runtime_logger.clone();
        async move {
            let app = Router::new()
                .route("/serve", post(api::handlers::handle_serve_request))
                .with_state(state);
            let addr = format!("0.0.0.0:{}", port);
            runtime_logger
                .log("INFO", &format!("Serving core running at http://{}", addr))
                .await;
            let listener = TcpListener::bind(&addr).await.unwrap();
            serve(listener, app).await.unwrap();
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            runtime_logger.log("INFO", "Shutting down gracefully...").await;
        }
    }

    runtime_logger.shutdown().await;
    serving_server.abort();
    runtime_logger.log("INFO", "Ad serving core shut down.").await;
}
