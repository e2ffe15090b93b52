//! twsa-dash library - Tweet sentiment dashboard
//!
//! Reads tweet records from the record store, aggregates them into sentiment
//! counts, a sentiment-over-time series, and a word corpus, and serves the
//! resulting charts as HTML pages with embedded PNG images.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use twsa_common::config::DashboardConfig;
use twsa_common::RecordStore;

pub mod api;
pub mod charts;
pub mod csv_io;
pub mod error;
pub mod pipeline;
pub mod preview;

use charts::ChartRenderer;
use pipeline::Limits;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store; the only state shared between requests
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<DashboardConfig>,
    pub renderer: Arc<ChartRenderer>,
}

impl AppState {
    /// Create application state, registering the chart font
    pub fn new(store: Arc<dyn RecordStore>, config: DashboardConfig) -> Self {
        let renderer = ChartRenderer::new(config.chart.clone());
        Self::with_renderer(store, config, renderer)
    }

    pub fn with_renderer(
        store: Arc<dyn RecordStore>,
        config: DashboardConfig,
        renderer: ChartRenderer,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            renderer: Arc::new(renderer),
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_records: self.config.max_records,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let pages = Router::new()
        .route("/", get(api::home_page))
        .route("/dashboard", get(api::dashboard_page))
        .route("/tweets_table", get(api::tweets_table))
        .route("/tweets_table/all", get(api::tweets_table_all))
        .route(
            "/upload",
            get(api::upload_form_page)
                .post(api::upload_csv)
                .layer(DefaultBodyLimit::max(api::transfer::MAX_UPLOAD_BYTES)),
        )
        .route("/download_csv", get(api::download_csv));

    let json = Router::new()
        .route("/api/records", get(api::list_records))
        .route("/api/summary", get(api::summary))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(pages)
        .merge(json)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
