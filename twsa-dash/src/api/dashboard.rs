//! Dashboard page and summary API
//!
//! Both routes run the same pipeline: fetch a bounded snapshot, aggregate it
//! with the optional keyword, and (for the page) render the three charts.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use twsa_common::db::fields;
use twsa_common::Record;

use super::ui::{escape_html, message_page, page, HtmlError};
use crate::charts::{to_data_uri, ChartRenderer, RenderError};
use crate::error::{ApiError, ApiResult};
use crate::pipeline::{aggregate, AggregateError, DerivedViews};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct KeywordQuery {
    /// Case-insensitive substring filter on tweet text
    #[serde(default)]
    pub keyword: Option<String>,
}

impl KeywordQuery {
    fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or("")
    }
}

/// Read at most one record past the cap so an oversized store is detected
/// without loading all of it
pub async fn load_snapshot(state: &AppState) -> Result<Vec<Record>, twsa_common::StoreError> {
    let limit = state.config.max_records.saturating_add(1);
    state.store.find_all(fields::DASHBOARD, Some(limit)).await
}

/// PNG data URIs of the three charts; each one may fail on its own
#[derive(Debug)]
pub struct RenderedCharts {
    pub category: Result<String, RenderError>,
    pub time_series: Result<String, RenderError>,
    pub words: Result<String, RenderError>,
}

async fn render_blocking<F>(
    renderer: Arc<ChartRenderer>,
    views: Arc<DerivedViews>,
    render: F,
) -> Result<String, RenderError>
where
    F: FnOnce(&ChartRenderer, &DerivedViews) -> Result<Vec<u8>, RenderError> + Send + 'static,
{
    let png = tokio::task::spawn_blocking(move || render(&renderer, &views))
        .await
        .map_err(|e| RenderError::Backend(format!("render task failed: {}", e)))??;
    Ok(to_data_uri(&png))
}

/// Render every chart of `views` off the async runtime
pub async fn render_charts(
    renderer: Arc<ChartRenderer>,
    views: Arc<DerivedViews>,
) -> RenderedCharts {
    let started = Instant::now();
    let (category, time_series, words) = tokio::join!(
        render_blocking(renderer.clone(), views.clone(), |r, v| {
            r.render_category_chart(&v.category_counts)
        }),
        render_blocking(renderer.clone(), views.clone(), |r, v| {
            r.render_time_series_chart(&v.time_series)
        }),
        render_blocking(renderer, views, |r, v| r.render_word_chart(&v.corpus)),
    );
    debug!("Rendered charts in {:?}", started.elapsed());

    for (name, result) in [
        ("category", &category),
        ("time series", &time_series),
        ("word cloud", &words),
    ] {
        if let Err(e) = result {
            warn!("{} chart omitted: {}", name, e);
        }
    }

    RenderedCharts {
        category,
        time_series,
        words,
    }
}

fn chart_card(title: &str, chart: &Result<String, RenderError>) -> String {
    let content = match chart {
        Ok(uri) => format!(r#"<img src="{}" alt="{}">"#, uri, escape_html(title)),
        Err(e) => format!(
            r#"<p class="notice">Chart unavailable: {}</p>"#,
            escape_html(&e.to_string())
        ),
    };
    format!(
        r#"        <div class="card chart"><h2>{}</h2>{}</div>
"#,
        escape_html(title),
        content
    )
}

fn keyword_form(keyword: &str) -> String {
    format!(
        r#"        <div class="card">
            <form method="get" action="/dashboard">
                <input type="text" name="keyword" value="{}" placeholder="Filter by keyword">
                <button type="submit">Apply</button>
                <a href="/dashboard">Clear</a>
            </form>
        </div>
"#,
        escape_html(keyword)
    )
}

/// GET /dashboard?keyword=
pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, HtmlError> {
    let keyword = query.keyword();
    let records = load_snapshot(&state).await?;

    let views = match aggregate(&records, Some(keyword), state.limits()) {
        Ok(views) => views,
        Err(AggregateError::EmptyDataset) => {
            let message = if keyword.is_empty() {
                "No data available. Upload a CSV file to get started.".to_string()
            } else {
                format!("No tweets match the keyword \"{}\".", keyword)
            };
            let body = format!(
                "{}        <div class=\"card\"><p class=\"notice\">{}</p></div>",
                keyword_form(keyword),
                escape_html(&message)
            );
            return Ok(Html(page("Dashboard", &body)).into_response());
        }
        Err(too_large @ AggregateError::DatasetTooLarge { .. }) => {
            warn!("Dashboard rejected: {}", too_large);
            return Ok(message_page(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Dataset Too Large",
                "error",
                &too_large.to_string(),
            ));
        }
    };

    info!(
        "Dashboard: {} records (keyword {:?}), {} undated",
        views.record_count, keyword, views.undated
    );

    let views = Arc::new(views);
    let charts = render_charts(state.renderer.clone(), views.clone()).await;

    let mut body = keyword_form(keyword);
    body.push_str(&format!(
        "        <p>{} tweets analyzed. <a href=\"/api/summary?keyword={}\">JSON summary</a></p>\n",
        views.record_count,
        urlencoding::encode(keyword)
    ));
    body.push_str(&chart_card("Sentiment Distribution", &charts.category));
    body.push_str(&chart_card("Sentiment Over Time", &charts.time_series));
    body.push_str(&chart_card("Word Cloud", &charts.words));

    Ok(Html(page("Dashboard", &body)).into_response())
}

/// Derived views without the corpus text
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub keyword: String,
    #[serde(flatten)]
    pub views: DerivedViews,
    /// Characters in the word-cloud corpus
    pub corpus_length: usize,
}

/// GET /api/summary?keyword=
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let keyword = query.keyword().to_string();
    let records = load_snapshot(&state).await?;
    let views = aggregate(&records, Some(&keyword), state.limits()).map_err(ApiError::from)?;

    Ok(Json(SummaryResponse {
        corpus_length: views.corpus.as_str().chars().count(),
        keyword,
        views,
    }))
}
