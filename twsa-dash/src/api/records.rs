//! Tweet tables and the records API

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use twsa_common::db::fields;
use twsa_common::{Record, StoreError};

use super::ui::{escape_html, page, HtmlError};
use crate::error::ApiResult;
use crate::preview::{preview, Preview};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    /// Rows to return; defaults to the configured preview limit
    pub limit: Option<usize>,
    /// Return every row, ignoring `limit`
    #[serde(default)]
    pub all: bool,
}

/// One table row as shown to users
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    #[serde(rename = "Text")]
    pub text: Option<String>,
    #[serde(rename = "Sentiment")]
    pub sentiment: Option<String>,
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<String>,
}

impl From<Record> for RecordRow {
    fn from(record: Record) -> Self {
        Self {
            text: record.text,
            sentiment: record.sentiment,
            timestamp: record.timestamp,
        }
    }
}

/// Leading `limit` records (all when `None`) with the store total
async fn load_preview(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Preview<RecordRow>, StoreError> {
    let limit = limit.map(|l| l.max(1));
    // One extra row tells whether more exist
    let fetch = limit.map(|l| l.saturating_add(1));
    let records = state.store.find_all(fields::DASHBOARD, fetch).await?;

    let mut preview = preview(records.into_iter().map(RecordRow::from).collect(), limit);
    if limit.is_some() {
        preview.total = state.store.count().await?;
    }
    Ok(preview)
}

fn render_table(preview: &Preview<RecordRow>) -> String {
    let mut html = String::from(
        "        <div class=\"card\">\n            <table>\n                <tr><th>Text</th><th>Sentiment</th><th>Timestamp</th></tr>\n",
    );
    for row in &preview.rows {
        let label = twsa_common::Sentiment::parse(row.sentiment.as_deref()).display_label();
        html.push_str(&format!(
            "                <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(row.text.as_deref().unwrap_or("")),
            escape_html(&label),
            escape_html(row.timestamp.as_deref().unwrap_or("")),
        ));
    }
    html.push_str("            </table>\n        </div>\n");
    html
}

fn table_page(preview: &Preview<RecordRow>) -> String {
    let mut body = format!(
        "        <p>Showing {} of {} tweets.",
        preview.len(),
        preview.total
    );
    if preview.has_more {
        body.push_str(" <a href=\"/tweets_table/all\">Show all</a>");
    }
    body.push_str("</p>\n");

    if preview.is_empty() {
        body.push_str(
            "        <div class=\"card\"><p class=\"notice\">No data available.</p></div>\n",
        );
    } else {
        body.push_str(&render_table(preview));
    }
    page("Tweets", &body)
}

/// GET /tweets_table?limit=
pub async fn tweets_table(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Html<String>, HtmlError> {
    let limit = if query.all {
        None
    } else {
        Some(query.limit.unwrap_or(state.config.preview_limit))
    };
    let preview = load_preview(&state, limit).await?;
    Ok(Html(table_page(&preview)))
}

/// GET /tweets_table/all
pub async fn tweets_table_all(State(state): State<AppState>) -> Result<Html<String>, HtmlError> {
    let preview = load_preview(&state, None).await?;
    Ok(Html(table_page(&preview)))
}

/// GET /api/records?limit=&all=
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<Preview<RecordRow>>> {
    let limit = if query.all {
        None
    } else {
        Some(query.limit.unwrap_or(state.config.preview_limit))
    };
    Ok(Json(load_preview(&state, limit).await?))
}
