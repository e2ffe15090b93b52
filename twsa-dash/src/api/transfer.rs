//! CSV upload and download

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::info;
use twsa_common::db::fields;

use super::ui::{escape_html, page, HtmlError};
use crate::csv_io::{parse_upload, write_download, EXPORT_FILE_NAME};
use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

fn upload_form(notice: Option<&str>) -> String {
    let notice = notice
        .map(|n| format!("            <p class=\"notice\">{}</p>\n", escape_html(n)))
        .unwrap_or_default();
    format!(
        r#"        <div class="card">
{}            <p>The first row names the columns, e.g. <code>Text,Sentiment,Timestamp</code>.</p>
            <form method="post" action="/upload" enctype="multipart/form-data">
                <input type="file" name="{}" accept=".csv,text/csv">
                <button type="submit">Upload</button>
            </form>
        </div>
"#,
        notice, UPLOAD_FIELD
    )
}

/// GET /upload
pub async fn upload_form_page() -> Html<String> {
    Html(page("Upload CSV", &upload_form(None)))
}

/// POST /upload
///
/// Every row of the file is inserted as one record. All records of one
/// upload share the same `BatchTimestamp`.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, HtmlError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let name = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?;
            file = Some((name, bytes));
            break;
        }
    }

    let Some((name, bytes)) = file else {
        let body = upload_form(Some("No file selected."));
        return Ok((StatusCode::BAD_REQUEST, Html(page("Upload CSV", &body))).into_response());
    };
    if bytes.is_empty() {
        let body = upload_form(Some("The selected file is empty."));
        return Ok((StatusCode::BAD_REQUEST, Html(page("Upload CSV", &body))).into_response());
    }

    let batch = twsa_common::time::batch_timestamp();
    let records = parse_upload(&bytes, &batch)?;
    let count = records.len();
    state.store.insert_many(records).await?;
    info!("Uploaded {} records from {:?} (batch {})", count, name, batch);

    let body = format!(
        r#"        <div class="card">
            <p>Uploaded {} tweets from <strong>{}</strong> (batch {}).</p>
            <p><a href="/dashboard">View dashboard</a> &middot; <a href="/upload">Upload another file</a></p>
        </div>
"#,
        count,
        escape_html(&name),
        escape_html(&batch)
    );
    Ok(Html(page("Upload Complete", &body)).into_response())
}

/// GET /download_csv
pub async fn download_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let records = state.store.find_all(fields::DASHBOARD, None).await?;
    let bytes = write_download(&records)?;
    info!("Exported {} records", records.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
