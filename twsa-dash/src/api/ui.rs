//! HTML page rendering
//!
//! Pages are assembled server-side with `format!`; there is no client script.
//! Every value that came from a record or a request is passed through
//! [`escape_html`] before it reaches a page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::ApiError;

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
        }
        .header-content {
            display: flex;
            justify-content: space-between;
            align-items: center;
            max-width: 1200px;
            margin: 0 auto;
        }
        .header-right {
            text-align: right;
            font-size: 14px;
            color: #888;
            font-family: 'Courier New', monospace;
            line-height: 1.2;
        }
        h1 { font-size: 26px; color: #4a9eff; }
        h1 a { color: inherit; text-decoration: none; }
        h2 { font-size: 20px; margin: 20px 0 10px; color: #4a9eff; }
        .container { max-width: 1200px; margin: 0 auto; padding: 0 20px 40px; }
        a { color: #4a9eff; }
        nav a { margin-right: 16px; }
        .card {
            background: #2a2a2a;
            border: 1px solid #3a3a3a;
            border-radius: 8px;
            padding: 20px;
            margin-bottom: 20px;
        }
        .chart img { max-width: 100%; background: #fff; border-radius: 4px; }
        .notice { color: #ffb74d; }
        .error { color: #ef5350; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 6px 10px; border-bottom: 1px solid #3a3a3a; text-align: left; }
        th { color: #4a9eff; }
        input[type=text], input[type=file] {
            padding: 6px 10px;
            background: #1a1a1a;
            color: #e0e0e0;
            border: 1px solid #3a3a3a;
            border-radius: 4px;
        }
        button {
            padding: 6px 14px;
            background: #4a9eff;
            color: #fff;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
"#;

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap `body` (already escaped HTML) in the shared page layout
pub fn page(title: &str, body: &str) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let build_timestamp = env!("BUILD_TIMESTAMP");
    let build_profile = env!("BUILD_PROFILE");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Tweet Sentiment Analyzer</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <div class="header-content">
            <div>
                <h1><a href="/">Tweet Sentiment Analyzer</a></h1>
                <nav>
                    <a href="/dashboard">Dashboard</a>
                    <a href="/tweets_table">Tweets</a>
                    <a href="/upload">Upload CSV</a>
                    <a href="/download_csv">Download CSV</a>
                </nav>
            </div>
            <div class="header-right">
                <div>v{version} [{git_hash}]</div>
                <div>{build_timestamp} ({build_profile})</div>
            </div>
        </div>
    </header>
    <div class="container">
        <h2>{title}</h2>
{body}
    </div>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        version = version,
        git_hash = git_hash,
        build_timestamp = build_timestamp,
        build_profile = build_profile,
        body = body,
    )
}

/// A page holding a single message paragraph
pub fn message_page(status: StatusCode, title: &str, class: &str, message: &str) -> Response {
    let body = format!(
        r#"        <div class="card"><p class="{}">{}</p></div>"#,
        class,
        escape_html(message)
    );
    (status, Html(page(title, &body))).into_response()
}

/// Error from a handler that answers with HTML
///
/// Carries the same taxonomy and status codes as the JSON API.
#[derive(Debug)]
pub struct HtmlError(pub ApiError);

impl From<ApiError> for HtmlError {
    fn from(err: ApiError) -> Self {
        HtmlError(err)
    }
}

impl From<twsa_common::StoreError> for HtmlError {
    fn from(err: twsa_common::StoreError) -> Self {
        HtmlError(err.into())
    }
}

impl From<crate::csv_io::CsvError> for HtmlError {
    fn from(err: crate::csv_io::CsvError) -> Self {
        HtmlError(err.into())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        }
        let title = match self.0 {
            ApiError::TooLarge(_) => "Dataset Too Large",
            ApiError::NoData => "No Data",
            _ => "Error",
        };
        message_page(status, title, "error", &self.0.to_string())
    }
}

/// GET /
///
/// Landing page linking every feature
pub async fn home_page() -> Html<String> {
    let body = r#"        <div class="card">
            <p>Explore the sentiment of stored tweets.</p>
            <ul>
                <li><a href="/dashboard">Dashboard</a>: sentiment distribution, sentiment over time, and word cloud, with keyword filtering</li>
                <li><a href="/tweets_table">Tweets</a>: preview of stored tweets (<a href="/tweets_table/all">show all</a>)</li>
                <li><a href="/upload">Upload CSV</a>: add tweets from a CSV file</li>
                <li><a href="/download_csv">Download CSV</a>: export every tweet</li>
            </ul>
        </div>"#;
    Html(page("Home", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain 😊"), "plain 😊");
    }

    #[test]
    fn test_page_escapes_title() {
        let html = page("<b>", "<p>body</p>");
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("<p>body</p>"));
    }
}
