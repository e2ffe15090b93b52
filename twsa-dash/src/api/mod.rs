//! HTTP handlers for twsa-dash

pub mod buildinfo;
pub mod dashboard;
pub mod health;
pub mod records;
pub mod transfer;
pub mod ui;

pub use buildinfo::get_build_info;
pub use dashboard::{dashboard_page, summary};
pub use health::health_routes;
pub use records::{list_records, tweets_table, tweets_table_all};
pub use transfer::{download_csv, upload_csv, upload_form_page};
pub use ui::home_page;
