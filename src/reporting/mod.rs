pub mod aggregator;
pub mod assembler;
pub mod formatter;
pub mod html;
pub mod json;

pub use aggregator::{summarize, ReportAggregator};
pub use assembler::{write_reports, OutputFormat, WrittenReports};
pub use formatter::{format_duration, format_terminal_summary};
pub use html::{html_escape, render_html, DASHBOARD_FILE_NAME};
pub use json::{load_report, render_json, REPORT_FILE_NAME};
