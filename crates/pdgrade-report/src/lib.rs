//! pdgrade-report — HTML rendering of graded batches.

pub mod html;

pub use html::{generate_html, write_html_report};
