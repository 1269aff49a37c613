//! Output module for presenting audit results
//!
//! This module handles:
//! - Printing audit summaries and comparisons to the terminal
//! - Exporting the full result as JSON
//! - Generating markdown reports

mod console;
mod error;
mod json;
mod markdown;

pub use console::{print_audit_summary, print_comparison};
pub use error::{OutputError, OutputResult};
pub use json::{export_json, to_json_string};
pub use markdown::{format_markdown_report, write_markdown_report};
