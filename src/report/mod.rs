//! Output rendering.

pub mod generator;

pub use generator::{
    generate_json, generate_markdown_catalog, generate_markdown_comments,
    generate_markdown_dashboard, generate_markdown_help_requests, generate_markdown_report,
};
