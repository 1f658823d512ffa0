//! Report sources.
//!
//! Reports come either from the admin API or from a JSON export on disk.

pub mod client;
pub mod file;

pub use client::{ClientConfig, ReportsClient};
pub use file::load_reports_file;
