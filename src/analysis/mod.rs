//! Report analysis modules.
//!
//! This module provides dashboard aggregation, catalog search and the help-request queue.

pub mod aggregator;
pub mod buckets;
pub mod catalog;
pub mod help;

pub use aggregator::compute_dashboard_stats;
pub use catalog::{next_pending, paginate, ReportFilter};
pub use help::{help_queue, status_tabs};
