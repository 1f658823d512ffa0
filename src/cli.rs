//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::HelpStatus;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// fraudboard - admin console for oFraud fraud reports
///
/// Review the pending queue, accept or reject reports, search the
/// catalog, and compute dashboard statistics.
///
/// Examples:
///   fraudboard stats
///   fraudboard stats --input reports.json --format json -o stats.json
///   fraudboard search --status 1 --category 3 --page 2
///   fraudboard accept 42 --comment "Sitio confirmado" --internal
///   fraudboard help-requests list --status pending
///   fraudboard init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the reports API
    #[arg(long, global = true, value_name = "URL", env = "FRAUDBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the admin endpoints
    #[arg(long, global = true, env = "FRAUDBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fraudboard.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Offset from UTC in hours used for calendar months (e.g. -6)
    #[arg(long, global = true, value_name = "HOURS", allow_negative_numbers = true)]
    pub utc_offset: Option<i32>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Console commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute dashboard statistics
    Stats {
        /// Read reports from a JSON export instead of the API
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Reference instant (RFC 3339); defaults to the current time
        #[arg(long, value_name = "TIMESTAMP")]
        now: Option<String>,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Write the output to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Search and page through the report catalog
    Search {
        /// Read reports from a JSON export instead of the API
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Exact report id
        #[arg(long)]
        id: Option<String>,

        /// Category id (1-10)
        #[arg(long, value_name = "ID")]
        category: Option<i64>,

        /// Status id (1 pending, 2 accepted, 3 rejected)
        #[arg(long, value_name = "ID")]
        status: Option<i64>,

        /// Earliest creation date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date_from: Option<NaiveDate>,

        /// Latest creation date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date_to: Option<NaiveDate>,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Reports per page
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Show the next report waiting for triage
    NextPending {
        /// Read reports from a JSON export instead of the API
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Show a single report
    Show {
        id: i64,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Accept a report and assign it to an administrator
    Accept {
        id: i64,

        /// Comment to attach to the report
        #[arg(long)]
        comment: Option<String>,

        /// Mark the comment as internal (hidden from the reporter)
        #[arg(long)]
        internal: bool,
    },

    /// Reject a report
    Reject {
        id: i64,

        /// Comment to attach to the report
        #[arg(long)]
        comment: Option<String>,

        /// Mark the comment as internal (hidden from the reporter)
        #[arg(long)]
        internal: bool,
    },

    /// Edit report metadata
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_name = "ID")]
        category: Option<i64>,

        #[arg(long, value_name = "ID")]
        status: Option<i64>,

        #[arg(long)]
        location: Option<String>,

        /// Incident date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        incident_date: Option<NaiveDate>,

        #[arg(long, value_name = "URL")]
        evidence_url: Option<String>,

        /// Assign the report to this admin id
        #[arg(long, value_name = "ADMIN_ID")]
        assign: Option<i64>,
    },

    /// Delete a report
    Delete {
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// List the comments on a report
    Comments {
        id: i64,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Change the text or visibility of a comment
    CommentEdit {
        comment_id: i64,

        /// New comment text
        #[arg(long)]
        comment: String,

        /// Mark the comment as internal (hidden from the reporter)
        #[arg(long)]
        internal: bool,
    },

    /// Delete a comment
    CommentDelete {
        comment_id: i64,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Work the queue of user help requests
    #[command(subcommand)]
    HelpRequests(HelpCommand),

    /// Generate a default .fraudboard.toml configuration file
    InitConfig,
}

/// Help-request queue commands.
#[derive(Subcommand, Debug, Clone)]
pub enum HelpCommand {
    /// List help requests, urgent first
    List {
        /// Fetch only the pending queue
        #[arg(long)]
        pending: bool,

        /// Keep only requests in this status (pending, in_progress, resolved, closed)
        #[arg(long, value_name = "STATUS")]
        status: Option<HelpStatus>,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Take an unassigned pending request
    Assign { id: i64 },

    /// Answer a request
    Respond {
        id: i64,

        /// Response shown to the user
        #[arg(long)]
        response: String,

        /// Status to move the request to
        #[arg(long, value_name = "STATUS", default_value = "resolved")]
        status: HelpStatus,
    },
}

/// Output format for command results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for init-config
        if matches!(self.command, Command::InitConfig) {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match self.command {
            Command::Search {
                page,
                limit,
                date_from,
                date_to,
                ..
            } => {
                if page == 0 {
                    return Err("Page must be at least 1".to_string());
                }
                if limit == 0 {
                    return Err("Limit must be at least 1".to_string());
                }
                if let (Some(from), Some(to)) = (date_from, date_to) {
                    if from > to {
                        return Err("--date-from must not be after --date-to".to_string());
                    }
                }
            }
            Command::Delete { yes: false, .. } | Command::CommentDelete { yes: false, .. } => {
                return Err("Refusing to delete without --yes".to_string());
            }
            Command::CommentEdit { ref comment, .. } if comment.trim().is_empty() => {
                return Err("Comment text cannot be empty".to_string());
            }
            Command::HelpRequests(HelpCommand::Respond { ref response, .. })
                if response.trim().is_empty() =>
            {
                return Err("Response text cannot be empty".to_string());
            }
            _ => {}
        }

        if let Some(input) = self.input() {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// The local JSON export the command reads from, if any.
    pub fn input(&self) -> Option<&PathBuf> {
        match self.command {
            Command::Stats { ref input, .. }
            | Command::Search { ref input, .. }
            | Command::NextPending { ref input, .. } => input.as_ref(),
            _ => None,
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
