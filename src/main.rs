//! fraudboard - admin console for oFraud fraud reports
//!
//! A CLI tool that fetches fraud reports from the oFraud API (or a JSON
//! export), computes dashboard statistics, searches the report catalog,
//! applies triage decisions, and works the help-request queue.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid input, etc.)
//!   2 - Nothing found (e.g. no pending report in the queue)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod source;
mod triage;

use analysis::{
    compute_dashboard_stats, help_queue, next_pending, paginate, status_tabs, ReportFilter,
};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use cli::{Args, Command, HelpCommand, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, UpdateReportRequest};
use source::{ClientConfig, ReportsClient};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(&args);

    info!("fraudboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .fraudboard.toml in `dir`.
fn handle_init_config(dir: &Path) -> Result<i32> {
    let path = dir.join(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        return Ok(1);
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the API URL, time zone, and admin pool.");
    Ok(0)
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Everything a command needs besides its own arguments.
struct AppContext {
    config: Config,
    tz: FixedOffset,
    quiet: bool,
}

/// Dispatch the selected command. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args, Path::new("."))?;
    config.merge_with_args(&args);
    config.validate()?;

    let tz = config
        .dashboard
        .timezone()
        .context("Invalid dashboard.utc_offset_hours")?;
    let ctx = AppContext {
        config,
        tz,
        quiet: args.quiet,
    };

    match args.command {
        Command::Stats {
            input,
            now,
            format,
            output,
        } => run_stats(&ctx, input.as_deref(), now.as_deref(), format, output.as_deref()).await,
        Command::Search {
            input,
            id,
            category,
            status,
            date_from,
            date_to,
            page,
            limit,
            format,
        } => {
            let filter = ReportFilter {
                id,
                category_id: category,
                status_id: status,
                date_from,
                date_to,
            };
            run_search(&ctx, input.as_deref(), &filter, page, limit, format).await
        }
        Command::NextPending { input, format } => {
            run_next_pending(&ctx, input.as_deref(), format).await
        }
        Command::Show { id, format } => {
            let client = build_client(&ctx.config)?;
            let found = with_spinner(ctx.quiet, "Fetching report...", client.get(id))
                .await
                .with_context(|| format!("Failed to fetch report {}", id))?;
            emit(&ctx, format, None, || Ok(report::generate_markdown_report(&found)), &found)?;
            Ok(0)
        }
        Command::Accept {
            id,
            comment,
            internal,
        } => run_triage(&ctx, id, triage::Decision::Accept, comment.as_deref(), internal).await,
        Command::Reject {
            id,
            comment,
            internal,
        } => run_triage(&ctx, id, triage::Decision::Reject, comment.as_deref(), internal).await,
        Command::Update {
            id,
            title,
            description,
            category,
            status,
            location,
            incident_date,
            evidence_url,
            assign,
        } => {
            let update = UpdateReportRequest {
                title,
                description,
                category_id: category,
                status_id: status,
                incident_date: incident_date.map(|d| d.format("%Y-%m-%d").to_string()),
                location,
                evidence_url,
                assigned_admin_id: assign,
            };
            run_update(&ctx, id, &update).await
        }
        Command::Delete { id, .. } => {
            let client = build_client(&ctx.config)?;
            client
                .delete(id)
                .await
                .with_context(|| format!("Failed to delete report {}", id))?;
            println!("🗑️  Report {} deleted.", id);
            Ok(0)
        }
        Command::Comments { id, format } => {
            let client = build_client(&ctx.config)?;
            let comments = with_spinner(ctx.quiet, "Fetching comments...", client.comments(id))
                .await
                .with_context(|| format!("Failed to fetch comments for report {}", id))?;
            emit(
                &ctx,
                format,
                None,
                || Ok(report::generate_markdown_comments(id, &comments)),
                &comments,
            )?;
            Ok(0)
        }
        Command::CommentEdit {
            comment_id,
            comment,
            internal,
        } => {
            let client = build_client(&ctx.config)?;
            let updated = triage::edit_comment(&client, comment_id, &comment, internal).await?;
            println!(
                "✅ Comment {} on report {} updated.",
                updated.id, updated.report_id
            );
            Ok(0)
        }
        Command::CommentDelete { comment_id, .. } => {
            let client = build_client(&ctx.config)?;
            client
                .delete_comment(comment_id)
                .await
                .with_context(|| format!("Failed to delete comment {}", comment_id))?;
            println!("🗑️  Comment {} deleted.", comment_id);
            Ok(0)
        }
        Command::HelpRequests(action) => run_help(&ctx, action).await,
        Command::InitConfig => handle_init_config(Path::new(".")),
    }
}

/// Compute and print the dashboard.
async fn run_stats(
    ctx: &AppContext,
    input: Option<&Path>,
    now: Option<&str>,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<i32> {
    let now = match now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now timestamp: {}", raw))?
            .with_timezone(&ctx.tz),
        None => Utc::now().with_timezone(&ctx.tz),
    };

    let (reports, source) = load_reports(ctx, input, &ReportFilter::default()).await?;
    let stats = compute_dashboard_stats(&reports, &now);
    info!(
        "Computed dashboard for {} reports as of {}",
        stats.total_reports,
        now.to_rfc3339()
    );

    emit(
        ctx,
        format,
        output,
        || {
            Ok(report::generate_markdown_dashboard(
                &stats,
                &source,
                &now.to_rfc3339(),
            ))
        },
        &stats,
    )?;
    Ok(0)
}

/// Filter and page through the catalog.
async fn run_search(
    ctx: &AppContext,
    input: Option<&Path>,
    filter: &ReportFilter,
    page: usize,
    limit: usize,
    format: Option<OutputFormat>,
) -> Result<i32> {
    let (reports, _) = load_reports(ctx, input, filter).await?;
    let page = paginate(&reports, page, limit);
    debug!(
        "Search matched {} reports, showing {}",
        page.total,
        page.data.len()
    );

    emit(ctx, format, None, || Ok(report::generate_markdown_catalog(&page)), &page)?;
    Ok(0)
}

/// Show the next report waiting for triage.
async fn run_next_pending(
    ctx: &AppContext,
    input: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<i32> {
    let (reports, _) = load_reports(ctx, input, &ReportFilter::pending()).await?;

    match next_pending(&reports) {
        Some(pending) => {
            emit(ctx, format, None, || Ok(report::generate_markdown_report(pending)), pending)?;
            Ok(0)
        }
        None => {
            println!("🎉 No pending reports.");
            Ok(2)
        }
    }
}

/// Accept or reject a report.
async fn run_triage(
    ctx: &AppContext,
    id: i64,
    decision: triage::Decision,
    comment: Option<&str>,
    internal: bool,
) -> Result<i32> {
    let client = build_client(&ctx.config)?;
    let report = triage::resolve(
        &client,
        id,
        decision,
        comment,
        internal,
        &ctx.config.triage.admin_pool,
    )
    .await?;

    let verb = match decision {
        triage::Decision::Accept => "accepted",
        triage::Decision::Reject => "rejected",
    };
    match report.assigned_admin() {
        Some(admin) => println!("✅ Report {} {} (assigned to admin {}).", id, verb, admin),
        None => println!("✅ Report {} {}.", id, verb),
    }
    Ok(0)
}

/// List, claim or answer help requests.
async fn run_help(ctx: &AppContext, action: HelpCommand) -> Result<i32> {
    let client = build_client(&ctx.config)?;

    match action {
        HelpCommand::List {
            pending,
            status,
            format,
        } => {
            let requests = with_spinner(
                ctx.quiet,
                "Fetching help requests...",
                client.help_requests(pending),
            )
            .await
            .context("Failed to fetch help requests")?;

            let tabs = status_tabs(&requests);
            let queue = help_queue(requests, status);
            emit(
                ctx,
                format,
                None,
                || Ok(report::generate_markdown_help_requests(&queue, &tabs)),
                &queue,
            )?;
        }
        HelpCommand::Assign { id } => {
            let claimed = triage::claim_help_request(&client, id).await?;
            match claimed.assigned_admin_name {
                Some(ref name) => println!("✅ Help request {} assigned to {}.", id, name),
                None => println!("✅ Help request {} assigned.", id),
            }
        }
        HelpCommand::Respond {
            id,
            response,
            status,
        } => {
            let answered = triage::answer_help_request(&client, id, &response, status).await?;
            println!(
                "✅ Help request {} answered, now {}.",
                id,
                answered.status_label()
            );
        }
    }
    Ok(0)
}

/// Edit report metadata.
async fn run_update(ctx: &AppContext, id: i64, update: &UpdateReportRequest) -> Result<i32> {
    if update.is_empty() {
        warn!("Nothing to update for report {}", id);
        return Ok(0);
    }

    let client = build_client(&ctx.config)?;
    let report = client
        .update(id, update)
        .await
        .with_context(|| format!("Failed to update report {}", id))?;

    println!("✅ Report {} updated.", report.id);
    Ok(0)
}

/// Load reports from a file or the API, then apply `filter` locally.
///
/// API failures degrade to an empty list. Returns the reports and a
/// description of where they came from.
async fn load_reports(
    ctx: &AppContext,
    input: Option<&Path>,
    filter: &ReportFilter,
) -> Result<(Vec<Report>, String)> {
    let (reports, source) = match input {
        Some(path) => (
            source::load_reports_file(path)?,
            path.display().to_string(),
        ),
        None => {
            let client = build_client(&ctx.config)?;
            let reports =
                with_spinner(ctx.quiet, "Fetching reports...", client.list_all_or_empty(filter))
                    .await;
            (reports, ctx.config.api.base_url.clone())
        }
    };

    Ok((filter.apply(reports, &ctx.tz), source))
}

/// Create the API client from configuration.
fn build_client(config: &Config) -> Result<ReportsClient> {
    if config.api.token.is_none() {
        debug!("No API token configured; admin endpoints may reject requests");
    }

    ReportsClient::new(ClientConfig {
        base_url: config.api.base_url.clone(),
        token: config.api.token.clone(),
        timeout_seconds: config.api.timeout_seconds,
    })
    .context("Failed to create reports API client")
}

/// Await `future` while showing a spinner (unless quiet).
async fn with_spinner<F: std::future::Future>(quiet: bool, message: &str, future: F) -> F::Output {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let output = future.await;
    spinner.finish_and_clear();
    output
}

/// Render `value` in the requested format and print it or write it to `output`.
fn emit<T, F>(
    ctx: &AppContext,
    format: Option<OutputFormat>,
    output: Option<&Path>,
    markdown: F,
    value: &T,
) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce() -> Result<String>,
{
    let format = format.unwrap_or(ctx.config.dashboard.default_format);
    let rendered = match format {
        OutputFormat::Json => report::generate_json(value)?,
        OutputFormat::Markdown => markdown()?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            println!("✅ Output saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Resolve the configuration. An explicit `--config` file must load; the
/// default file in `dir` is optional and a broken one falls back to
/// built-in settings.
fn load_config(args: &Args, dir: &Path) -> Result<Config> {
    if let Some(ref path) = args.config {
        info!("Loading config from {}", path.display());
        return Config::load(path);
    }

    let config = match Config::load_from_dir(dir) {
        Ok(Some(config)) => {
            info!("Loading config from {}", CONFIG_FILE);
            config
        }
        Ok(None) => {
            debug!("No {} found, using built-in defaults", CONFIG_FILE);
            Config::default()
        }
        Err(e) => {
            warn!("Ignoring {}: {:#}", CONFIG_FILE, e);
            Config::default()
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_init_config_writes_once() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(handle_init_config(dir.path()).unwrap(), 0);
        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, Config::default_toml());

        // An existing file is left untouched.
        std::fs::write(dir.path().join(CONFIG_FILE), "# edited\n").unwrap();
        assert_eq!(handle_init_config(dir.path()).unwrap(), 1);
        let kept = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(kept, "# edited\n");
    }

    #[test]
    fn test_init_config_parses_and_uses_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&["fraudboard", "init-config"]);
        assert!(matches!(args.command, Command::InitConfig));
        assert!(args.validate().is_ok());
        assert_eq!(load_config(&args, dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_config_sources() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&["fraudboard", "stats"]);
        assert_eq!(load_config(&args, dir.path()).unwrap(), Config::default());

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[triage]\nadmin_pool = [7, 8]\n",
        )
        .unwrap();
        let config = load_config(&args, dir.path()).unwrap();
        assert_eq!(config.triage.admin_pool, vec![7, 8]);

        std::fs::write(dir.path().join(CONFIG_FILE), "not = [valid").unwrap();
        assert_eq!(load_config(&args, dir.path()).unwrap(), Config::default());

        let missing = dir.path().join("missing.toml");
        let args = parse(&["fraudboard", "-c", missing.to_str().unwrap(), "stats"]);
        assert!(load_config(&args, dir.path()).is_err());
    }
}
