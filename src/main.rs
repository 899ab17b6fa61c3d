use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{error, warn};
use tradeboard::api::{Fetched, ResourceKind};
use tradeboard::app::{AppContext, Dashboard};
use tradeboard::config::DashboardConfig;
use tradeboard::fetch::FetchOutcome;
use tradeboard::logging::init_logging;
use tradeboard::view::{ViewContent, ViewSelection, pie_shares};

const POLL_MS: u64 = 25;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend origin, e.g. http://localhost:3000
    #[arg(short, long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the data fetch status
    Status,
    /// Show the category table and pie breakdown of a view
    View {
        /// `import` or `export`
        which: ViewSelection,
    },
    /// Show the raw records held by the backend
    Raw {
        /// How many records to print
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
}

fn build_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::from_env().context("reading TRADEBOARD_* environment")?;
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout_secs(secs)?;
    }
    Ok(config)
}

async fn settle(handles: Vec<tokio::task::JoinHandle<FetchOutcome>>) {
    for joined in join_all(handles).await {
        if let Err(e) = joined {
            error!("fetch task failed: {e}");
        }
    }
}

/// Poll until the view has its table and the pie cache has been filled
async fn wait_for_view(dashboard: &Dashboard, deadline: Instant) {
    while Instant::now() < deadline {
        let pie_seen = dashboard.registry().version(ResourceKind::Pie) > 0;
        if !dashboard.view_state().loading && pie_seen {
            return;
        }
        sleep(Duration::from_millis(POLL_MS)).await;
    }
    warn!("Timed out waiting for {} view", dashboard.selection());
}

fn print_view(dashboard: &Dashboard) {
    match dashboard.content() {
        ViewContent::Placeholder => println!("Select Import or Export"),
        ViewContent::Loading => println!("Loading..."),
        ViewContent::Error(message) => println!("{message}"),
        ViewContent::Content { rows, pie } => {
            match pie {
                Some(slices) => {
                    for share in pie_shares(&slices) {
                        println!("{:>6.1}%  {:>6}  {}", share.percent, share.count, share.label);
                    }
                }
                None => println!("[Pie Chart]"),
            }
            println!();
            println!("Category ({})", rows.len());
            if rows.is_empty() {
                println!("No data");
            }
            for row in rows {
                println!("{}  {}", row.label, row.name);
            }
        }
    }
}

fn print_raw(dashboard: &Dashboard, limit: usize) -> Result<()> {
    match dashboard.registry().raw.latest() {
        None => println!("No data"),
        Some(Fetched::Failed(wrapper)) => println!("{}", wrapper.error),
        Some(Fetched::Ready(records)) => {
            println!("Records: {}", records.len());
            for record in records.iter().take(limit) {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    let config = build_config(&args)?;
    let deadline = Instant::now() + config.timeout + Duration::from_secs(1);
    let context = AppContext::new(config)?;
    let mut dashboard = Dashboard::new(context);

    let startup = dashboard.bootstrap();

    match args.command {
        Command::Status => {
            settle(startup).await;
            print!("{}", dashboard.status());
        }
        Command::View { which } => {
            dashboard.select_view(which);
            wait_for_view(&dashboard, deadline).await;
            print_view(&dashboard);
        }
        Command::Raw { limit } => {
            settle(startup).await;
            print_raw(&dashboard, limit)?;
        }
    }

    Ok(())
}
