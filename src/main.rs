use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod api;
mod dashboard;
mod funnel;
mod health;
mod insights;
mod models;
mod report;
mod trends;

use dashboard::DashboardAnalytics;
use models::Dataset;

#[derive(Parser)]
#[command(name = "hiring-pipeline-analytics")]
#[command(about = "Recruitment pipeline analytics for the job portal admin dashboard", long_about = None)]
struct Cli {
    /// Backend API base URL; falls back to the JOBBOARD_API_URL env var
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["company", "snapshot"])
        .required(true)
        .multiple(false)
))]
struct SourceArgs {
    /// Company id to fetch collections for
    #[arg(long)]
    company: Option<Uuid>,
    /// Local JSON snapshot to analyze instead of fetching
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl SourceArgs {
    fn scope(&self) -> String {
        match (&self.company, &self.snapshot) {
            (Some(id), _) => format!("company {id}"),
            (_, Some(path)) => format!("snapshot {}", path.display()),
            _ => "unknown source".to_string(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the four backend collections and save them as a JSON snapshot
    Snapshot {
        #[arg(long)]
        company: Uuid,
        #[arg(long, default_value = "dataset.json")]
        out: PathBuf,
    },
    /// Print application counters by status
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the six-stage recruitment funnel
    Funnel {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print weekly application volume and top jobs by applications
    Trend {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print pipeline health counters
    Health {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print top job insights
    Insights {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the full analytics bundle as JSON
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "analytics.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url.clone();

    match cli.command {
        Commands::Snapshot { company, out } => {
            let client = api_client(api_url.as_deref())?;
            let dataset = client.fetch_dataset(company).await?;
            api::save_snapshot(&out, &dataset)?;
            println!(
                "Snapshot with {} applications, {} jobs, {} rounds, {} evaluations written to {}.",
                dataset.applications.len(),
                dataset.jobs.len(),
                dataset.rounds.len(),
                dataset.evaluations.len(),
                out.display()
            );
        }
        Commands::Summary { source } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let summary = funnel::summarize(&dataset.applications);
            println!("Applications: {}", summary.total);
            println!("In interview: {}", summary.in_interview);
            println!("Offers released: {}", summary.offers_released);
            println!("Hires: {}", summary.hires);
        }
        Commands::Funnel { source } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let stages =
                funnel::build_funnel(&dataset.applications, &dataset.rounds, &dataset.evaluations);
            println!("Recruitment funnel:");
            for stage in &stages {
                println!(
                    "- {}: {} candidates ({}% conversion, {}% drop-off, {:.1} avg days)",
                    stage.stage,
                    stage.count,
                    stage.conversion_from_prev,
                    stage.drop_off_rate,
                    stage.avg_days_in_stage
                );
            }
        }
        Commands::Trend { source, as_of } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let now = resolve_as_of(as_of);

            println!("Applications per week:");
            for point in trends::weekly_trend(&dataset.applications, now) {
                println!("- {}: {}", point.label(), point.count);
            }

            let top_jobs = trends::job_wise_counts(&dataset.applications);
            println!();
            println!("Top jobs by applications:");
            if top_jobs.is_empty() {
                println!("No applications recorded.");
            }
            for job in &top_jobs {
                println!("- {}: {}", job.job_title, job.count);
            }
        }
        Commands::Health { source, as_of } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let health =
                health::pipeline_health(&dataset.applications, &dataset.evaluations, resolve_as_of(as_of));
            println!(
                "Stuck applications (over {} days): {}",
                health::STUCK_AFTER_DAYS,
                health.stuck_applications
            );
            println!("Overdue evaluations: {}", health.overdue_evaluations);
            println!("Awaiting feedback: {}", health.awaiting_feedback);
        }
        Commands::Insights { source, as_of } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let insights = insights::top_job_insights(
                &dataset.applications,
                &dataset.jobs,
                resolve_as_of(as_of),
            );
            println!(
                "Most applied: {} ({} applications)",
                insights.most_applied.title, insights.most_applied.count
            );
            println!(
                "Fastest closed: {} ({} days)",
                insights.fastest_closed.title, insights.fastest_closed.days
            );
            println!(
                "Hardest to fill: {} ({} days)",
                insights.hardest_to_fill.title, insights.hardest_to_fill.days
            );
        }
        Commands::Report { source, as_of, out } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let now = resolve_as_of(as_of);
            let analytics = DashboardAnalytics::compute(&dataset, now);
            let report = report::build_report(&source.scope(), now, &analytics);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { source, as_of, out } => {
            let dataset = load_dataset(api_url.as_deref(), &source).await?;
            let analytics = DashboardAnalytics::compute(&dataset, resolve_as_of(as_of));
            let json = serde_json::to_string_pretty(&analytics)
                .context("failed to serialize analytics")?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write analytics to {}", out.display()))?;
            println!("Analytics written to {}.", out.display());
        }
    }

    Ok(())
}

async fn load_dataset(api_url: Option<&str>, source: &SourceArgs) -> anyhow::Result<Dataset> {
    if let Some(path) = &source.snapshot {
        return api::load_snapshot(path);
    }
    let company = source
        .company
        .context("either --company or --snapshot is required")?;
    let client = api_client(api_url)?;
    client.fetch_dataset(company).await
}

fn api_client(api_url: Option<&str>) -> anyhow::Result<api::ApiClient> {
    let base_url = match api_url {
        Some(url) => url.to_string(),
        None => std::env::var("JOBBOARD_API_URL")
            .context("JOBBOARD_API_URL must be set when fetching from the backend")?,
    };
    api::ApiClient::new(&base_url)
}

fn resolve_as_of(as_of: Option<NaiveDate>) -> DateTime<Utc> {
    match as_of {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    }
}
