use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

mod actions;
mod compare;
mod db;
mod models;
mod period;
mod report;
mod score;
mod store;

use period::ScoringPeriod;

#[derive(Parser)]
#[command(name = "faculty-scorecard")]
#[command(about = "Faculty performance scorecards and low-performer early warning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import records from a CSV file
    #[command(group(
        ArgGroup::new("source")
            .args(["activities", "metrics"])
            .required(true)
            .multiple(false)
    ))]
    Import {
        /// CSV of activity records
        #[arg(long)]
        activities: Option<PathBuf>,
        /// CSV of periodic feedback metrics
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
    /// Score one faculty member for a year
    Score {
        #[arg(long)]
        email: String,
        /// Year label such as 2024-25 (academic) or 2024 (calendar);
        /// defaults to the current academic year
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Flag low performers across the whole roster
    ActionItems {
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value_t = 4)]
        max_in_flight: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare one faculty member against department peers
    Compare {
        #[arg(long)]
        email: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value_t = 4)]
        max_in_flight: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Generate a markdown report for the whole roster
    Report {
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 4)]
        max_in_flight: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { activities, metrics } => {
            if let Some(path) = activities {
                let inserted = db::import_activities_csv(&pool, &path).await?;
                println!("Inserted {inserted} activities from {}.", path.display());
            } else if let Some(path) = metrics {
                let inserted = db::import_metrics_csv(&pool, &path).await?;
                println!("Inserted {inserted} metric entries from {}.", path.display());
            }
        }
        Commands::Score { email, year, json } => {
            let period = resolve_period(year.as_deref())?;
            let profile = db::find_faculty_by_email(&pool, &email)
                .await?
                .ok_or_else(|| anyhow!("no faculty profile with email {email}"))?;

            let store = db::PgActivityStore::new(pool.clone());
            let result = score::compute_score(&store, &profile.faculty_id, &period).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Performance for {} ({}):", profile.full_name, period.label);
                println!(
                    "  training     {:>3}/100 ({} completed)",
                    result.training_score, result.trainings_count
                );
                println!(
                    "  feedback     {:>3}/100 (avg of {} entries)",
                    result.feedback_score, result.feedback_count
                );
                println!(
                    "  publications {:>3}/100 ({} completed)",
                    result.publication_score, result.publications_count
                );
                println!(
                    "  composite    {:>3}/100, {}",
                    result.composite_score, result.badge
                );
            }
        }
        Commands::ActionItems {
            year,
            max_in_flight,
            json,
        } => {
            let period = resolve_period(year.as_deref())?;
            let roster = db::fetch_roster(&pool).await?;
            info!(faculty = roster.len(), "scanning roster for action items");

            let store = db::PgActivityStore::new(pool.clone());
            let items = actions::scan_roster(&store, &roster, &period, max_in_flight).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No action items for this window.");
            } else {
                println!("Action items for {}:", period.label);
                for item in &items {
                    println!(
                        "- [{}] {}: {} ({})",
                        item.priority,
                        item.name,
                        item.kind.label(),
                        item.detail
                    );
                }
            }
        }
        Commands::Compare {
            email,
            year,
            max_in_flight,
            json,
        } => {
            let period = resolve_period(year.as_deref())?;
            let roster = db::fetch_roster(&pool).await?;
            let profile = db::find_faculty_by_email(&pool, &email)
                .await?
                .ok_or_else(|| anyhow!("no faculty profile with email {email}"))?;

            let store = db::PgActivityStore::new(pool.clone());
            let comparison = compare::compare_to_peers(
                &store,
                &roster,
                &profile.faculty_id,
                &period,
                max_in_flight,
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!(
                    "{} vs {} ({} faculty, {}):",
                    comparison.full_name,
                    comparison.department,
                    comparison.averages.faculty_count,
                    period.label
                );
                println!(
                    "  composite {:>3}/100 vs avg {:>3}/100 ({}{})",
                    comparison.score.composite_score,
                    comparison.averages.avg_composite,
                    if comparison.composite_difference > 0 { "+" } else { "" },
                    comparison.composite_difference
                );
                println!(
                    "  training {} vs {}, feedback {} vs {}, publications {} vs {}",
                    comparison.score.training_score,
                    comparison.averages.avg_training,
                    comparison.score.feedback_score,
                    comparison.averages.avg_feedback,
                    comparison.score.publication_score,
                    comparison.averages.avg_publication
                );
                println!("  standing: {}", comparison.standing);
            }
        }
        Commands::Report {
            year,
            out,
            max_in_flight,
        } => {
            let period = resolve_period(year.as_deref())?;
            let roster = db::fetch_roster(&pool).await?;
            info!(faculty = roster.len(), "building roster report");

            let store = db::PgActivityStore::new(pool.clone());
            let scored = score::score_roster(&store, &roster, &period, max_in_flight).await?;
            let items = actions::collect_actions(&scored);
            let report = report::build_report(&period, &scored, &items);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn resolve_period(year: Option<&str>) -> Result<ScoringPeriod, score::EngineError> {
    match year {
        Some(label) => ScoringPeriod::parse(label),
        None => ScoringPeriod::current_academic_year(chrono::Utc::now().date_naive()),
    }
}
