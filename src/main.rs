use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use grade_tracker::config::Config;
use grade_tracker::models::DEFAULT_ASSESSMENT_TYPES;
use grade_tracker::{import, report, ConsoleSink, GradeTracker, SqliteStore, TrackerError};

#[derive(Parser)]
#[command(name = "grade-tracker")]
#[command(about = "Track subjects, grades and target-grade goals per term", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, default_value = "grade-tracker.toml")]
    config: PathBuf,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },
    /// Record and manage grades
    Grade {
        #[command(subcommand)]
        action: GradeCommand,
    },
    /// Manage target-grade goals
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },
    /// Show averages, GPA and trends
    Summary {
        /// Limit the summary to one subject
        #[arg(long)]
        subject: Option<Uuid>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Import grades from a CSV file
    ImportCsv {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        term: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    Add {
        name: String,
        term: String,
    },
    List,
    Edit {
        id: Uuid,
        name: String,
        term: String,
    },
    /// Delete a subject with all of its grades and its goal
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum GradeCommand {
    Add {
        subject: Uuid,
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Assessment type, e.g. Prelim, Midterm or Final
        #[arg(long = "type", default_value = DEFAULT_ASSESSMENT_TYPES[0])]
        assessment_type: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Edit {
        id: Uuid,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    Delete {
        id: Uuid,
    },
    List {
        subject: Uuid,
    },
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Set or replace the target grade for a subject
    Set {
        subject: Uuid,
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    Update {
        subject: Uuid,
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    Delete {
        subject: Uuid,
    },
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config =
        Config::load(Some(cli.config.as_path())).context("failed to load configuration")?;

    let store = SqliteStore::connect(&config.database_url)
        .await
        .context("failed to open the grade database")?;

    let tracker = GradeTracker::new(store, ConsoleSink)
        .with_low_grade_threshold(config.low_grade_threshold);

    let result = run(cli.command, &tracker).await;
    tracker.store().close().await;
    result
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(
    command: Commands,
    tracker: &GradeTracker<SqliteStore, ConsoleSink>,
) -> anyhow::Result<()> {
    match command {
        Commands::InitDb => {
            tracker.store().migrate().await?;
            println!("Schema ready.");
        }
        Commands::Subject { action } => match action {
            SubjectCommand::Add { name, term } => {
                let subject = tracker.add_subject(&name, &term).await.map_err(user_facing)?;
                println!("Added {} ({}) as {}.", subject.name, subject.term, subject.id);
            }
            SubjectCommand::List => {
                let subjects = tracker.subjects().await.map_err(user_facing)?;
                if subjects.is_empty() {
                    println!("No subjects yet.");
                }
                for subject in subjects {
                    println!("- {} {} ({})", subject.id, subject.name, subject.term);
                }
            }
            SubjectCommand::Edit { id, name, term } => {
                let subject = tracker
                    .update_subject(id, &name, &term)
                    .await
                    .map_err(user_facing)?;
                println!("Updated {} ({}).", subject.name, subject.term);
            }
            SubjectCommand::Delete { id } => {
                tracker.delete_subject(id).await.map_err(user_facing)?;
                println!("Subject deleted with its grades and goal.");
            }
        },
        Commands::Grade { action } => match action {
            GradeCommand::Add {
                subject,
                value,
                assessment_type,
                date,
            } => {
                let date = date.unwrap_or_else(|| Utc::now().date_naive());
                let grade = tracker
                    .record_grade(subject, &assessment_type, &value, date)
                    .await
                    .map_err(user_facing)?;
                println!(
                    "Grade saved: {} {} on {} ({}).",
                    grade.assessment_type, grade.value, grade.date, grade.id
                );
            }
            GradeCommand::Edit { id, value } => {
                let grade = tracker.edit_grade(id, &value).await.map_err(user_facing)?;
                println!("Grade updated to {}.", grade.value);
            }
            GradeCommand::Delete { id } => {
                tracker.delete_grade(id).await.map_err(user_facing)?;
                println!("Grade deleted.");
            }
            GradeCommand::List { subject } => {
                let grades = tracker.grades_for_subject(subject).await.map_err(user_facing)?;
                if grades.is_empty() {
                    println!("No grades recorded for this subject.");
                }
                for grade in grades {
                    println!(
                        "- {} {} {:.2} on {}",
                        grade.id, grade.assessment_type, grade.value, grade.date
                    );
                }
            }
        },
        Commands::Goal { action } => match action {
            GoalCommand::Set { subject, target } => {
                let goal = tracker.set_goal(subject, &target).await.map_err(user_facing)?;
                println!("Goal set to {}.", goal.target_value);
            }
            GoalCommand::Update { subject, target } => {
                let goal = tracker
                    .update_goal(subject, &target)
                    .await
                    .map_err(user_facing)?;
                println!("Goal updated to {}.", goal.target_value);
            }
            GoalCommand::Delete { subject } => {
                tracker.delete_goal(subject).await.map_err(user_facing)?;
                println!("Goal deleted.");
            }
            GoalCommand::List => {
                let goals = tracker.goal_displays().await.map_err(user_facing)?;
                if goals.is_empty() {
                    println!("No goals set.");
                }
                for goal in goals {
                    println!(
                        "- {}: current {:.2}, target {:.2} [{}]",
                        goal.subject_name,
                        goal.current_average,
                        goal.target,
                        goal.status().label()
                    );
                }
            }
        },
        Commands::Summary { subject, json } => match subject {
            Some(id) => {
                let overview = tracker.subject_overview(id).await.map_err(user_facing)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&overview)?);
                } else {
                    println!("{} ({})", overview.subject.name, overview.subject.term);
                    println!("Average: {:.2}", overview.average);
                    for point in overview.trend.iter() {
                        println!("  #{} {:.2}", point.index + 1, point.value);
                    }
                    if let Some(goal) = overview.goal {
                        println!(
                            "Goal: {:.2} [{}]",
                            goal.target,
                            goal.status().label()
                        );
                    }
                }
            }
            None => {
                let gpa = tracker.overall_gpa().await.map_err(user_facing)?;
                let trend = tracker.overall_trend().await.map_err(user_facing)?;
                if json {
                    let body = serde_json::json!({ "gpa": gpa, "trend": trend });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    println!("Overall GPA: {:.2} across {} grades", gpa, trend.len());
                }
            }
        },
        Commands::ImportCsv { csv } => {
            let summary = import::import_csv(tracker, &csv).await?;
            println!(
                "Inserted {} grades from {} ({} skipped).",
                summary.inserted,
                csv.display(),
                summary.skipped
            );
        }
        Commands::Report { term, out } => {
            let subjects = tracker.subjects().await.map_err(user_facing)?;
            let grades = tracker.all_grades().await.map_err(user_facing)?;
            let goals = tracker.goal_displays().await.map_err(user_facing)?;
            let report = report::build_report(
                term.as_deref(),
                Utc::now().date_naive(),
                &subjects,
                &grades,
                &goals,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn user_facing(err: TrackerError) -> anyhow::Error {
    error!(error = %err, "operation failed");
    anyhow::anyhow!(err.user_message())
}
