/// Main entry point for the Smart Tracker CLI
///
/// This file sets up logging, parses command line arguments, and drives the
/// tracker's command surface from the terminal. Each invocation loads state,
/// applies one command, flushes pending saves, and exits.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use smart_tracker::app::ViewModel;
use smart_tracker::{
    AddHabitParams, Frequency, HabitId, Notice, Position, Priority, SmartTracker, StatusFilter,
    Theme, TrackerError,
};

/// Get the default database path with a fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".smart_tracker");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("smart_tracker");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("smart_tracker");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".smart_tracker");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let mut db_path = potential_path.clone();
            db_path.push("habits.db");
            return Ok(db_path);
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("smart_tracker");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Smart Tracker CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new habit
    Add {
        /// Display name, 3-30 letters/digits/spaces
        name: String,
        /// Progress goal per period
        #[arg(short, long, default_value_t = 1)]
        target: u32,
        /// daily or weekly
        #[arg(short, long, default_value = "daily")]
        frequency: Frequency,
        /// low, medium, or high
        #[arg(short, long, default_value = "low")]
        priority: Priority,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Show the filtered habit list and stats
    List,
    /// Advance a habit's progress by one
    Done { habit: String },
    /// Pause or resume a habit
    Pause { habit: String },
    /// Delete a habit (the last deletion can be undone)
    Delete { habit: String },
    /// Restore the most recently deleted habit
    Undo,
    /// Move a habit before or after another one
    Move {
        habit: String,
        #[arg(long, conflicts_with = "after")]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
    },
    /// Show aggregate stats
    Stats,
    /// Set the status filter (all, active, paused, completed)
    Filter { status: StatusFilter },
    /// Set the free-text search query
    Search { query: String },
    /// Clear the status filter and search query
    ClearFilters,
    /// Set the UI theme (light or dark)
    Theme { theme: Theme },
    /// Enable or disable notifications
    Notifications {
        #[arg(value_parser = clap::value_parser!(bool))]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("smart_tracker={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for command output
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let mut tracker = SmartTracker::open(&db_path).await?;

    match run_command(&mut tracker, args.command) {
        Ok(()) => {}
        Err(TrackerError::Domain(err)) => {
            // Validation problems aren't crashes; report and exit non-zero
            eprintln!("Error: {}", err);
            tracker.flush().await;
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }

    tracker.flush().await;
    for notice in tracker.take_background_notices() {
        print_notice(&notice);
    }

    Ok(())
}

fn run_command(tracker: &mut SmartTracker, command: Command) -> Result<(), TrackerError> {
    match command {
        Command::Add { name, target, frequency, priority, tags } => {
            let outcome = tracker.add_habit(AddHabitParams {
                name,
                target,
                frequency,
                priority,
                tags: smart_tracker::domain::parse_tags(&tags),
            })?;
            report(outcome.notice, &outcome.view);
        }
        Command::List => {
            print_view(&tracker.view());
        }
        Command::Done { habit } => {
            let id = resolve(tracker, &habit)?;
            let outcome = tracker.increment_habit(id);
            report(outcome.notice, &outcome.view);
        }
        Command::Pause { habit } => {
            let id = resolve(tracker, &habit)?;
            let outcome = tracker.toggle_pause(id);
            report(outcome.notice, &outcome.view);
        }
        Command::Delete { habit } => {
            let id = resolve(tracker, &habit)?;
            let outcome = tracker.delete_habit(id);
            report(outcome.notice, &outcome.view);
        }
        Command::Undo => {
            let outcome = tracker.undo_delete()?;
            report(outcome.notice, &outcome.view);
        }
        Command::Move { habit, before, after } => {
            let dragged = resolve(tracker, &habit)?;
            let (target, position) = match (before, after) {
                (Some(target), None) => (resolve(tracker, &target)?, Position::Before),
                (None, Some(target)) => (resolve(tracker, &target)?, Position::After),
                _ => {
                    return Err(smart_tracker::DomainError::Validation {
                        message: "Pass exactly one of --before or --after".to_string(),
                    }
                    .into())
                }
            };
            let outcome = tracker.reorder(dragged, target, position);
            print_view(&outcome.view);
        }
        Command::Stats => {
            let stats = tracker.stats();
            println!(
                "Total: {}  Completed: {}  Rate: {}%  Best streak: {}",
                stats.total, stats.completed, stats.completion_rate, stats.longest_streak
            );
        }
        Command::Filter { status } => {
            let outcome = tracker.set_filter(status);
            print_view(&outcome.view);
        }
        Command::Search { query } => {
            let outcome = tracker.set_query(&query);
            print_view(&outcome.view);
        }
        Command::ClearFilters => {
            let outcome = tracker.clear_filters();
            print_view(&outcome.view);
        }
        Command::Theme { theme } => {
            let outcome = tracker.set_theme(theme);
            report(outcome.notice, &outcome.view);
        }
        Command::Notifications { enabled } => {
            let outcome = tracker.set_notifications(enabled);
            if let Some(notice) = outcome.notice {
                print_notice(&notice);
            }
        }
    }
    Ok(())
}

/// Resolve a habit reference given as either a numeric ID or an exact name
fn resolve(tracker: &SmartTracker, reference: &str) -> Result<HabitId, TrackerError> {
    if let Ok(id) = reference.parse::<HabitId>() {
        return Ok(id);
    }
    tracker
        .find_by_name(reference)
        .ok_or_else(|| {
            smart_tracker::DomainError::Validation {
                message: format!("No habit named '{}'", reference),
            }
            .into()
        })
}

fn report(notice: Option<Notice>, view: &ViewModel) {
    if let Some(notice) = notice {
        print_notice(&notice);
    }
    print_view(view);
}

fn print_notice(notice: &Notice) {
    println!("[{:?}] {}", notice.level, notice.text);
}

fn print_view(view: &ViewModel) {
    if view.habits.is_empty() {
        println!("No habits to show.");
    }
    for habit in &view.habits {
        let tags = if habit.tags.is_empty() {
            String::new()
        } else {
            format!("  #{}", habit.tags.join(" #"))
        };
        println!(
            "{:>13}  {:<30}  {}/{} {:<9} streak {:<3} [{}]{}",
            habit.id,
            habit.name,
            habit.progress,
            habit.target,
            habit.frequency.as_str(),
            habit.streak,
            habit.status.as_str(),
            tags
        );
    }
    let stats = &view.stats;
    println!(
        "-- {} habits, {} completed ({}%), best streak {}",
        stats.total, stats.completed, stats.completion_rate, stats.longest_streak
    );
}
