//! CourseTrack CLI - training course lifecycle tracker.

use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use coursetrack_core::{Course, CourseFilter, CourseId, CourseSpec, CourseState, MilestoneFlags};
use coursetrack_progress::{BasicCourseTracker, CourseTracker, Transition};
use coursetrack_storage::{JsonStorage, StorageConfig, DEFAULT_ROOT, EXPORT_FILE_NAME};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursetrack")]
#[command(about = "Training course lifecycle tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory
    #[arg(short, long, global = true, env = "COURSETRACK_HOME", default_value = DEFAULT_ROOT)]
    storage: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new course
    Add {
        /// Course name
        name: String,
        /// Learning objective
        #[arg(long, default_value = "")]
        objective: String,
        /// Owning organizational unit
        #[arg(long, default_value = "")]
        unit: String,
        /// Delivery modality
        #[arg(long, default_value = "In-person")]
        modality: String,
        /// Duration in hours
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
        /// Expected participants
        #[arg(long, default_value_t = 0)]
        participants: u32,
        /// External training provider
        #[arg(long, default_value = "")]
        provider: String,
    },
    /// List courses
    List {
        /// Filter by organizational unit
        #[arg(long)]
        unit: Option<String>,
        /// Filter by state
        #[arg(long)]
        state: Option<CourseState>,
        /// Search name and provider
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a course with its current milestones
    Show {
        /// Course ID
        id: CourseId,
    },
    /// Move a course to the next state
    Advance {
        /// Course ID
        id: CourseId,
    },
    /// Move a course back to the previous state
    Regress {
        /// Course ID
        id: CourseId,
    },
    /// Tick a sub-milestone (1-4)
    Check {
        /// Course ID
        id: CourseId,
        /// Milestone number
        milestone: usize,
    },
    /// Untick a sub-milestone (1-4)
    Uncheck {
        /// Course ID
        id: CourseId,
        /// Milestone number
        milestone: usize,
    },
    /// Set all four sub-milestones at once, e.g. `1101`
    Flags {
        /// Course ID
        id: CourseId,
        /// Four digits, 1 = done
        #[arg(value_parser = parse_flags)]
        flags: MilestoneFlags,
    },
    /// Clear the sub-milestones of a course
    ResetFlags {
        /// Course ID
        id: CourseId,
    },
    /// Suspend a course
    Suspend {
        /// Course ID
        id: CourseId,
    },
    /// Postpone a course
    Postpone {
        /// Course ID
        id: CourseId,
    },
    /// Delete a course
    Remove {
        /// Course ID
        id: CourseId,
    },
    /// Count courses per state
    Stats,
    /// Export the database as pretty-printed JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the database with a JSON document
    Import {
        /// Document to import
        path: PathBuf,
    },
    /// Erase the local database
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = StorageConfig::new(&cli.storage);
    let storage = JsonStorage::new(&config)
        .await
        .with_context(|| format!("cannot open data directory {}", cli.storage.display()))?;
    let mut tracker = BasicCourseTracker::open(storage).await?;
    info!(path = %config.payload_path().display(), "database opened");

    match cli.command {
        Commands::Add { name, objective, unit, modality, hours, participants, provider } => {
            let course = tracker
                .add_course(CourseSpec {
                    name,
                    objective,
                    unit,
                    modality,
                    hours,
                    participants,
                    provider,
                })
                .await?;
            println!("Added course: {} - {}", course.id, course.name);
        }
        Commands::List { unit, state, search } => {
            let courses = tracker.list(&CourseFilter { unit, state, search });
            println!("Courses ({})", courses.len());
            for course in courses {
                print_row(&course);
            }
        }
        Commands::Show { id } => {
            let Some(course) = tracker.database().course(&id).cloned() else {
                bail!("course not found: {id}");
            };
            let view = tracker.milestones(&id)?;

            println!("Course: {}", course.id);
            println!("  Name: {}", course.name);
            println!("  Objective: {}", course.objective);
            println!("  Unit: {}", course.unit);
            println!("  State: {}", view.state);
            println!("  Modality: {}", course.modality);
            println!("  Hours: {}", course.hours);
            println!("  Participants: {}", course.participants);
            println!("  Provider: {}", course.provider);
            println!("  Updated: {}", view.updated_at);
            if view.texts.is_empty() {
                println!("  No milestones for {}", view.state);
            } else {
                println!("  Milestones ({}/4):", view.flags.completed());
                for (i, (text, done)) in view.texts.iter().zip(view.flags.as_array()).enumerate() {
                    println!("    [{}] {}. {}", if done { "x" } else { " " }, i + 1, text);
                }
            }
        }
        Commands::Advance { id } => {
            let t = tracker.advance(&id).await?;
            report(&tracker, &id, t);
        }
        Commands::Regress { id } => {
            let t = tracker.regress(&id).await?;
            report(&tracker, &id, t);
        }
        Commands::Check { id, milestone } => {
            let before = state_of(&tracker, &id)?;
            let record = tracker.toggle_flag(&id, milestone, true).await?;
            report_flags(before, record.current_state(), record.flags());
        }
        Commands::Uncheck { id, milestone } => {
            let before = state_of(&tracker, &id)?;
            let record = tracker.toggle_flag(&id, milestone, false).await?;
            report_flags(before, record.current_state(), record.flags());
        }
        Commands::Flags { id, flags } => {
            let before = state_of(&tracker, &id)?;
            let record = tracker.set_flags(&id, flags).await?;
            report_flags(before, record.current_state(), record.flags());
        }
        Commands::ResetFlags { id } => {
            let record = tracker.reset(&id).await?;
            println!("Flags cleared ({})", record.current_state());
        }
        Commands::Suspend { id } => {
            let t = tracker.divert(&id, CourseState::Suspended).await?;
            report(&tracker, &id, Some(t));
        }
        Commands::Postpone { id } => {
            let t = tracker.divert(&id, CourseState::Postponed).await?;
            report(&tracker, &id, Some(t));
        }
        Commands::Remove { id } => {
            let course = tracker.remove_course(&id).await?;
            println!("Removed course: {} - {}", course.id, course.name);
        }
        Commands::Stats => {
            let snapshot = tracker.snapshot();
            println!("CourseTrack Status");
            for (state, count) in &snapshot.counts {
                println!("  {}: {}", state, count);
            }
            println!("  Total: {}", snapshot.total);
            if !snapshot.units.is_empty() {
                println!("Units: {}", snapshot.units.join(", "));
            }
        }
        Commands::Export { output } => match output {
            Some(path) => {
                tracker.export_to(&path).await?;
                println!("Exported to {}", path.display());
            }
            None => println!("{}", tracker.export()?),
        },
        Commands::Import { path } => {
            let applied = tracker
                .import_file(&path)
                .await
                .with_context(|| format!("could not import {}", path.display()))?;
            println!(
                "Imported {} courses from {}",
                tracker.database().courses().len(),
                path.display()
            );
            for t in applied {
                println!("  {} auto-advanced: {} -> {}", t.course_id, t.from, t.to);
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!(
                    "this erases the local database; export it first (e.g. to {}) and pass --yes",
                    EXPORT_FILE_NAME
                );
            }
            tracker.reset_all().await?;
            println!("Local database erased");
        }
    }

    Ok(())
}

fn parse_flags(s: &str) -> std::result::Result<MilestoneFlags, String> {
    let bits: Vec<bool> = s
        .chars()
        .filter(|c| !matches!(c, ',' | ' '))
        .map(|c| match c {
            '1' | 'x' | 'X' => Ok(true),
            '0' | '-' => Ok(false),
            other => Err(format!("unexpected flag character '{other}'")),
        })
        .collect::<std::result::Result<_, _>>()?;

    let flags: [bool; 4] = bits
        .try_into()
        .map_err(|_| "expected exactly four flags, e.g. 1101".to_string())?;
    Ok(flags.into())
}

fn state_of<T: CourseTracker>(tracker: &T, id: &CourseId) -> Result<CourseState> {
    match tracker.database().course(id) {
        Some(course) => Ok(course.state()),
        None => bail!("course not found: {id}"),
    }
}

fn print_row(course: &Course) {
    println!(
        "  {} | {} | {} | {} | {}h | {} | {}",
        course.id,
        course.name,
        if course.unit.is_empty() { "-" } else { &course.unit },
        course.state(),
        course.hours,
        course.participants,
        if course.provider.is_empty() { "-" } else { &course.provider },
    );
}

fn report<T: CourseTracker>(tracker: &T, id: &CourseId, t: Option<Transition>) {
    match t {
        Some(t) => println!("{}: {} -> {}", id, t.from, t.to),
        None => {
            let state = tracker
                .database()
                .course(id)
                .map(|c| c.state().to_string())
                .unwrap_or_default();
            println!("{}: no change ({})", id, state);
        }
    }
}

fn report_flags(before: CourseState, after: CourseState, flags: MilestoneFlags) {
    if before != after {
        println!("All milestones done: {} -> {}", before, after);
    } else {
        println!("{}: {}/4 milestones done", after, flags.completed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_flags("1101").unwrap().as_array(), [true, true, false, true]);
        assert_eq!(parse_flags("x-x-").unwrap().as_array(), [true, false, true, false]);
        assert_eq!(parse_flags("1, 0, 0, 1").unwrap().as_array(), [true, false, false, true]);
        assert!(parse_flags("110").is_err());
        assert!(parse_flags("11011").is_err());
        assert!(parse_flags("11a1").is_err());
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["coursetrack", "list", "--state", "in-progress"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List { state: Some(CourseState::InProgress), .. }
        ));

        let cli = Cli::try_parse_from(["coursetrack", "-s", "/tmp/x", "flags", "abc", "1111"]).unwrap();
        assert_eq!(cli.storage, PathBuf::from("/tmp/x"));
        assert!(matches!(cli.command, Commands::Flags { flags, .. } if flags.all_done()));

        assert!(Cli::try_parse_from(["coursetrack", "list", "--state", "archived"]).is_err());
    }
}
