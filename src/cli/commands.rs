use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::task::Quadrant;

#[derive(Parser)]
#[command(name = "quad", about = concat!("quadrant v", env!("CARGO_PKG_VERSION"), " - urgent × important task board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data file to use (default: $QUADRANT_DATA, else the user data dir)
    #[arg(long = "data", value_name = "FILE", global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks, all quadrants or one
    List(ListArgs),
    /// Add a task to the end of a quadrant
    Add(AddArgs),
    /// Mark a task done, or not done again
    Toggle(TaskRef),
    /// Delete a task
    Rm(TaskRef),
    /// Move a task one position up or down inside its quadrant
    Mv(MvArgs),
    /// Move a task to another quadrant (or another spot in the same one)
    Transfer(TransferArgs),
    /// Export finished tasks to CSV
    Export(ExportArgs),
    /// Days left until the target date
    Countdown,
    /// Show or change board settings
    Config(ConfigCmd),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Quadrant to list: label, alias (do, schedule, delegate, eliminate) or 1-4
    pub quadrant: Option<Quadrant>,
    /// Only finished tasks
    #[arg(long, conflicts_with = "open")]
    pub done: bool,
    /// Only unfinished tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub content: String,
    /// Quadrant to add to
    #[arg(short, long, default_value = "紧急重要")]
    pub quadrant: Quadrant,
}

/// A task addressed by quadrant and 1-based position
#[derive(Args)]
pub struct TaskRef {
    /// Quadrant holding the task
    pub quadrant: Quadrant,
    /// Position in the quadrant, starting at 1
    #[arg(value_parser = parse_position)]
    pub position: usize,
}

fn parse_position(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid position: {}", s)),
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

#[derive(Args)]
pub struct MvArgs {
    #[command(flatten)]
    pub task: TaskRef,
    /// Direction to move
    #[arg(value_enum)]
    pub direction: Direction,
}

#[derive(Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub task: TaskRef,
    /// Destination quadrant
    pub to: Quadrant,
    /// Drop onto this 1-based position (default: end of the list)
    #[arg(long, value_parser = parse_position)]
    pub at: Option<usize>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: 已完成事项.csv)
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Key, e.g. main_title or font_sizes.task
        key: String,
    },
    /// Change one setting
    Set {
        /// Key, e.g. target_date or window_size.width
        key: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_defaults_to_urgent_important() {
        let cli = Cli::try_parse_from(["quad", "add", "buy milk"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.quadrant, Quadrant::UrgentImportant);
                assert_eq!(args.content, "buy milk");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn quadrants_parse_from_alias_and_digit() {
        let cli = Cli::try_parse_from(["quad", "transfer", "do", "2", "4", "--at", "1"]).unwrap();
        match cli.command {
            Some(Commands::Transfer(args)) => {
                assert_eq!(args.task.quadrant, Quadrant::UrgentImportant);
                assert_eq!(args.task.position, 2);
                assert_eq!(args.to, Quadrant::UrgentNotImportant);
                assert_eq!(args.at, Some(1));
            }
            _ => panic!("expected transfer"),
        }
    }

    #[test]
    fn position_zero_is_rejected() {
        assert!(Cli::try_parse_from(["quad", "toggle", "do", "0"]).is_err());
        assert!(Cli::try_parse_from(["quad", "toggle", "nowhere", "1"]).is_err());
        assert!(Cli::try_parse_from(["quad", "toggle", "do", "two"]).is_err());
        assert!(Cli::try_parse_from(["quad", "transfer", "do", "1", "4", "--at", "0"]).is_err());
        assert_eq!(parse_position("3"), Ok(3));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quad", "list", "--json", "--data", "/tmp/x.json"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/x.json")));
    }
}
