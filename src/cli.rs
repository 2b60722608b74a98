use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dayboard", version, about = "Terminal todo planner for today, upcoming days and beyond")]
pub struct Cli {
    /// Directory holding the todo files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to an alternative config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Which bucket a command works on. Defaults to today.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct BucketArgs {
    /// Date in YYYY-MM-DD format
    #[arg(long)]
    pub date: Option<String>,
    /// Use the undated general list
    #[arg(long)]
    pub general: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List todos for a date, the general list, or the upcoming window
    List {
        #[command(flatten)]
        bucket: BucketArgs,
        /// Show every todo due after today within the upcoming window
        #[arg(long, conflicts_with_all = ["date", "general"])]
        upcoming: bool,
    },
    /// Add a new todo
    Add {
        /// Title of the todo
        title: String,
        /// Optional description
        #[arg(long, short = 'd')]
        description: Option<String>,
        #[command(flatten)]
        bucket: BucketArgs,
    },
    /// Toggle completion of a todo
    Done {
        /// Todo id
        id: String,
        #[command(flatten)]
        bucket: BucketArgs,
    },
    /// Delete a todo
    Remove {
        /// Todo id
        id: String,
        #[command(flatten)]
        bucket: BucketArgs,
    },
    /// Launch the interactive TUI
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["dayboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_with_general_flag() {
        let cli = Cli::try_parse_from(["dayboard", "add", "Buy milk", "--general"]).unwrap();
        match cli.command {
            Some(Command::Add { title, bucket, .. }) => {
                assert_eq!(title, "Buy milk");
                assert!(bucket.general);
                assert!(bucket.date.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_date_and_general_conflict() {
        let parsed =
            Cli::try_parse_from(["dayboard", "done", "abcd1234", "--general", "--date", "2026-10-19"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli = Cli::try_parse_from(["dayboard", "list", "--data-dir", "/tmp/todos"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/todos")));
    }
}
