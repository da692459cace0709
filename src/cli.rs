use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orbit", version, about = "Terminal progress grid with a daily streak")]
pub struct Cli {
    /// Store directory (overrides .orbit discovery and the global data dir)
    #[arg(long, global = true, env = "ORBIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project store in the current directory
    Init,
    /// Create a new task
    New {
        /// Task name
        name: String,
        /// Number of items to complete
        #[arg(long, short = 't')]
        total: usize,
        /// Group items into chunks of this size
        #[arg(long, short = 'c')]
        chunk: Option<usize>,
    },
    /// List tasks with their progress
    List,
    /// Print a task's grid
    Show {
        /// Task name
        name: String,
        /// Open one chunk (1-based) instead of the overview
        #[arg(long)]
        chunk: Option<usize>,
    },
    /// Toggle items (1-based item numbers)
    Toggle {
        /// Task name
        name: String,
        /// Item numbers to flip
        #[arg(required = true)]
        items: Vec<usize>,
    },
    /// Delete a task
    Delete {
        /// Task name
        name: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Show the current streak
    Streak,
    /// Launch the interactive TUI
    Tui,
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbose: u8) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Logs to stderr for one-shot commands.
pub fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Logs to a file so the alternate screen stays clean.
pub fn init_file_tracing(verbose: u8, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose)?)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_with_chunk() {
        let cli = Cli::try_parse_from(["orbit", "new", "Read", "--total", "10", "--chunk", "3"])
            .unwrap();
        match cli.command {
            Some(Command::New { name, total, chunk }) => {
                assert_eq!(name, "Read");
                assert_eq!(total, 10);
                assert_eq!(chunk, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli =
            Cli::try_parse_from(["orbit", "toggle", "Read", "1", "2", "-vv", "--data-dir", "x"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("x")));
        assert!(matches!(cli.command, Some(Command::Toggle { ref items, .. }) if items == &[1, 2]));
    }

    #[test]
    fn init_takes_no_name() {
        let cli = Cli::try_parse_from(["orbit", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Init)));
        assert!(Cli::try_parse_from(["orbit", "init", "--name", "x"]).is_err());
    }

    #[test]
    fn toggle_needs_items() {
        assert!(Cli::try_parse_from(["orbit", "toggle", "Read"]).is_err());
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "trace");
    }
}
