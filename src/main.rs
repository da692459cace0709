use anyhow::Result;
use clap::Parser;
use orbit::{cli, commands};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let data_dir = args.data_dir.as_deref();
    let command = args.command.unwrap_or(cli::Command::Tui);
    if !matches!(command, cli::Command::Tui) {
        cli::init_tracing(args.verbose)?;
    }
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::New { name, total, chunk } => {
            commands::new_task(data_dir, name, total, chunk)
        }
        cli::Command::List => commands::list(data_dir),
        cli::Command::Show { name, chunk } => commands::show(data_dir, name, chunk),
        cli::Command::Toggle { name, items } => commands::toggle(data_dir, name, items),
        cli::Command::Delete { name, yes } => commands::delete(data_dir, name, yes),
        cli::Command::Streak => commands::streak(data_dir),
        cli::Command::Tui => commands::tui(data_dir, args.verbose),
    }
}
