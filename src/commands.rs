use crate::app::App;
use crate::grid::{CellKind, GridView};
use crate::model::{ChunkState, TaskError};
use crate::storage::{init_project_store, locate_store, StoreLocation};
use crate::ui;
use anyhow::{anyhow, bail, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const CELLS_PER_ROW: usize = 10;

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    println!("Initialized store at {}", location.dir.display());
    Ok(())
}

pub fn new_task(
    data_dir: Option<&Path>,
    name: String,
    total: usize,
    chunk: Option<usize>,
) -> Result<()> {
    let mut app = load_app(data_dir)?;
    let name = app.create_task(&name, total, chunk)?;
    match chunk {
        Some(size) => println!("Created {} ({} items in groups of {})", name, total, size),
        None => println!("Created {} ({} items)", name, total),
    }
    Ok(())
}

pub fn list(data_dir: Option<&Path>) -> Result<()> {
    let app = load_app(data_dir)?;
    println!(
        "Store: {} ({})",
        app.location().dir.display(),
        app.location().scope.label()
    );
    if app.tasks().is_empty() {
        println!("  (no tasks)");
    }
    for (name, task) in app.tasks().iter() {
        let grouping = if task.is_grouped() {
            format!(", groups of {}", task.chunk_size)
        } else {
            String::new()
        };
        println!(
            "  - {}: {}/{} ({}%{})",
            name,
            task.completed_count(),
            task.total,
            task.percent_label(),
            grouping
        );
    }
    println!("Streak: {}", app.streak().count);
    Ok(())
}

pub fn show(data_dir: Option<&Path>, name: String, chunk: Option<usize>) -> Result<()> {
    let mut app = load_app(data_dir)?;
    if !app.select_task(&name) {
        bail!("task {} not found", name);
    }
    if let Some(number) = chunk {
        app.zoom_chunk(one_based(number, "chunk")?)?;
    }
    let stats = app.stats();
    println!("{}", stats.title);
    println!(
        "{} done ({}/{})  streak {}",
        stats.percent_label, stats.completed, stats.total, stats.streak
    );
    for line in grid_lines(&app.view()) {
        println!("{}", line);
    }
    Ok(())
}

pub fn toggle(data_dir: Option<&Path>, name: String, items: Vec<usize>) -> Result<()> {
    let mut app = load_app(data_dir)?;
    if !app.select_task(&name) {
        bail!("task {} not found", name);
    }
    let total = app.selected_task().map(|(_, task)| task.total).unwrap_or(0);
    let indices = item_indices(&items, total)?;
    for (number, index) in items.into_iter().zip(indices) {
        let complete = app.toggle_item(index)?;
        println!(
            "{} item {}: {}",
            name,
            number,
            if complete { "done" } else { "open" }
        );
    }
    let stats = app.stats();
    println!("{} now at {}  streak {}", name, stats.percent_label, stats.streak);
    Ok(())
}

pub fn delete(data_dir: Option<&Path>, name: String, yes: bool) -> Result<()> {
    let mut app = load_app(data_dir)?;
    if !app.tasks().contains(&name) {
        bail!("task {} not found", name);
    }
    if !yes && !confirm(&format!("Delete {}?", name))? {
        println!("Delete canceled");
        return Ok(());
    }
    app.delete_task(&name)?;
    println!("Deleted {}", name);
    Ok(())
}

pub fn streak(data_dir: Option<&Path>) -> Result<()> {
    let app = load_app(data_dir)?;
    let streak = app.streak();
    match streak.last_date {
        Some(date) => println!("Streak: {} (last active {})", streak.count, date),
        None => println!("Streak: {}", streak.count),
    }
    Ok(())
}

pub fn tui(data_dir: Option<&Path>, verbose: u8) -> Result<()> {
    let location = resolve_location(data_dir)?;
    crate::cli::init_file_tracing(verbose, &location.log_path())?;
    let app = App::load(location)?;
    ui::run(app)
}

pub fn resolve_location(data_dir: Option<&Path>) -> Result<StoreLocation> {
    let cwd: PathBuf = env::current_dir()?;
    locate_store(&cwd, data_dir)
}

fn load_app(data_dir: Option<&Path>) -> Result<App> {
    App::load(resolve_location(data_dir)?)
}

fn one_based(number: usize, what: &str) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("{} numbers start at 1", what))
}

/// Converts every typed item number up front so a bad one rejects the whole batch.
fn item_indices(items: &[usize], total: usize) -> Result<Vec<usize>> {
    items
        .iter()
        .map(|&number| {
            let index = one_based(number, "item")?;
            if index >= total {
                return Err(TaskError::ItemOutOfRange { index, total }.into());
            }
            Ok(index)
        })
        .collect()
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn cell_marker(kind: &CellKind) -> &'static str {
    match kind {
        CellKind::Item { complete: true, .. } => "[x]",
        CellKind::Item {
            complete: false, ..
        } => "[ ]",
        CellKind::Chunk { state, .. } => match state {
            ChunkState::Full => "[#]",
            ChunkState::Partial => "[~]",
            ChunkState::Empty => "[ ]",
        },
    }
}

fn grid_lines(view: &GridView) -> Vec<String> {
    if view.cells.is_empty() {
        return vec!["  (empty)".into()];
    }
    let width = view
        .cells
        .iter()
        .map(|c| c.label.chars().count())
        .max()
        .unwrap_or(1);
    view.cells
        .chunks(CELLS_PER_ROW)
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| format!("{} {:>width$}", cell_marker(&cell.kind), cell.label))
                .collect();
            format!("  {}", cells.join("  "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::project;
    use crate::model::Task;

    #[test]
    fn grid_lines_wrap_and_mark_cells() {
        let mut task = Task::new(12, 0);
        task.toggle(0).unwrap();
        let lines = grid_lines(&project("Read", &task, None));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  [x]  1  [ ]  2"));
        assert!(lines[1].contains("[ ] 12"));
    }

    #[test]
    fn overview_marks_chunk_states() {
        let mut task = Task::new(10, 3);
        for idx in [0, 1, 2, 3] {
            task.toggle(idx).unwrap();
        }
        let lines = grid_lines(&project("Read", &task, None));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[#]   1-3"));
        assert!(lines[0].contains("[~]   4-6"));
        assert!(lines[0].contains("[ ] 10-10"));
    }

    #[test]
    fn item_numbers_are_one_based() {
        assert_eq!(one_based(1, "item").unwrap(), 0);
        assert!(one_based(0, "item").is_err());
    }

    #[test]
    fn item_batch_is_checked_before_use() {
        assert_eq!(item_indices(&[1, 10, 3], 10).unwrap(), vec![0, 9, 2]);
        let err = item_indices(&[1, 2, 99], 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TaskError>(),
            Some(&TaskError::ItemOutOfRange {
                index: 98,
                total: 10
            })
        );
        assert!(err.to_string().contains("item 99"));
        assert!(item_indices(&[0], 10).is_err());
    }
}
