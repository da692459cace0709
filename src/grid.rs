//! Pure projection from a task and the session's zoom state to the cells the user sees.

use crate::model::{ChunkState, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    Empty,
    Flat,
    Overview,
    Zoomed { chunk: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Item { index: usize, complete: bool },
    Chunk { index: usize, state: ChunkState },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub label: String,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub title: String,
    pub mode: GridMode,
    pub cells: Vec<Cell>,
}

/// What a tap on a cell asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ToggleItem(usize),
    ZoomChunk(usize),
}

impl GridView {
    pub fn empty() -> Self {
        GridView {
            title: "Select Task".into(),
            mode: GridMode::Empty,
            cells: Vec::new(),
        }
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.mode, GridMode::Zoomed { .. })
    }

    pub fn intent_at(&self, position: usize) -> Option<Intent> {
        self.cells.get(position).map(|cell| match cell.kind {
            CellKind::Item { index, .. } => Intent::ToggleItem(index),
            CellKind::Chunk { index, .. } => Intent::ZoomChunk(index),
        })
    }
}

pub fn project(name: &str, task: &Task, zoom: Option<usize>) -> GridView {
    if !task.is_grouped() {
        return GridView {
            title: name.to_string(),
            mode: GridMode::Flat,
            cells: item_cells(task, 0..task.total),
        };
    }
    if let Some(chunk) = zoom {
        if let Ok(range) = task.chunk_range(chunk) {
            return GridView {
                title: format!("{} ({}-{})", name, range.start + 1, range.end),
                mode: GridMode::Zoomed { chunk },
                cells: item_cells(task, range),
            };
        }
    }
    let cells = (0..task.chunk_count())
        .filter_map(|chunk| {
            let range = task.chunk_range(chunk).ok()?;
            let state = task.chunk_state(chunk).ok()?;
            Some(Cell {
                label: format!("{}-{}", range.start + 1, range.end),
                kind: CellKind::Chunk {
                    index: chunk,
                    state,
                },
            })
        })
        .collect();
    GridView {
        title: name.to_string(),
        mode: GridMode::Overview,
        cells,
    }
}

fn item_cells(task: &Task, range: std::ops::Range<usize>) -> Vec<Cell> {
    range
        .map(|index| Cell {
            label: (index + 1).to_string(),
            kind: CellKind::Item {
                index,
                complete: task.is_complete(index),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_grid_has_one_cell_per_item() {
        let mut task = Task::new(4, 0);
        task.toggle(1).unwrap();
        let view = project("Read", &task, None);
        assert_eq!(view.mode, GridMode::Flat);
        assert_eq!(view.title, "Read");
        let labels: Vec<_> = view.cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3", "4"]);
        assert_eq!(
            view.cells[1].kind,
            CellKind::Item {
                index: 1,
                complete: true
            }
        );
        assert_eq!(view.intent_at(3), Some(Intent::ToggleItem(3)));
        assert_eq!(view.intent_at(4), None);
    }

    #[test]
    fn overview_labels_chunk_ranges() {
        let mut task = Task::new(10, 3);
        for idx in [0, 1, 2, 3] {
            task.toggle(idx).unwrap();
        }
        let view = project("Read", &task, None);
        assert_eq!(view.mode, GridMode::Overview);
        let labels: Vec<_> = view.cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["1-3", "4-6", "7-9", "10-10"]);
        assert_eq!(
            view.cells[0].kind,
            CellKind::Chunk {
                index: 0,
                state: ChunkState::Full
            }
        );
        assert_eq!(
            view.cells[1].kind,
            CellKind::Chunk {
                index: 1,
                state: ChunkState::Partial
            }
        );
        assert_eq!(view.intent_at(2), Some(Intent::ZoomChunk(2)));
        assert!(!view.can_go_back());
    }

    #[test]
    fn zoomed_view_shows_chunk_items() {
        let task = Task::new(10, 3);
        let view = project("Read", &task, Some(3));
        assert_eq!(view.title, "Read (10-10)");
        assert!(view.can_go_back());
        assert_eq!(view.cells.len(), 1);
        assert_eq!(view.intent_at(0), Some(Intent::ToggleItem(9)));

        let middle = project("Read", &task, Some(1));
        let labels: Vec<_> = middle.cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["4", "5", "6"]);
    }

    #[test]
    fn stale_zoom_falls_back_to_overview() {
        let task = Task::new(10, 3);
        assert_eq!(project("Read", &task, Some(9)).mode, GridMode::Overview);
        let flat = Task::new(10, 0);
        assert_eq!(project("Flat", &flat, Some(0)).mode, GridMode::Flat);
    }
}
