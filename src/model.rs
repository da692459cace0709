use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TaskCollection {
    tasks: BTreeMap<String, Task>,
}

/// A named run of `total` items, optionally grouped into chunks for display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub total: usize,
    /// Zero means the task is shown as one flat grid.
    #[serde(default)]
    pub chunk_size: usize,
    #[serde(default, with = "completed_states")]
    states: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Empty,
    Partial,
    Full,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task name is required")]
    EmptyName,
    #[error("total must be a positive whole number")]
    InvalidTotal,
    #[error("a task named {0} already exists")]
    DuplicateName(String),
    #[error("invalid group size {chunk_size}: must be between 1 and {}", .total.saturating_sub(1))]
    InvalidChunkSize { chunk_size: usize, total: usize },
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("no task selected")]
    NoTaskSelected,
    #[error("item {} is out of range (task has {total} items)", .index + 1)]
    ItemOutOfRange { index: usize, total: usize },
    #[error("chunk {} is out of range (task has {count} chunks)", .index + 1)]
    ChunkOutOfRange { index: usize, count: usize },
}

impl TaskCollection {
    pub fn new() -> Self {
        TaskCollection::default()
    }

    /// Validates and inserts a new empty task, returning the trimmed name it was stored under.
    pub fn create(
        &mut self,
        name: &str,
        total: usize,
        chunk_size: Option<usize>,
    ) -> Result<String, TaskError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }
        if total == 0 {
            return Err(TaskError::InvalidTotal);
        }
        if self.tasks.contains_key(name) {
            return Err(TaskError::DuplicateName(name.to_string()));
        }
        let chunk_size = match chunk_size {
            None => 0,
            Some(size) if size >= 1 && size < total => size,
            Some(size) => {
                return Err(TaskError::InvalidChunkSize {
                    chunk_size: size,
                    total,
                })
            }
        };
        self.tasks
            .insert(name.to_string(), Task::new(total, chunk_size));
        Ok(name.to_string())
    }

    pub fn remove(&mut self, name: &str) -> Option<Task> {
        self.tasks.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.tasks.keys().next().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drops completed indices that no longer fit their task. Returns how many were dropped.
    pub fn prune_out_of_range(&mut self) -> usize {
        self.tasks
            .values_mut()
            .map(|task| {
                let before = task.states.len();
                let total = task.total;
                task.states.retain(|&idx| idx < total);
                before - task.states.len()
            })
            .sum()
    }
}

impl Task {
    pub fn new(total: usize, chunk_size: usize) -> Self {
        Task {
            total,
            chunk_size,
            states: BTreeSet::new(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.chunk_size > 0
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.states.contains(&index)
    }

    pub fn completed_count(&self) -> usize {
        self.states.len()
    }

    /// Flips one item and returns whether it is complete afterwards.
    pub fn toggle(&mut self, index: usize) -> Result<bool, TaskError> {
        if index >= self.total {
            return Err(TaskError::ItemOutOfRange {
                index,
                total: self.total,
            });
        }
        if self.states.remove(&index) {
            Ok(false)
        } else {
            self.states.insert(index);
            Ok(true)
        }
    }

    pub fn chunk_count(&self) -> usize {
        if self.is_grouped() {
            self.total.div_ceil(self.chunk_size)
        } else {
            0
        }
    }

    pub fn chunk_range(&self, chunk: usize) -> Result<Range<usize>, TaskError> {
        let count = self.chunk_count();
        if chunk >= count {
            return Err(TaskError::ChunkOutOfRange {
                index: chunk,
                count,
            });
        }
        let start = chunk * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total);
        Ok(start..end)
    }

    pub fn completed_in(&self, range: Range<usize>) -> usize {
        self.states.range(range).count()
    }

    pub fn completed_in_chunk(&self, chunk: usize) -> Result<usize, TaskError> {
        Ok(self.completed_in(self.chunk_range(chunk)?))
    }

    pub fn chunk_state(&self, chunk: usize) -> Result<ChunkState, TaskError> {
        let range = self.chunk_range(chunk)?;
        let len = range.len();
        let done = self.completed_in(range);
        Ok(if done == len {
            ChunkState::Full
        } else if done > 0 {
            ChunkState::Partial
        } else {
            ChunkState::Empty
        })
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed_count() as f64 * 100.0) / self.total as f64
    }

    /// Whole percentages print bare, everything else with two decimals.
    pub fn percent_label(&self) -> String {
        if self.total == 0 || (self.completed_count() * 100) % self.total == 0 {
            format!("{:.0}", self.percent())
        } else {
            format!("{:.2}", self.percent())
        }
    }

    pub fn ratio(&self) -> f64 {
        (self.percent() / 100.0).clamp(0.0, 1.0)
    }
}

/// Completed indices live on disk as a sparse `index: 1` mapping.
mod completed_states {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::{BTreeMap, BTreeSet};

    pub fn serialize<S>(states: &BTreeSet<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sparse: BTreeMap<usize, u8> = states.iter().map(|&idx| (idx, 1)).collect();
        sparse.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sparse = BTreeMap::<usize, i64>::deserialize(deserializer)?;
        Ok(sparse
            .into_iter()
            .filter(|(_, state)| *state == 1)
            .map(|(idx, _)| idx)
            .collect())
    }
}
