use crate::grid::{self, GridView, Intent};
use crate::model::{Task, TaskCollection, TaskError};
use crate::storage::{load_streak, load_tasks, save_streak, save_tasks, StoreLocation};
use crate::streak::StreakRecord;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

pub type Clock = Box<dyn Fn() -> NaiveDate>;

/// Which task is on screen and whether one of its chunks is opened. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub selected: Option<String>,
    pub zoom: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub title: String,
    pub percent_label: String,
    pub ratio: f64,
    pub completed: usize,
    pub total: usize,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Toggled { index: usize, complete: bool },
    Zoomed(usize),
    Nothing,
}

/// Owns every piece of application state and writes it back after each change.
pub struct App {
    tasks: TaskCollection,
    streak: StreakRecord,
    session: Session,
    location: StoreLocation,
    clock: Clock,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl App {
    pub fn load(location: StoreLocation) -> Result<Self> {
        Self::load_with_clock(location, Box::new(local_today))
    }

    pub fn load_with_clock(location: StoreLocation, clock: Clock) -> Result<Self> {
        let tasks = load_tasks(&location)?;
        let mut streak = load_streak(&location)?;
        if streak.check(clock()) {
            save_streak(&location, &streak)?;
        }
        debug!(
            tasks = tasks.len(),
            streak = streak.count,
            dir = %location.dir.display(),
            "loaded store"
        );
        let mut app = App {
            tasks,
            streak,
            session: Session::default(),
            location,
            clock,
        };
        if let Some(first) = app.tasks.first_name().map(str::to_string) {
            app.select_task(&first);
        }
        Ok(app)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn streak(&self) -> &StreakRecord {
        &self.streak
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selected_task(&self) -> Option<(&str, &Task)> {
        let name = self.session.selected.as_deref()?;
        self.tasks.get(name).map(|task| (name, task))
    }

    pub fn create_task(
        &mut self,
        name: &str,
        total: usize,
        chunk_size: Option<usize>,
    ) -> Result<String> {
        let name = self.tasks.create(name, total, chunk_size)?;
        self.save_tasks()?;
        info!(task = %name, total, chunk_size = chunk_size.unwrap_or(0), "created task");
        self.select_task(&name);
        Ok(name)
    }

    /// Unknown names are ignored.
    pub fn select_task(&mut self, name: &str) -> bool {
        if !self.tasks.contains(name) {
            return false;
        }
        debug!(task = name, "selected task");
        self.session.selected = Some(name.to_string());
        self.session.zoom = None;
        true
    }

    /// Removes a task the user already confirmed deleting.
    pub fn delete_task(&mut self, name: &str) -> Result<bool> {
        if self.tasks.remove(name).is_none() {
            return Ok(false);
        }
        if self.session.selected.as_deref() == Some(name) {
            self.session = Session::default();
        }
        self.save_tasks()?;
        info!(task = name, "deleted task");
        Ok(true)
    }

    pub fn toggle_item(&mut self, index: usize) -> Result<bool> {
        let name = self
            .session
            .selected
            .clone()
            .ok_or(TaskError::NoTaskSelected)?;
        self.toggle_item_in(&name, index)
    }

    /// Flips one item of the named task and returns whether it is now complete.
    pub fn toggle_item_in(&mut self, name: &str, index: usize) -> Result<bool> {
        let task = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| TaskError::TaskNotFound(name.to_string()))?;
        let complete = task.toggle(index)?;
        self.save_tasks()?;
        debug!(task = name, index, complete, "toggled item");
        if complete && self.streak.record_completion((self.clock)()) {
            save_streak(&self.location, &self.streak)?;
        }
        Ok(complete)
    }

    pub fn zoom_chunk(&mut self, chunk: usize) -> Result<()> {
        let (_, task) = self.selected_task().ok_or(TaskError::NoTaskSelected)?;
        task.chunk_range(chunk)?;
        self.session.zoom = Some(chunk);
        Ok(())
    }

    pub fn back(&mut self) -> bool {
        self.session.zoom.take().is_some()
    }

    pub fn view(&self) -> GridView {
        match self.selected_task() {
            Some((name, task)) => grid::project(name, task, self.session.zoom),
            None => GridView::empty(),
        }
    }

    /// Resolves a tap on the cell at `position` of the current view.
    pub fn tap(&mut self, position: usize) -> Result<TapOutcome> {
        match self.view().intent_at(position) {
            Some(Intent::ToggleItem(index)) => {
                let complete = self.toggle_item(index)?;
                Ok(TapOutcome::Toggled { index, complete })
            }
            Some(Intent::ZoomChunk(chunk)) => {
                self.zoom_chunk(chunk)?;
                Ok(TapOutcome::Zoomed(chunk))
            }
            None => Ok(TapOutcome::Nothing),
        }
    }

    pub fn stats(&self) -> Stats {
        let title = self.view().title;
        match self.selected_task() {
            Some((_, task)) => Stats {
                title,
                percent_label: format!("{}%", task.percent_label()),
                ratio: task.ratio(),
                completed: task.completed_count(),
                total: task.total,
                streak: self.streak.count,
            },
            None => Stats {
                title,
                percent_label: "0%".into(),
                ratio: 0.0,
                completed: 0,
                total: 0,
                streak: self.streak.count,
            },
        }
    }

    fn save_tasks(&self) -> Result<()> {
        save_tasks(&self.location, &self.tasks)
    }
}
