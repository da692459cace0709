use crate::app::{App, TapOutcome};
use crate::grid::{CellKind, GridMode, GridView};
use crate::model::ChunkState;
use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::warn;

pub fn run(app: App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut tui = Tui::new(app);
    let result = tui.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct Tui {
    app: App,
    cursor: usize,
    grid_columns: usize,
    grid_offset: usize,
    menu_idx: usize,
    focus: Focus,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Creating(TaskForm),
    ConfirmDelete { name: String },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Grid,
    Menu,
}

struct TaskForm {
    name: FieldValue,
    total: FieldValue,
    chunk: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Name,
    Total,
    Chunk,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl Tui {
    fn new(app: App) -> Self {
        let status = format!(
            "Loaded {} task(s) from {}",
            app.tasks().len(),
            app.location().dir.display()
        );
        let mut tui = Tui {
            app,
            cursor: 0,
            grid_columns: 1,
            grid_offset: 0,
            menu_idx: 0,
            focus: Focus::Grid,
            status,
            mode: Mode::Normal,
        };
        tui.sync_menu();
        tui
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('n') => {
                self.mode = Mode::Creating(TaskForm::new());
                self.status = "New task (Tab/Shift-Tab move, Enter save, Esc cancel)".into();
                return Ok(false);
            }
            KeyCode::Char('d') => {
                let target = match self.focus {
                    Focus::Menu => self.menu_name(),
                    Focus::Grid => self.app.session().selected.clone(),
                };
                if let Some(name) = target {
                    self.status = format!("Delete {}? (y to confirm, n/Esc to cancel)", name);
                    self.mode = Mode::ConfirmDelete { name };
                } else {
                    self.status = "No task selected to delete".into();
                }
                return Ok(false);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Grid => Focus::Menu,
                    Focus::Menu => Focus::Grid,
                };
                self.sync_menu();
                return Ok(false);
            }
            _ => {}
        }

        match self.focus {
            Focus::Grid => self.handle_grid_key(key)?,
            Focus::Menu => self.handle_menu_key(key),
        }
        Ok(false)
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.app.view().cells.len();
        let columns = self.grid_columns.max(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.cursor >= columns {
                    self.cursor -= columns;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + columns < len {
                    self.cursor += columns;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.tap()?,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
            _ => {}
        }
        self.ensure_cursor_bounds();
        Ok(())
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let count = self.app.tasks().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.menu_idx = self.menu_idx.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.menu_idx + 1 < count {
                    self.menu_idx += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(name) = self.menu_name() {
                    self.app.select_task(&name);
                    self.cursor = 0;
                    self.focus = Focus::Grid;
                    self.status = format!("Opened {}", name);
                }
            }
            KeyCode::Esc => self.focus = Focus::Grid,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close_form = match &mut mode {
            Mode::Creating(form) => self.process_form_key(form, key)?,
            _ => true,
        };
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let name = match &self.mode {
            Mode::ConfirmDelete { name } => name.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.status = match self.app.delete_task(&name) {
                    Ok(_) => format!("Deleted {}", name),
                    Err(err) => format!("Delete failed: {}", err),
                };
                self.mode = Mode::Normal;
                self.cursor = 0;
                self.sync_menu();
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn process_form_key(&mut self, form: &mut TaskForm, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        match key.code {
            KeyCode::Esc => {
                close_form = true;
                self.status = "Canceled".into();
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.active_field_mut().move_left(),
            KeyCode::Right => form.active_field_mut().move_right(),
            KeyCode::Enter => match self.create_task_from_form(form) {
                Ok(name) => {
                    self.status = format!("Created {}", name);
                    close_form = true;
                }
                Err(err) => {
                    warn!(error = %err, "task not created");
                    self.status = format!("Could not create: {}", err);
                }
            },
            KeyCode::Backspace => form.active_field_mut().backspace(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        Ok(close_form)
    }

    fn create_task_from_form(&mut self, form: &TaskForm) -> Result<String> {
        let total = parse_count(&form.total.value)
            .ok_or_else(|| anyhow!("total must be a positive whole number"))?;
        let chunk = if form.chunk.value.trim().is_empty() {
            None
        } else {
            Some(
                parse_count(&form.chunk.value)
                    .ok_or_else(|| anyhow!("group size must be a whole number"))?,
            )
        };
        let name = self.app.create_task(&form.name.value, total, chunk)?;
        self.cursor = 0;
        self.focus = Focus::Grid;
        self.sync_menu();
        Ok(name)
    }

    fn tap(&mut self) -> Result<()> {
        match self.app.tap(self.cursor) {
            Ok(TapOutcome::Toggled { index, complete }) => {
                self.status = if complete {
                    format!("Item {} done", index + 1)
                } else {
                    format!("Item {} reopened", index + 1)
                };
            }
            Ok(TapOutcome::Zoomed(_)) => {
                self.cursor = 0;
                self.status = "Esc or b to return to the overview".into();
            }
            Ok(TapOutcome::Nothing) => {}
            Err(err) => self.status = format!("{}", err),
        }
        Ok(())
    }

    fn back(&mut self) {
        let zoomed = self.app.session().zoom;
        if self.app.back() {
            self.cursor = zoomed.unwrap_or(0);
        }
    }

    fn menu_name(&self) -> Option<String> {
        self.app
            .tasks()
            .names()
            .nth(self.menu_idx)
            .map(str::to_string)
    }

    fn sync_menu(&mut self) {
        if let Some(selected) = self.app.session().selected.as_deref() {
            if let Some(idx) = self.app.tasks().names().position(|n| n == selected) {
                self.menu_idx = idx;
                return;
            }
        }
        self.menu_idx = self
            .menu_idx
            .min(self.app.tasks().len().saturating_sub(1));
    }

    fn ensure_cursor_bounds(&mut self) {
        let len = self.app.view().cells.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        self.ensure_cursor_bounds();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(10)])
            .split(layout[1]);
        self.draw_menu(f, body[0]);
        self.draw_grid(f, body[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Creating(form) => self.draw_form(f, form),
            Mode::ConfirmDelete { name } => self.draw_confirm(f, name),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = self.app.stats();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(2)])
            .split(area);
        let title = Line::from(vec![
            Span::styled(
                "orbit ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(stats.title, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  •  "),
            Span::styled(
                stats.percent_label.clone(),
                Style::default().fg(Color::LightGreen),
            ),
            Span::raw("  •  "),
            Span::styled(
                streak_label(stats.streak),
                Style::default().fg(Color::LightYellow),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.app.location().scope.label(),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(title).alignment(Alignment::Center), rows[0]);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Rgb(30, 32, 40)))
            .ratio(stats.ratio)
            .label(format!(
                "{} ({}/{})",
                stats.percent_label, stats.completed, stats.total
            ));
        f.render_widget(gauge, rows[1]);
    }

    fn draw_menu(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Menu;
        let selected = self.app.session().selected.as_deref();
        let items = if self.app.tasks().is_empty() {
            vec![ListItem::new("No tasks (n to create)")]
        } else {
            self.app
                .tasks()
                .iter()
                .map(|(name, task)| {
                    let active = Some(name) == selected;
                    let marker = if active { "● " } else { "  " };
                    let width = area.width.saturating_sub(12) as usize;
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, Style::default().fg(Color::LightGreen)),
                        Span::styled(
                            truncate_text(name, width),
                            if active {
                                Style::default().add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            },
                        ),
                        Span::styled(
                            format!(" {}%", task.percent_label()),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect()
        };
        let mut state = ListState::default();
        if focused && !self.app.tasks().is_empty() {
            state.select(Some(self.menu_idx));
        }
        let block = Block::default()
            .title(Span::styled(
                format!("Tasks ({})", self.app.tasks().len()),
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_grid(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let view = self.app.view();
        let focused = self.focus == Focus::Grid;
        let accent = if focused { Color::Cyan } else { Color::DarkGray };
        let mut title = view.title.clone();
        if view.can_go_back() {
            title.push_str("  ← b");
        }
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(Color::Rgb(16, 18, 24)));

        if view.mode == GridMode::Empty {
            let msg = Paragraph::new("Select a task (Tab) or create one (n)")
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
            return;
        }

        let cell_width = cell_width(&view);
        let inner_width = area.width.saturating_sub(2) as usize;
        self.grid_columns = (inner_width / cell_width).max(1);
        let rows = grid_rows(&view, self.grid_columns, cell_width, focused.then_some(self.cursor));
        let viewport = area.height.saturating_sub(2) as usize;
        self.grid_offset = adjust_offset(
            self.cursor / self.grid_columns,
            self.grid_offset,
            viewport,
            1,
            rows.len(),
        );
        let grid = Paragraph::new(rows)
            .block(block)
            .scroll((scroll_rows(self.grid_offset), 0));
        f.render_widget(grid, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" tasks/grid  "),
        ];
        match self.focus {
            Focus::Grid => spans.extend([
                Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
                Span::raw(" move  "),
                Span::styled("Enter/Space", Style::default().fg(Color::LightGreen)),
                Span::raw(" tap  "),
                Span::styled("Esc/b", Style::default().fg(Color::LightYellow)),
                Span::raw(" back  "),
            ]),
            Focus::Menu => spans.extend([
                Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" browse  "),
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" open  "),
            ]),
        }
        spans.extend([
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("d", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm) {
        let area = centered_rect(60, 50, f.size());
        let mut fields = Vec::new();
        fields.extend(field_lines("Name", &form.name, form.field == FormField::Name));
        fields.extend(field_lines(
            "Total items",
            &form.total,
            form.field == FormField::Total,
        ));
        fields.extend(field_lines(
            "Group size (empty for none)",
            &form.chunk,
            form.field == FormField::Chunk,
        ));
        fields.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel • Tab/Shift-Tab to move",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        "New Task",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, name: &str) {
        let area = centered_rect(50, 30, f.size());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", name),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TaskForm {
    fn new() -> Self {
        TaskForm {
            name: FieldValue::new(""),
            total: FieldValue::new(""),
            chunk: FieldValue::new(""),
            field: FormField::Name,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Total,
            FormField::Total => FormField::Chunk,
            FormField::Chunk => FormField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Chunk,
            FormField::Total => FormField::Name,
            FormField::Chunk => FormField::Total,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Total => &mut self.total,
            FormField::Chunk => &mut self.chunk,
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn parse_count(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok()
}

/// Widest label plus brackets and a gap.
fn cell_width(view: &GridView) -> usize {
    view.cells
        .iter()
        .map(|c| c.label.chars().count())
        .max()
        .unwrap_or(1)
        + 3
}

fn cell_style(kind: &CellKind) -> Style {
    match kind {
        CellKind::Item { complete: true, .. } => Style::default().fg(Color::Black).bg(Color::Green),
        CellKind::Item {
            complete: false, ..
        } => Style::default().fg(Color::Gray),
        CellKind::Chunk { state, .. } => match state {
            ChunkState::Full => Style::default().fg(Color::Black).bg(Color::Green),
            ChunkState::Partial => Style::default().fg(Color::Black).bg(Color::Yellow),
            ChunkState::Empty => Style::default().fg(Color::DarkGray),
        },
    }
}

fn grid_rows(
    view: &GridView,
    columns: usize,
    cell_width: usize,
    cursor: Option<usize>,
) -> Vec<Line<'static>> {
    let label_width = cell_width.saturating_sub(3);
    view.cells
        .chunks(columns)
        .enumerate()
        .map(|(row_idx, row)| {
            let mut spans = Vec::with_capacity(row.len() * 2);
            for (col_idx, cell) in row.iter().enumerate() {
                let mut style = cell_style(&cell.kind);
                if cursor == Some(row_idx * columns + col_idx) {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                spans.push(Span::styled(
                    format!("[{:>label_width$}]", cell.label),
                    style,
                ));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        })
        .collect()
}

fn scroll_rows(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn streak_label(count: u32) -> String {
    format!("🔥 {}", count)
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = if active {
        Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let value = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    vec![
        Line::from(Span::styled(format!("{}:", label), label_style)),
        Line::from(format!("  {}", value)),
        Line::from(""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::project;
    use crate::model::Task;

    #[test]
    fn field_editing_respects_multibyte_chars() {
        let mut field = FieldValue::new("añb");
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "ab");
        field.move_left();
        field.insert_char('é');
        assert_eq!(field.value, "éab");
        field.move_right();
        assert_eq!(field.with_caret(), "éa▌b");
    }

    #[test]
    fn counts_parse_strictly() {
        assert_eq!(parse_count(" 12 "), Some(12));
        assert_eq!(parse_count("12abc"), None);
        assert_eq!(parse_count("-3"), None);
    }

    #[test]
    fn grid_rows_wrap_by_columns() {
        let task = Task::new(7, 0);
        let view = project("Read", &task, None);
        let width = cell_width(&view);
        assert_eq!(width, 4);
        let rows = grid_rows(&view, 3, width, Some(4));
        assert_eq!(rows.len(), 3);
        let cursor_style = rows[1].spans[2].style;
        assert!(cursor_style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn offset_follows_selection() {
        assert_eq!(adjust_offset(0, 0, 5, 1, 20), 0);
        assert_eq!(adjust_offset(10, 0, 5, 1, 20), 7);
        assert_eq!(adjust_offset(19, 0, 5, 1, 20), 15);
        assert_eq!(adjust_offset(3, 0, 0, 1, 20), 0);
    }

    #[test]
    fn scroll_saturates_on_huge_grids() {
        assert_eq!(scroll_rows(12), 12);
        assert_eq!(scroll_rows(70_000), u16::MAX);
    }

    #[test]
    fn streak_shows_flame() {
        assert_eq!(streak_label(4), "🔥 4");
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_text("Reading list", 8), "Readi...");
        assert_eq!(truncate_text("Read", 8), "Read");
    }
}
