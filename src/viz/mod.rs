//! Terminal level meter
//!
//! Shows a live bar per key, the calibration range of each channel and a
//! history sparkline for one selected channel. Drives the keyboard itself,
//! one pass per refresh.

mod bars;

pub use bars::LevelBars;

use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame, Terminal,
};

use crate::driver::{Driver, OutputSink, SilenceGuard, Tick};
use crate::keyboard::RangeReport;

/// Recent levels of one channel
pub struct LevelHistory {
    levels: Vec<f64>,
    capacity: usize,
    write_pos: usize,
}

impl LevelHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            levels: vec![0.0; capacity],
            capacity,
            write_pos: 0,
        }
    }

    pub fn push(&mut self, level: f64) {
        self.levels[self.write_pos] = level;
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Levels oldest to newest
    pub fn ordered(&self) -> Vec<f64> {
        (0..self.capacity)
            .map(|i| self.levels[(self.write_pos + i) % self.capacity])
            .collect()
    }

    /// Levels as sparkline heights (0..=100)
    pub fn heights(&self) -> Vec<u64> {
        self.ordered()
            .into_iter()
            .map(|level| (level.clamp(0.0, 1.0) * 100.0).round() as u64)
            .collect()
    }
}

/// Meter state
pub struct MeterState {
    pub history: Vec<LevelHistory>,
    pub levels: Vec<f64>,
    pub notes: Vec<u8>,
    pub report: Option<RangeReport>,
    pub selected: usize,
    pub paused: bool,
}

impl MeterState {
    pub fn new(channels: usize, history: usize) -> Self {
        Self {
            history: (0..channels).map(|_| LevelHistory::new(history.max(1))).collect(),
            levels: vec![0.0; channels],
            notes: Vec::new(),
            report: None,
            selected: 0,
            paused: false,
        }
    }

    pub fn record(&mut self, tick: &Tick) {
        for (history, &level) in self.history.iter_mut().zip(&tick.levels) {
            history.push(level);
        }
        self.levels.clone_from(&tick.levels);
        self.notes.clone_from(&tick.notes);
    }

    pub fn select_next(&mut self) {
        if !self.history.is_empty() {
            self.selected = (self.selected + 1) % self.history.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.history.is_empty() {
            self.selected = (self.selected + self.history.len() - 1) % self.history.len();
        }
    }
}

/// Run the meter until `q`, `Esc` or Ctrl-C. The sink is silenced on exit.
pub fn run_meter<S: OutputSink + ?Sized>(
    driver: &mut Driver,
    sink: &mut S,
    interval: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    // Restores the terminal on every exit path, including a failed setup
    let _restore = OnDrop::new(restore_terminal);

    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut guard = SilenceGuard::new(sink);
    let mut state = MeterState::new(driver.keyboard().num_channels(), 120);
    meter_loop(&mut terminal, driver, &mut *guard, &mut state, interval)
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
}

/// Runs a closure once when dropped
struct OnDrop<F: FnMut()> {
    action: F,
}

impl<F: FnMut()> OnDrop<F> {
    fn new(action: F) -> Self {
        Self { action }
    }
}

impl<F: FnMut()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        (self.action)();
    }
}

fn meter_loop<S: OutputSink + ?Sized>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    driver: &mut Driver,
    sink: &mut S,
    state: &mut MeterState,
    interval: Duration,
) -> Result<()> {
    loop {
        if !state.paused {
            let tick = driver.tick(sink)?;
            state.record(&tick);
            state.report = Some(driver.keyboard().range_report());
        }

        terminal.draw(|f| draw_ui(f, state))?;

        if event::poll(interval)? {
            if let Event::Key(key) = event::read()? {
                match (key.code, key.modifiers) {
                    (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => break,
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => break,
                    (KeyCode::Char(' '), _) => state.paused = !state.paused,
                    (KeyCode::Down, _) | (KeyCode::Tab, _) => state.select_next(),
                    (KeyCode::Up, _) => state.select_previous(),
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn draw_ui(f: &mut Frame, state: &MeterState) {
    let area = f.area();
    let bars_height = state.levels.len() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(bars_height), // Levels
            Constraint::Min(4),              // History
            Constraint::Length(3),           // Status
        ])
        .split(area);

    let bars = LevelBars::new(&state.levels)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Levels "));
    f.render_widget(bars, chunks[0]);

    draw_history(f, chunks[1], state);
    draw_status(f, chunks[2], state);
}

fn draw_history(f: &mut Frame, area: Rect, state: &MeterState) {
    let Some(history) = state.history.get(state.selected) else {
        return;
    };
    let heights = history.heights();
    let recent = &heights[heights.len().saturating_sub(area.width as usize)..];

    let title = match state.report.as_ref().and_then(|r| r.channels.get(state.selected)) {
        Some(range) => format!(
            " ch{} history  [{:.0} .. {:.0}] {:?} ",
            state.selected, range.bounds.min, range.bounds.max, range.phase
        ),
        None => format!(" ch{} history ", state.selected),
    };

    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(recent)
        .max(100)
        .style(Style::default().fg(Color::Green));
    f.render_widget(sparkline, area);
}

fn draw_status(f: &mut Frame, area: Rect, state: &MeterState) {
    let status = if state.paused { "PAUSED" } else { "POLLING" };
    let status_color = if state.paused { Color::Yellow } else { Color::Green };
    let ticks = state.report.as_ref().map_or(0, |r| r.ticks);

    let text = Line::from(vec![
        Span::raw("  Status: "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(format!("  |  polls: {}  |  notes: {:?}  |  ", ticks, state.notes)),
        Span::raw("Space: pause  |  Up/Down: channel  |  q: quit"),
    ]);

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
