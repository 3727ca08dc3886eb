//! Hourly error dashboard.
//!
//! The display only reads the shared [`Controller`]: it redraws the 24 hour
//! cells once per refresh and appends whatever messages were announced since
//! the last frame.

use std::{
    io::{self, Stdout, stdout},
    sync::Arc,
    time::Instant,
};

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use num_format::{Locale, ToFormattedString};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::{
    signal,
    time::{Duration, interval},
};

use crate::{
    controller::Controller,
    error::{Error, Result},
    filter::HourlyCounts,
    invariants::Hour,
};

const REFRESH: Duration = Duration::from_secs(1);
const INPUT_POLL: Duration = Duration::from_millis(100);
const GRID_ROWS: usize = 6;
const GRID_COLS: usize = Hour::COUNT / GRID_ROWS;
const MAX_LOG_LINES: usize = 500;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn hour_label(hour: Hour, count: u64) -> String {
    format!("{hour}: [{count}]")
}

/// Hours run down the columns: 00..05 in the first, 06..11 in the second.
pub fn grid_position(hour: Hour) -> (usize, usize) {
    (hour.index() % GRID_ROWS, hour.index() / GRID_ROWS)
}

pub struct View<'a> {
    pub counts: HourlyCounts,
    pub log: &'a [String],
    pub finished: bool,
}

pub fn ui(f: &mut Frame, view: &View) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(f.area());
    render_grid(f, halves[0], &view.counts);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(halves[1]);
    render_log(f, right[0], view.log);
    render_status(f, right[1], view.finished);
}

fn render_grid(f: &mut Frame, area: Rect, counts: &HourlyCounts) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS])
        .split(area);
    let cells: Vec<_> = rows
        .iter()
        .map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
                .split(*row)
        })
        .collect();

    for hour in Hour::all() {
        let count = counts[hour.index()];
        let (row, col) = grid_position(hour);
        let style = if count > 0 {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let cell = Paragraph::new(hour_label(hour, count))
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(cell, cells[row][col]);
    }
}

fn render_log(f: &mut Frame, area: Rect, log: &[String]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Log")
        .border_style(Style::default().fg(Color::Blue));
    // Keep the newest lines in view.
    let visible = usize::from(area.height.saturating_sub(2));
    let lines: Vec<&str> = log.iter().flat_map(|m| m.lines()).collect();
    let scroll = lines.len().saturating_sub(visible);
    let text = lines[scroll..].join("\n");
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status(f: &mut Frame, area: Rect, finished: bool) {
    let (state, color) = if finished {
        ("finished", Color::Green)
    } else {
        ("running", Color::Yellow)
    };
    let status = Paragraph::new(format!("{state} | q: quit"))
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Data Streams"));
    f.render_widget(status, area);
}

/// Raw mode goes first: it is the step that fails without a TTY, and nothing
/// has been written to the screen yet when it does.
fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    let terminal = stdout()
        .execute(EnterAlternateScreen)
        .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())));
    if terminal.is_err() {
        let _ = restore();
    }
    terminal
}

fn restore() -> io::Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Runs the interactive dashboard until the user quits or a shutdown is
/// requested elsewhere. Blocking; run it off the async workers.
pub fn run(controller: &Controller) -> Result<()> {
    let mut terminal = init().map_err(|e| Error::Tui(format!("could not set up terminal: {e}")))?;
    let result = event_loop(&mut terminal, controller);
    restore().map_err(|e| Error::Tui(format!("could not restore terminal: {e}")))?;
    result
}

fn event_loop(terminal: &mut Tui, controller: &Controller) -> Result<()> {
    let mut log = Vec::new();
    let mut last_draw: Option<Instant> = None;
    while !controller.shutdown_requested() {
        if last_draw.is_none_or(|t| t.elapsed() >= REFRESH) {
            log.extend(controller.drain_messages());
            if log.len() > MAX_LOG_LINES {
                log.drain(..log.len() - MAX_LOG_LINES);
            }
            let view = View {
                counts: controller.counter.snapshot(),
                log: &log,
                finished: controller.processing_done(),
            };
            terminal.draw(|f| ui(f, &view))?;
            last_draw = Some(Instant::now());
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    controller.request_shutdown();
                }
            }
        }
    }
    Ok(())
}

/// Waits for processing to finish, then prints the final counts to stdout.
/// Ctrl+C requests a shutdown.
pub async fn run_headless(controller: Arc<Controller>) -> Result<()> {
    let mut ticker = interval(REFRESH);
    while !controller.processing_done() && !controller.shutdown_requested() {
        tokio::select! {
            _ = ticker.tick() => {
                // Already logged; just keep the feed from growing.
                controller.drain_messages();
            }
            _ = signal::ctrl_c() => controller.request_shutdown(),
        }
    }
    println!("{}", render_table(&controller.counter.snapshot()));
    Ok(())
}

pub fn render_table(counts: &HourlyCounts) -> String {
    let mut out = String::new();
    for row in 0..GRID_ROWS {
        let cells: Vec<String> = (0..GRID_COLS)
            .filter_map(|col| Hour::new((col * GRID_ROWS + row) as u8))
            .map(|hour| format!("{:<14}", hour_label(hour, counts[hour.index()])))
            .collect();
        out.push_str(cells.join("").trim_end());
        out.push('\n');
    }
    let total: u64 = counts.iter().sum();
    out.push_str(&format!("total: {}", total.to_formatted_string(&Locale::en)));
    out
}
