use crate::data::Dataset;
use crate::error::Result;
use crate::filter::{SegmentSelection, segment_labels};
use crate::pipeline::{self, FilterParams, ViewModel};
use chrono::{NaiveDate, TimeDelta};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::*};
use std::collections::BTreeSet;
use std::io::{self, stdout};
use std::panic;
use std::rc::Rc;
use std::time::Duration;

use super::ui;

/// Dashboard page shown in the main area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Customers,
    States,
}

impl Page {
    fn next(self) -> Self {
        match self {
            Page::Customers => Page::States,
            Page::States => Page::Customers,
        }
    }
}

/// Which end of the date range a key moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RangeEnd {
    Start,
    End,
}

pub struct App {
    dataset: Rc<Dataset>,
    params: FilterParams,
    top_n: usize,
    pub page: Page,
    view: ViewModel,
    /// Segment vocabulary in first-seen order
    labels: Vec<String>,
    /// Checked labels of the multi-select
    checked: BTreeSet<String>,
    cursor: usize,
    running: bool,
}

impl App {
    pub fn new(dataset: Rc<Dataset>, params: FilterParams, top_n: usize) -> Self {
        let labels = segment_labels(&dataset.customers);
        let checked = match &params.segments {
            SegmentSelection::All => labels.iter().cloned().collect(),
            SegmentSelection::Only(set) => set.clone(),
        };
        let view = pipeline::render(&dataset, &params, top_n);

        App {
            dataset,
            params,
            top_n,
            page: Page::default(),
            view,
            labels,
            checked,
            cursor: 0,
            running: true,
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_checked(&self, label: &str) -> bool {
        self.checked.contains(label)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn file_name(&self) -> Option<String> {
        self.dataset
            .paths
            .transactions
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let _terminal_guard = enter_terminal()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        self.main_loop(&mut terminal)
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut needs_redraw = true;
        while self.running {
            if needs_redraw {
                terminal.draw(|frame| ui::render(frame, self))?;
                needs_redraw = false;
            }

            if event::poll(Duration::from_millis(80))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                        needs_redraw = true;
                    }
                    Event::Resize(_, _) => needs_redraw = true,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match key {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,

            // Pages
            KeyCode::Tab | KeyCode::BackTab => self.page = self.page.next(),
            KeyCode::Char('1') => self.page = Page::Customers,
            KeyCode::Char('2') => self.page = Page::States,

            // Segment multi-select
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current(),
            KeyCode::Char('a') => self.check_all(),
            KeyCode::Char('n') => self.check_none(),

            // Date pickers
            KeyCode::Char('[') => self.shift(RangeEnd::Start, -1),
            KeyCode::Char(']') => self.shift(RangeEnd::Start, 1),
            KeyCode::Char('{') => self.shift(RangeEnd::End, -1),
            KeyCode::Char('}') => self.shift(RangeEnd::End, 1),
            KeyCode::Char('<') => self.shift(RangeEnd::Start, -30),
            KeyCode::Char('>') => self.shift(RangeEnd::End, 30),
            KeyCode::Char('r') => self.reset_range(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        if self.labels.is_empty() {
            return;
        }
        let max = self.labels.len() as i32 - 1;
        self.cursor = (self.cursor as i32 + delta).clamp(0, max) as usize;
    }

    fn toggle_current(&mut self) {
        let Some(label) = self.labels.get(self.cursor) else {
            return;
        };
        if !self.checked.remove(label) {
            self.checked.insert(label.clone());
        }
        self.apply_selection();
    }

    fn check_all(&mut self) {
        self.checked = self.labels.iter().cloned().collect();
        self.apply_selection();
    }

    fn check_none(&mut self) {
        self.checked.clear();
        self.apply_selection();
    }

    fn apply_selection(&mut self) {
        let everything = self.labels.iter().all(|l| self.checked.contains(l));
        self.params.segments = if everything {
            SegmentSelection::All
        } else {
            SegmentSelection::Only(self.checked.clone())
        };
        self.refresh();
    }

    /// Move one end of the range by `days`, staying inside the data bounds
    fn shift(&mut self, which: RangeEnd, days: i64) {
        let Some(bounds) = self.dataset.bounds else {
            return;
        };
        let current = match which {
            RangeEnd::Start => self.params.start.unwrap_or(bounds.min),
            RangeEnd::End => self.params.end.unwrap_or(bounds.max),
        };
        let moved = bounds.clamp(add_days(current, days));
        match which {
            RangeEnd::Start => self.params.start = Some(moved),
            RangeEnd::End => self.params.end = Some(moved),
        }
        self.refresh();
    }

    fn reset_range(&mut self) {
        self.params.start = None;
        self.params.end = None;
        self.refresh();
    }

    /// Re-run the whole pipeline for the current filter
    fn refresh(&mut self) {
        self.view = pipeline::render(&self.dataset, &self.params, self.top_n);
    }
}

/// Runs its restore action when dropped, unwinding included
struct RestoreGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        (self.restore)()
    }
}

/// Raw mode plus alternate screen; undone when the guard drops
fn enter_terminal() -> Result<RestoreGuard<fn()>> {
    enable_raw_mode()?;
    let guard = RestoreGuard {
        restore: restore_terminal as fn(),
    };
    execute!(stdout(), EnterAlternateScreen)?;
    Ok(guard)
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, cursor::Show);
}

/// Restore the terminal before the panic message is printed
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days)).unwrap_or(date)
}
