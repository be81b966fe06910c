//! Terminal-independent UI state. The event loop in `tui` feeds it keys and
//! pipeline messages; `view` draws a snapshot of it.
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sift_pipeline::{ERROR_HINT, Presenter, Report, Stage};
use std::error::Error;
use std::io;

use crate::command::{Command, PanelTarget, parse_command};
use crate::input::InputLine;
use crate::styles;
use crate::transcript::{ReportView, TranscriptLine};

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// What the event loop must do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ask(String),
    Quit,
}

pub struct App {
    pub(crate) input: InputLine,
    history: Vec<TranscriptLine>,
    current: Option<ReportView>,
    pub(crate) scroll: usize,
    stage: Option<Stage>,
    spin_idx: usize,
    pub(crate) dirty: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            input: InputLine::default(),
            history: vec![TranscriptLine::new(
                "Ask a question and press Enter. Tab selects a result, Enter on an empty line opens it. /help lists commands.",
                styles::system(),
            )],
            current: None,
            scroll: 0,
            stage: None,
            spin_idx: 0,
            dirty: true,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.stage.is_some()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn report_view(&self) -> Option<&ReportView> {
        self.current.as_ref()
    }

    pub fn spinner(&self) -> &'static str {
        if self.is_busy() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    pub fn step_spinner(&mut self) {
        if self.is_busy() {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    /// History followed by the live report.
    pub fn lines(&self) -> Vec<TranscriptLine> {
        let mut out = self.history.clone();
        if let Some(view) = &self.current {
            out.extend(view.lines());
        }
        out
    }

    fn push_styled(&mut self, s: impl Into<String>, style: ratatui::style::Style) {
        self.history.push(TranscriptLine::new(s, style));
        self.dirty = true;
    }

    fn push_blank(&mut self) {
        self.push_styled("", styles::value());
    }

    /// Freeze the live report into history so its panels stop reacting.
    fn archive_current(&mut self) {
        if let Some(view) = self.current.take() {
            self.history.extend(view.lines());
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(Action::Quit),
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Tab, _) => self.cycle_selection(true),
            (KeyCode::BackTab, _) => self.cycle_selection(false),
            (KeyCode::Enter, _) if self.input.is_blank() => {
                self.input.clear();
                if let Some(view) = self.current.as_mut() {
                    view.toggle_selected();
                }
            }
            (KeyCode::Enter, _) => {
                let line = self.input.take();
                self.dirty = true;
                return self.submit(line);
            }
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Esc, _) => self.input.clear(),
            (KeyCode::Char(ch), _) => self.input.insert(ch),
            _ => return None,
        }
        self.dirty = true;
        None
    }

    fn cycle_selection(&mut self, forward: bool) {
        if let Some(view) = self.current.as_mut() {
            view.cycle_selection(forward);
        }
    }

    fn submit(&mut self, line: String) -> Option<Action> {
        let text = line.trim().to_string();
        if text.is_empty() {
            return None;
        }
        if text.starts_with('/') {
            return self.handle_command(parse_command(&text));
        }
        if self.is_busy() {
            self.push_styled(
                "× Still answering the previous question; please wait.",
                styles::error(),
            );
            return None;
        }

        self.archive_current();
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.push_styled(format!("→ [You] {stamp}"), styles::user_header());
        self.push_styled(format!("  {text}"), styles::user_text());
        self.push_blank();
        self.stage = Some(Stage::Expanding);
        self.scroll = 0;
        Some(Action::Ask(text))
    }

    fn handle_command(&mut self, cmd: Command) -> Option<Action> {
        match cmd {
            Command::Quit => return Some(Action::Quit),
            Command::Help => {
                self.push_styled("Commands:", styles::label());
                for row in [
                    "  Tab / Shift+Tab   select next / previous result",
                    "  Enter (empty)     open or close the selected result",
                    "  /expand [n|all]   open result n, all, or the selected one",
                    "  /collapse [n|all] close result n, all, or the selected one",
                    "  /clear            clear the transcript",
                    "  /quit             exit",
                ] {
                    self.push_styled(row, styles::value());
                }
                self.push_blank();
            }
            Command::Clear => {
                self.history.clear();
                self.current = None;
                self.scroll = 0;
                self.dirty = true;
            }
            Command::Expand(target) => self.apply_panels(target, true),
            Command::Collapse(target) => self.apply_panels(target, false),
            Command::Unknown(s) => {
                self.push_styled(format!("× Unknown command: {s}"), styles::error());
                self.push_styled("Try `/help`.", styles::dim());
                self.push_blank();
            }
        }
        None
    }

    fn apply_panels(&mut self, target: PanelTarget, open: bool) {
        let Some(view) = self.current.as_mut() else {
            self.push_styled("No results to show yet.", styles::dim());
            return;
        };
        let ok = match target {
            PanelTarget::All => {
                view.set_all(open);
                true
            }
            PanelTarget::Selected => match view.selected() {
                Some(idx) => view.set_expanded(idx, open),
                None => false,
            },
            PanelTarget::Index(n) => view.set_expanded(n - 1, open),
        };
        if !ok {
            self.push_styled("× No such result; use Tab or a number.", styles::error());
        }
        self.dirty = true;
    }

    pub fn on_stage(&mut self, stage: Stage) {
        if self.is_busy() {
            self.stage = Some(stage);
            self.dirty = true;
        }
    }

    /// Mark the in-flight run as finished; the presenter call follows.
    pub fn finish_run(&mut self) {
        self.stage = None;
        self.dirty = true;
    }

    pub fn push_error_line(&mut self, msg: impl Into<String>) {
        self.push_styled(format!("× {}", msg.into()), styles::error());
    }
}

impl Presenter for App {
    fn render(&mut self, report: &Report) -> io::Result<()> {
        self.current = Some(ReportView::new(report.clone()));
        self.scroll = 0;
        self.dirty = true;
        Ok(())
    }

    fn render_error(&mut self, error: &(dyn Error + 'static)) -> io::Result<()> {
        self.push_styled(format!("× An error occurred: {error}"), styles::error());
        self.push_styled(ERROR_HINT, styles::error());
        self.push_blank();
        Ok(())
    }
}
