//! Main TUI application state and logic

use crate::parser::ast::Program;
use crate::parser::diagnostics::Diagnostic;
use crate::trace::{TraceAction, TraceStep};
use crate::ui::panes::{self, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Output,
    Stack,
    Trace,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> stack -> trace)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Trace,
            FocusedPane::Trace => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The source text that was parsed
    pub source_code: String,

    /// Recorded parse steps
    pub steps: Vec<TraceStep>,

    /// The parse result shown in the output pane
    pub outcome: Result<Program, Vec<Diagnostic>>,

    /// Index of the step being shown
    pub position: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub stack_scroll: usize,
    pub trace_scroll: usize,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(
        source_code: String,
        steps: Vec<TraceStep>,
        outcome: Result<Program, Vec<Diagnostic>>,
    ) -> Self {
        let now = Instant::now();
        App {
            source_code,
            steps,
            outcome,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            stack_scroll: 0,
            trace_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: now,
            last_space_press: now.checked_sub(Duration::from_secs(1)).unwrap_or(now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(400) {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps running
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn current_step(&self) -> Option<&TraceStep> {
        self.steps.get(self.position)
    }

    /// Whether the shown step is the halt of a rejected parse
    pub fn is_at_halt(&self) -> bool {
        matches!(
            self.current_step().map(|s| &s.action),
            Some(TraceAction::Halt { .. })
        )
    }

    /// Advance one step; false at the last step
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 < self.steps.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step; false at the first step
    pub fn step_backward(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.steps.len().saturating_sub(1);
    }

    pub fn jump_to_start(&mut self) {
        self.position = 0;
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Stack (top) | Trace (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(columns[1]);

        let (current_line, stack) = match self.current_step() {
            Some(step) => (step.location.line, step.stack.clone()),
            None => (0, Vec::new()),
        };
        let is_error = self.is_at_halt();

        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            current_line,
            is_error,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_output_pane(
            frame,
            left_rows[1],
            &self.outcome,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_stack_pane(
            frame,
            right_rows[0],
            &stack,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        panes::render_trace_pane(
            frame,
            right_rows[1],
            &self.steps,
            self.position,
            self.focused_pane == FocusedPane::Trace,
            &mut self.trace_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                current_step: self.position,
                total_steps: self.steps.len(),
                accepted: self.outcome.is_ok(),
                is_playing: self.is_playing,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if !self.step_forward() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last step".to_string()
                };
            }
            KeyCode::Up => self.scroll(-1),
            KeyCode::Down => self.scroll(1),
            KeyCode::Char(' ') => {
                // Toggle auto-play (debounced against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    self.status_message = if self.is_playing {
                        "Playing...".to_string()
                    } else {
                        "Paused".to_string()
                    };
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to_start();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn scroll(&mut self, delta: isize) {
        match self.focused_pane {
            FocusedPane::Source => {
                // Scrolling down moves the current line up visually
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add_signed(-delta));
                }
            }
            FocusedPane::Stack => {
                self.stack_scroll = self.stack_scroll.saturating_add_signed(delta);
            }
            FocusedPane::Trace => {
                self.trace_scroll = self.trace_scroll.saturating_add_signed(delta);
            }
            FocusedPane::Output => {
                self.output_scroll = self.output_scroll.saturating_add_signed(delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;
    use crate::parser::parse::Parser;
    use crate::trace::TraceRecorder;
    use crossterm::event::KeyModifiers;

    fn app(source: &str) -> App {
        let grammar = Grammar::standard().unwrap();
        let mut parser = Parser::from_source(grammar, source).with_trace(TraceRecorder::new(1000));
        let outcome = parser.parse();
        let steps = parser
            .take_trace()
            .map(|t| t.steps().to_vec())
            .unwrap_or_default();
        App::new(source.to_string(), steps, outcome)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_stepping_stays_in_bounds() {
        let mut app = app("Start end");
        assert_eq!(app.steps.len(), 6);

        assert!(!app.step_backward());
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.position, 5);
        assert!(!app.step_forward());

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.position, 5);
    }

    #[test]
    fn test_halt_is_last_step_of_rejected_parse() {
        let mut app = app("Start x := ; end");
        assert!(app.outcome.is_err());

        app.jump_to_end();
        assert!(app.is_at_halt());
        app.step_backward();
        assert!(!app.is_at_halt());
    }

    #[test]
    fn test_focus_cycles_and_quit() {
        let mut app = app("Start end");
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.focused_pane, FocusedPane::Source);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
