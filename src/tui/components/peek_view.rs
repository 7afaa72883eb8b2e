//! # Peek View Component
//!
//! The live scrollback for one component. Sticks to the newest line until
//! the user scrolls up; `End` (or scrolling back down) re-enables following.
//!
//! Only the visible slice is turned into ratatui lines each frame, so the
//! cost of a draw doesn't grow with the scrollback.
//!
//! Highlights are spans over the line content; this is the only place they
//! become styles:
//!
//! | Kind | Style |
//! |---|---|
//! | filter | green on gray |
//! | search | blue on gray |
//! | banner | gray, padded with `░` |

use ratatui::Frame;
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use tokio::sync::mpsc;

use crate::core::action::Step;
use crate::core::highlight::segments;
use crate::core::line::{DecoratedLine, HighlightKind, LineKind};
use crate::core::scrollback::Scrollback;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

pub struct PeekViewState {
    pub component: String,
    pub scrollback: Scrollback,
    /// Where peek gestures go. `None` until the controller shows the pane.
    pub commands: Option<mpsc::Sender<Step>>,
    /// First visible line; `None` = follow the newest line.
    pub top: Option<usize>,
    /// Rows available for lines at the last render.
    pub viewport: usize,
}

impl PeekViewState {
    pub fn new(max_lines: usize) -> Self {
        Self {
            component: String::new(),
            scrollback: Scrollback::new(max_lines),
            commands: None,
            top: None,
            viewport: 1,
        }
    }

    /// Take focus for `component`. A different component starts from an
    /// empty scrollback.
    pub fn show(&mut self, component: &str, commands: mpsc::Sender<Step>) {
        if self.component != component {
            self.component = component.to_string();
            self.scrollback.clear();
            self.top = None;
        }
        self.commands = Some(commands);
    }

    pub fn is_active(&self) -> bool {
        self.commands.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn append(&mut self, line: DecoratedLine) {
        self.scrollback.push(line);
    }

    pub fn replace(&mut self, lines: Vec<DecoratedLine>) {
        self.scrollback.replace(lines);
        if self.scrollback.is_empty() {
            self.top = None;
        }
    }

    /// Forward a gesture to the session. Returns `false` if nobody is
    /// listening.
    pub fn send(&self, step: Step) -> bool {
        match &self.commands {
            Some(tx) => tx.try_send(step).is_ok(),
            None => false,
        }
    }

    fn max_top(&self) -> usize {
        self.scrollback.len().saturating_sub(self.viewport)
    }

    /// First visible line index.
    pub fn current_top(&self) -> usize {
        match self.top {
            None => self.max_top(),
            Some(top) => top.min(self.max_top()),
        }
    }

    fn scroll_to(&mut self, top: usize) {
        self.top = if top >= self.max_top() { None } else { Some(top) };
    }

    pub fn is_following(&self) -> bool {
        self.top.is_none()
    }
}

impl EventHandler for PeekViewState {
    type Event = Step;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Step> {
        let top = self.current_top();
        let page = self.viewport.max(1);
        match event {
            TuiEvent::Char('q') | TuiEvent::ForceQuit => Some(Step::Quit),
            TuiEvent::Char('s') => Some(Step::Select),
            TuiEvent::Char('p') => Some(Step::Pause),
            TuiEvent::Char('f') => Some(Step::Filter),
            TuiEvent::Char('/') => Some(Step::Search),
            TuiEvent::Up => {
                self.scroll_to(top.saturating_sub(1));
                None
            }
            TuiEvent::Down => {
                self.scroll_to(top + 1);
                None
            }
            TuiEvent::PageUp => {
                self.scroll_to(top.saturating_sub(page));
                None
            }
            TuiEvent::PageDown => {
                self.scroll_to(top + page);
                None
            }
            TuiEvent::Home => {
                self.scroll_to(0);
                None
            }
            TuiEvent::End => {
                self.top = None;
                None
            }
            _ => None,
        }
    }
}

fn highlight_style(kind: HighlightKind) -> Style {
    match kind {
        HighlightKind::Filter => Style::default().fg(Color::Green).bg(Color::Gray),
        HighlightKind::Search => Style::default().fg(Color::Blue).bg(Color::Gray),
    }
}

/// Styled form of one scrollback line.
pub fn render_line(line: &DecoratedLine) -> Line<'_> {
    match &line.kind {
        LineKind::Banner => Line::styled(line.plain(), Style::default().fg(Color::Gray)),
        LineKind::Entry { ordinal, timestamp } => {
            let mut spans = vec![
                Span::raw(format!("{ordinal}: ")),
                Span::styled(
                    timestamp.format("%H:%M:%S").to_string(),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
            ];
            spans.extend(segments(line).into_iter().map(|seg| match seg.kind {
                Some(kind) => Span::styled(seg.text, highlight_style(kind)),
                None => Span::raw(seg.text),
            }));
            Line::from(spans)
        }
    }
}

/// Transient render wrapper for the peek pane.
pub struct PeekView<'a> {
    state: &'a mut PeekViewState,
}

impl<'a> PeekView<'a> {
    pub fn new(state: &'a mut PeekViewState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.state.component.is_empty() {
            " peek ".to_string()
        } else {
            format!(" {} ", self.state.component)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.state.viewport = inner.height.max(1) as usize;
        let top = self.state.current_top();
        let lines: Vec<Line> = self
            .state
            .scrollback
            .iter()
            .skip(top)
            .take(self.state.viewport)
            .map(render_line)
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        let total = self.state.scrollback.len();
        if total > self.state.viewport {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(self.state.viewport)).position(top);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }
}
