//! # MenuBar Component
//!
//! Bottom line listing the peek shortcuts:
//!
//! ```text
//!  Q Quit  S Select Component  F Filter  P Pause  / Search
//! ```
//!
//! Entries are dimmed when their key does nothing on the current screen.
//! `Filter`, `Search` and `Pause` turn bright while their indicator is on.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::controller::Indicator;
use crate::tui::component::Component;

/// Indicator states as last reported by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub filter: bool,
    pub search: bool,
    pub pause: bool,
}

impl MenuState {
    pub fn set(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Filter => self.filter = on,
            Indicator::Search => self.search = on,
            Indicator::Pause => self.pause = on,
        }
    }

    pub fn is_on(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Filter => self.filter,
            Indicator::Search => self.search,
            Indicator::Pause => self.pause,
        }
    }
}

const ENTRIES: [(&str, &str, Option<Indicator>); 5] = [
    ("Q", "Quit", None),
    ("S", "Select Component", None),
    ("F", "Filter", Some(Indicator::Filter)),
    ("P", "Pause", Some(Indicator::Pause)),
    ("/", "Search", Some(Indicator::Search)),
];

pub struct MenuBar {
    pub state: MenuState,
    /// Whether peek shortcuts are live (the peek pane has focus).
    pub peek_active: bool,
}

impl MenuBar {
    pub fn new(state: MenuState, peek_active: bool) -> Self {
        Self { state, peek_active }
    }
}

impl Component for MenuBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::with_capacity(ENTRIES.len() * 3);
        for (i, (key, label, indicator)) in ENTRIES.iter().enumerate() {
            // Quit is always reachable
            let enabled = i == 0 || self.peek_active;
            let on = indicator.is_some_and(|ind| self.state.is_on(ind));

            let key_style = if enabled {
                Style::default().fg(Color::Black).bg(Color::Gray)
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            };
            let label_style = match (enabled, on) {
                (_, true) => Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Gray),
                (false, false) => Style::default().fg(Color::DarkGray),
            };

            spans.push(Span::raw(" "));
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(format!(" {label} "), label_style));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
