//! # Retry Modal
//!
//! Shows a failure and asks whether to try again. `Left`/`Right`/`Tab`
//! move between the buttons, `Enter` activates; `r` and `q` are shortcuts.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_box;
use crate::controller::RetryChoice;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

const BUTTONS: [RetryChoice; 2] = [RetryChoice::Retry, RetryChoice::Quit];

pub struct RetryState {
    pub message: String,
    pub selected: usize,
}

impl RetryState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            selected: 0,
        }
    }
}

impl EventHandler for RetryState {
    type Event = RetryChoice;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<RetryChoice> {
        match event {
            TuiEvent::Left | TuiEvent::Right | TuiEvent::Tab | TuiEvent::BackTab => {
                self.selected = (self.selected + 1) % BUTTONS.len();
                None
            }
            TuiEvent::Enter => Some(BUTTONS[self.selected]),
            TuiEvent::Char('r') => Some(RetryChoice::Retry),
            TuiEvent::Char('q') | TuiEvent::Escape | TuiEvent::ForceQuit => Some(RetryChoice::Quit),
            _ => None,
        }
    }
}

fn label(choice: RetryChoice) -> &'static str {
    match choice {
        RetryChoice::Retry => " Retry ",
        RetryChoice::Quit => " Quit ",
    }
}

/// Transient render wrapper for the retry modal.
pub struct RetryModal<'a> {
    state: &'a RetryState,
}

impl<'a> RetryModal<'a> {
    pub fn new(state: &'a RetryState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let text_height = self.state.message.lines().count() as u16;
        let overlay = centered_box(60, text_height + 5, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [text_area, button_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        let message = Paragraph::new(self.state.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, text_area);

        let mut buttons = Vec::new();
        for (i, choice) in BUTTONS.iter().enumerate() {
            let style = if i == self.state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if i > 0 {
                buttons.push(Span::raw("   "));
            }
            buttons.push(Span::styled(label(*choice), style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(buttons)).alignment(Alignment::Center),
            button_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::testing::render_rows;

    #[test]
    fn test_enter_activates_selected_button() {
        let mut state = RetryState::new("boom");
        assert_eq!(state.handle_event(&TuiEvent::Enter), Some(RetryChoice::Retry));
        assert_eq!(state.handle_event(&TuiEvent::Right), None);
        assert_eq!(state.handle_event(&TuiEvent::Enter), Some(RetryChoice::Quit));
    }

    #[test]
    fn test_shortcuts() {
        let mut state = RetryState::new("boom");
        assert_eq!(state.handle_event(&TuiEvent::Char('q')), Some(RetryChoice::Quit));
        assert_eq!(state.handle_event(&TuiEvent::Char('r')), Some(RetryChoice::Retry));
        assert_eq!(state.handle_event(&TuiEvent::Char('x')), None);
    }

    #[test]
    fn test_render_embeds_error_text() {
        let state = RetryState::new("ERROR: Unable to connect!\n\nconnection refused: nope");
        let rows = render_rows(80, 20, |f| RetryModal::new(&state).render(f, f.area())).join("\n");
        assert!(rows.contains("ERROR: Unable to connect!"));
        assert!(rows.contains("connection refused: nope"));
        assert!(rows.contains("Retry"));
        assert!(rows.contains("Quit"));
    }
}
