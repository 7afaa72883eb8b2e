//! # Input Form Component
//!
//! One text field and three buttons, used for both Filter and Search.
//!
//! ```text
//! ┌ Filter ─────────────────────────┐
//! │ ERR█                            │
//! │       OK    Reset    Cancel     │
//! └─────────────────────────────────┘
//! ```
//!
//! `Tab` cycles focus field → OK → Reset → Cancel. `Enter` in the field is
//! OK; `Esc` anywhere is Cancel.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::centered_box;
use crate::controller::FormChoice;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field,
    Ok,
    Reset,
    Cancel,
}

impl FormFocus {
    fn next(self) -> Self {
        match self {
            FormFocus::Field => FormFocus::Ok,
            FormFocus::Ok => FormFocus::Reset,
            FormFocus::Reset => FormFocus::Cancel,
            FormFocus::Cancel => FormFocus::Field,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormFocus::Field => FormFocus::Cancel,
            FormFocus::Ok => FormFocus::Field,
            FormFocus::Reset => FormFocus::Ok,
            FormFocus::Cancel => FormFocus::Reset,
        }
    }
}

pub struct InputFormState {
    pub title: String,
    pub text: String,
    pub focus: FormFocus,
}

impl InputFormState {
    /// The field starts out holding `default_value`.
    pub fn new(title: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: default_value.into(),
            focus: FormFocus::Field,
        }
    }

    fn activate(&self) -> FormChoice {
        match self.focus {
            FormFocus::Field | FormFocus::Ok => FormChoice::Ok(self.text.clone()),
            FormFocus::Reset => FormChoice::Reset,
            FormFocus::Cancel => FormChoice::Cancel,
        }
    }
}

impl EventHandler for InputFormState {
    type Event = FormChoice;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<FormChoice> {
        match event {
            TuiEvent::Escape | TuiEvent::ForceQuit => Some(FormChoice::Cancel),
            TuiEvent::Enter => Some(self.activate()),
            TuiEvent::Tab => {
                self.focus = self.focus.next();
                None
            }
            TuiEvent::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            // Arrow keys only move between buttons
            TuiEvent::Right if self.focus != FormFocus::Field => {
                self.focus = self.focus.next();
                None
            }
            TuiEvent::Left if self.focus != FormFocus::Field => {
                self.focus = self.focus.prev();
                None
            }
            TuiEvent::Char(c) if self.focus == FormFocus::Field => {
                self.text.push(*c);
                None
            }
            TuiEvent::Backspace if self.focus == FormFocus::Field => {
                self.text.pop();
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the input form.
pub struct InputForm<'a> {
    state: &'a InputFormState,
}

impl<'a> InputForm<'a> {
    pub fn new(state: &'a InputFormState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_box(50, 6, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.state.title))
            .title_alignment(Alignment::Left);
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [field_area, _, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let field_style = if self.state.focus == FormFocus::Field {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray)
        };
        // Keep the end of the text visible when it is wider than the field
        let width = field_area.width.saturating_sub(1) as usize;
        let text = tail_to_width(&self.state.text, width);
        frame.render_widget(Paragraph::new(text).style(field_style), field_area);
        if self.state.focus == FormFocus::Field {
            let x = field_area.x + text.width() as u16;
            frame.set_cursor_position(Position::new(x, field_area.y));
        }

        let mut buttons = Vec::new();
        for (focus, label) in [
            (FormFocus::Ok, " OK "),
            (FormFocus::Reset, " Reset "),
            (FormFocus::Cancel, " Cancel "),
        ] {
            let style = if self.state.focus == focus {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if !buttons.is_empty() {
                buttons.push(Span::raw("  "));
            }
            buttons.push(Span::styled(label, style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(buttons)).alignment(Alignment::Center),
            button_area,
        );
    }
}

/// Longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> &str {
    let mut start = text.len();
    let mut used = 0;
    for (idx, ch) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::testing::render_rows;

    fn type_text(state: &mut InputFormState, text: &str) {
        for c in text.chars() {
            state.handle_event(&TuiEvent::Char(c));
        }
    }

    #[test]
    fn test_starts_with_default_value() {
        let state = InputFormState::new("Filter", "ERR");
        assert_eq!(state.text, "ERR");
        assert_eq!(state.focus, FormFocus::Field);
    }

    #[test]
    fn test_enter_in_field_is_ok() {
        let mut state = InputFormState::new("Filter", "");
        type_text(&mut state, "WARN");
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(
            state.handle_event(&TuiEvent::Enter),
            Some(FormChoice::Ok("WAR".into()))
        );
    }

    #[test]
    fn test_buttons_by_tab() {
        let mut state = InputFormState::new("Search", "foo");
        state.handle_event(&TuiEvent::Tab);
        state.handle_event(&TuiEvent::Tab);
        assert_eq!(state.focus, FormFocus::Reset);
        assert_eq!(state.handle_event(&TuiEvent::Enter), Some(FormChoice::Reset));

        state.handle_event(&TuiEvent::Right);
        assert_eq!(state.handle_event(&TuiEvent::Enter), Some(FormChoice::Cancel));

        state.handle_event(&TuiEvent::BackTab);
        state.handle_event(&TuiEvent::BackTab);
        assert_eq!(state.focus, FormFocus::Ok);
    }

    #[test]
    fn test_typing_ignored_on_buttons() {
        let mut state = InputFormState::new("Filter", "a");
        state.handle_event(&TuiEvent::Tab);
        type_text(&mut state, "bc");
        assert_eq!(state.text, "a");
    }

    #[test]
    fn test_escape_cancels() {
        let mut state = InputFormState::new("Filter", "a");
        assert_eq!(state.handle_event(&TuiEvent::Escape), Some(FormChoice::Cancel));
    }

    #[test]
    fn test_tail_to_width() {
        assert_eq!(tail_to_width("abcdef", 3), "def");
        assert_eq!(tail_to_width("ab", 3), "ab");
        assert_eq!(tail_to_width("日本語", 4), "本語");
    }

    #[test]
    fn test_render_shows_title_text_and_buttons() {
        let state = InputFormState::new("Filter", "ERR");
        let rows = render_rows(80, 20, |f| InputForm::new(&state).render(f, f.area())).join("\n");
        assert!(rows.contains("Filter"));
        assert!(rows.contains("ERR"));
        assert!(rows.contains("OK"));
        assert!(rows.contains("Reset"));
        assert!(rows.contains("Cancel"));
    }
}
