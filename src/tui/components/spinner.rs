//! Working dialog: braille spinner, message, and a Cancel button.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::centered_box;
use crate::tui::component::Component;

pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct SpinnerModal<'a> {
    pub message: &'a str,
    /// Monotonic frame counter; wraps over `SPINNER_FRAMES`.
    pub frame: usize,
}

impl<'a> SpinnerModal<'a> {
    pub fn new(message: &'a str, frame: usize) -> Self {
        Self { message, frame }
    }

    /// Frame index for a spinner shown for `elapsed`.
    pub fn frame_at(elapsed: Duration) -> usize {
        (elapsed.as_millis() / FRAME_INTERVAL.as_millis()) as usize
    }
}

impl Component for SpinnerModal<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_box(50, 5, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [text_area, _, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let glyph = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        let text = Line::from(vec![
            Span::styled(glyph.to_string(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::raw(self.message),
        ]);
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), text_area);

        let button = Span::styled(
            " Cancel ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(
            Paragraph::new(Line::from(button)).alignment(Alignment::Center),
            button_area,
        );
    }
}
