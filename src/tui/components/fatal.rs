//! Fatal error dialog. A single Quit button; dismissing it ends the UI.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_box;
use crate::tui::component::Component;

pub struct FatalModal<'a> {
    pub message: &'a str,
}

impl<'a> FatalModal<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Component for FatalModal<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_box(70, 8, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" ERROR ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [text_area, button_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
        frame.render_widget(
            Paragraph::new(self.message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            text_area,
        );
        let button = Span::styled(
            " Quit ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(
            Paragraph::new(Line::from(button)).alignment(Alignment::Center),
            button_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::testing::render_rows;

    #[test]
    fn test_render_message_and_quit() {
        let mut modal = FatalModal::new("unable to run peek: bug?");
        let rows = render_rows(80, 20, |f| modal.render(f, f.area())).join("\n");
        assert!(rows.contains("ERROR"));
        assert!(rows.contains("unable to run peek: bug?"));
        assert!(rows.contains("Quit"));
    }
}
