//! # Target List Component
//!
//! Full-screen overlay for picking the component to peek.
//!
//! Items get `1`–`9` shortcuts in order, then `0` for the tenth; `q` is the
//! quit shortcut. `Up`/`Down` + `Enter` work too.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `TargetListState` lives in `TuiState` while the list is open
//! - `TargetList` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use super::centered_rect;
use crate::controller::ListChoice;
use crate::source::Target;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

const SHORTCUTS: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];

/// Shortcut key for the item at `index`, if it has one.
pub fn shortcut(index: usize) -> Option<char> {
    SHORTCUTS.get(index).copied()
}

pub struct TargetListState {
    pub title: String,
    pub items: Vec<Target>,
    pub selected: usize,
    pub list_state: ListState,
}

impl TargetListState {
    pub fn new(title: impl Into<String>, items: Vec<Target>) -> Self {
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            title: title.into(),
            items,
            selected: 0,
            list_state,
        }
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.list_state.select(Some(index));
    }
}

impl EventHandler for TargetListState {
    type Event = ListChoice;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ListChoice> {
        match event {
            TuiEvent::Char('q') | TuiEvent::ForceQuit => Some(ListChoice::Quit),
            TuiEvent::Up => {
                if !self.items.is_empty() {
                    self.select(self.selected.saturating_sub(1));
                }
                None
            }
            TuiEvent::Down => {
                if !self.items.is_empty() {
                    self.select((self.selected + 1).min(self.items.len() - 1));
                }
                None
            }
            TuiEvent::Enter => self
                .items
                .get(self.selected)
                .map(|t| ListChoice::Selected(t.id.clone())),
            TuiEvent::Char(c) => {
                let index = SHORTCUTS.iter().position(|s| s == c)?;
                self.items
                    .get(index)
                    .map(|t| ListChoice::Selected(t.id.clone()))
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the target list overlay.
pub struct TargetList<'a> {
    state: &'a mut TargetListState,
}

impl<'a> TargetList<'a> {
    pub fn new(state: &'a mut TargetListState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 70, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.state.title))
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" 1-9 Select  Enter Open  q Quit ").centered())
            .padding(Padding::horizontal(1));

        if self.state.items.is_empty() {
            let empty = Paragraph::new("No live components.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .enumerate()
            .map(|(i, target)| {
                let key = shortcut(i).map(|c| format!("({c}) ")).unwrap_or_else(|| "    ".to_string());
                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let mut lines = vec![Line::from(vec![
                    Span::styled(key, style.fg(Color::Yellow)),
                    Span::styled(target.id.clone(), style),
                ])];
                if !target.description.is_empty() {
                    lines.push(Line::styled(
                        format!("    {}", target.description),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}
