use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::tui::component::Component;
use crate::tui::components::{
    FatalModal, InputForm, MenuBar, PeekView, RetryModal, SpinnerModal, TargetList,
};
use crate::tui::{Modal, TuiState};

/// Peek pane on top, menu bar at the bottom, and the open dialog (if any)
/// drawn over both.
pub fn draw_ui(frame: &mut Frame, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [main_area, menu_area] = Layout::vertical([Min(0), Length(1)]).areas(frame.area());

    PeekView::new(&mut tui.peek).render(frame, main_area);

    let peek_active = tui.peek_active();
    MenuBar::new(tui.menu, peek_active).render(frame, menu_area);

    match &mut tui.modal {
        None => {}
        Some(Modal::Spinner(spinner)) => {
            let frame_index = SpinnerModal::frame_at(spinner.shown_at.elapsed());
            SpinnerModal::new(&spinner.message, frame_index).render(frame, main_area);
        }
        Some(Modal::Retry(state, _)) => RetryModal::new(state).render(frame, main_area),
        Some(Modal::List(state, _)) => TargetList::new(state).render(frame, main_area),
        Some(Modal::Form(state, _)) => InputForm::new(state).render(frame, main_area),
        Some(Modal::Fatal(message)) => FatalModal::new(message).render(frame, main_area),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::display::dialog_channel;
    use crate::core::line::DecoratedLine;
    use crate::source::Target;
    use crate::tui::DisplayCommand;
    use crate::tui::components::testing::render_rows;
    use chrono::Local;
    use tokio::sync::mpsc;

    #[test]
    fn test_draw_empty_ui() {
        let mut tui = TuiState::new(10);
        let rows = render_rows(80, 24, |f| draw_ui(f, &mut tui));
        assert!(rows[0].contains("peek"));
        assert!(rows[23].contains("Q Quit"));
    }

    #[test]
    fn test_draw_peek_with_lines() {
        let mut tui = TuiState::new(10);
        let (tx, _rx) = mpsc::channel(1);
        tui.apply(DisplayCommand::Peek {
            component: "billing".to_string(),
            commands: tx,
        });
        tui.apply(DisplayCommand::Append(DecoratedLine::entry(
            1,
            Local::now(),
            "billing: INFO line 1",
        )));
        let rows = render_rows(80, 24, |f| draw_ui(f, &mut tui)).join("\n");
        assert!(rows.contains("billing: INFO line 1"));
    }

    #[test]
    fn test_draw_list_over_peek() {
        let mut tui = TuiState::new(10);
        let (reply, _outcome) = dialog_channel();
        tui.apply(DisplayCommand::List {
            title: "Select a component".to_string(),
            items: vec![Target::new("inventory", "")],
            reply,
        });
        let rows = render_rows(80, 24, |f| draw_ui(f, &mut tui)).join("\n");
        assert!(rows.contains("(1) inventory"));
    }
}
