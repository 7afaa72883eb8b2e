//! # TUI Components
//!
//! Every screen the controller can ask for has a component here.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `MenuBar`: bottom line with shortcuts and indicator states
//! - `SpinnerModal`: animated "working" dialog with a Cancel button
//! - `FatalModal`: error text and a Quit button
//!
//! ### Stateful Components (Event-Driven)
//!
//! These follow the persistent state + transient wrapper pattern: the
//! `...State` struct lives in `TuiState` and handles events, the wrapper is
//! built each frame with borrowed state and renders it.
//!
//! - `RetryState` / `RetryModal`: Retry or Quit
//! - `TargetListState` / `TargetList`: pick a component, with shortcuts
//! - `InputFormState` / `InputForm`: single field with OK / Reset / Cancel
//! - `PeekViewState` / `PeekView`: the live scrollback
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file, plus centered_rect)
//! ├── menu_bar.rs
//! ├── spinner.rs
//! ├── retry.rs
//! ├── fatal.rs
//! ├── target_list.rs
//! ├── input_form.rs
//! └── peek_view.rs
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

pub mod fatal;
pub mod input_form;
pub mod menu_bar;
pub mod peek_view;
pub mod retry;
pub mod spinner;
pub mod target_list;

pub use fatal::FatalModal;
pub use input_form::{FormFocus, InputForm, InputFormState};
pub use menu_bar::{MenuBar, MenuState};
pub use peek_view::{PeekView, PeekViewState};
pub use retry::{RetryModal, RetryState};
pub use spinner::{SPINNER_FRAMES, SpinnerModal};
pub use target_list::{TargetList, TargetListState};

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// A rect of fixed `height` rows, `percent_x` wide, centered in `outer`.
pub fn centered_box(percent_x: u16, height: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(outer.height)),
        Constraint::Fill(1),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
