//! # Display Collaborator
//!
//! The controller never draws. It asks a `Display` to show a screen and
//! hands it a `Responder` to answer through. Every dialog gets its own
//! capacity-1 channel carrying a single tagged outcome, so answering never
//! blocks, even if the asking side already gave up.
//!
//! ```text
//! controller ──show_retry(msg, responder)──▶ display
//!     ▲                                          │
//!     └──────────── RetryChoice::Retry ◀─────────┘
//! ```

use tokio::sync::mpsc;

use crate::core::action::Step;
use crate::core::line::DecoratedLine;
use crate::source::Target;

/// One-shot answer handle for a dialog. Sending never blocks; a second
/// answer, or an answer after the asker left, is dropped.
#[derive(Debug)]
pub struct Responder<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Responder<T> {
    /// Returns `false` if the answer was not delivered.
    pub fn respond(&self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }
}

/// A fresh dialog channel: the responder goes to the display, the receiver
/// stays with the asker.
pub fn dialog_channel<T>() -> (Responder<T>, mpsc::Receiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (Responder { tx }, rx)
}

/// Why a spinner was closed by its owner. `None` = the operation finished.
pub type CloseReason = Option<String>;

/// Channels handed to the display along with a spinner.
#[derive(Debug)]
pub struct SpinnerDialog {
    /// Fired when the user presses Cancel.
    pub cancel: Responder<()>,
    /// Delivers exactly one close signal from the coordinator.
    pub close: mpsc::Receiver<CloseReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryChoice {
    Retry,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChoice {
    Selected(String),
    /// The quit shortcut was pressed while the list was showing.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormChoice {
    Ok(String),
    Reset,
    Cancel,
}

impl FormChoice {
    /// OK → entered text, Reset → empty, Cancel → the original value.
    pub fn resolve(self, original: &str) -> String {
        match self {
            FormChoice::Ok(text) => text,
            FormChoice::Reset => String::new(),
            FormChoice::Cancel => original.to_string(),
        }
    }
}

/// Menu entries whose on/off state reflects session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Filter,
    Search,
    Pause,
}

/// The rendering surface, as seen by the controller.
///
/// All methods return immediately; outcomes come back through the
/// responders and channels passed in.
pub trait Display: Send + Sync {
    fn show_spinner(&self, message: &str, dialog: SpinnerDialog);
    fn show_retry(&self, message: &str, reply: Responder<RetryChoice>);
    fn show_list(&self, title: &str, items: &[Target], reply: Responder<ListChoice>);
    fn show_form(&self, title: &str, default_value: &str, reply: Responder<FormChoice>);
    /// Show the peek pane for `component`; user gestures arrive on `commands`.
    fn show_peek(&self, component: &str, commands: mpsc::Sender<Step>);
    fn append_line(&self, line: DecoratedLine);
    /// Replace the whole scrollback render in one update.
    fn replace_scrollback(&self, lines: Vec<DecoratedLine>);
    fn set_indicator(&self, indicator: Indicator, on: bool);
    fn show_fatal_error(&self, message: &str);
    /// Tear down the surface.
    fn stop(&self);
}
