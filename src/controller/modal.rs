//! # Modal Coordinator
//!
//! One pattern for every blocking dialog: open it, wait for exactly one
//! outcome, and make sure nothing spawned for it outlives it.
//!
//! ## Spinner lifecycle
//!
//! ```text
//!            ┌──────────── supervisor task ────────────┐
//!  display ──┤ cancel (user) ─┐                        │
//!            │                ├─▶ token.cancel() once  │
//!  teardown ─┤ quit ──────────┘                        │
//!            └─────────────────────────────────────────┘
//!                         │
//!  op(token) ◀────────────┘  raced against token.cancelled()
//! ```
//!
//! The teardown guard fires the quit signal and closes the spinner on every
//! exit path, including the coordinator future being dropped mid-wait.

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use super::display::{
    CloseReason, Display, FormChoice, ListChoice, Responder, RetryChoice, SpinnerDialog,
    dialog_channel,
};
use super::error::PeekError;
use crate::core::cancel::CancelToken;
use crate::source::Target;

/// Close reason sent to a spinner the user dismissed.
pub const CANCELLED_BY_USER: &str = "cancelled";

/// Result of an operation run under a spinner.
#[derive(Debug, PartialEq, Eq)]
pub enum SpinOutcome<T> {
    Completed(T),
    /// The user dismissed the spinner. Wins over a result that raced it.
    Cancelled,
}

/// Sends the quit signal and the spinner close reason when dropped.
struct Teardown {
    quit: Option<oneshot::Sender<()>>,
    close: mpsc::Sender<CloseReason>,
    reason: CloseReason,
}

impl Teardown {
    fn new(quit: oneshot::Sender<()>, close: mpsc::Sender<CloseReason>) -> Self {
        Self {
            quit: Some(quit),
            close,
            reason: Some(CANCELLED_BY_USER.to_string()),
        }
    }

    fn finished(mut self) {
        self.reason = None;
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if let Some(quit) = self.quit.take() {
            let _ = quit.send(());
        }
        // Capacity 1 and sent once, so this only fails if the display left.
        let _ = self.close.try_send(self.reason.take());
    }
}

pub struct ModalCoordinator {
    display: Arc<dyn Display>,
}

impl ModalCoordinator {
    pub fn new(display: Arc<dyn Display>) -> Self {
        Self { display }
    }

    /// Run `op` behind a cancellable spinner.
    ///
    /// `op` receives the dialog's cancel token. Whichever finishes first,
    /// the token is cancelled exactly once and the supervisor has exited
    /// before this returns.
    pub async fn spin<T, F, Fut>(&self, message: &str, op: F) -> SpinOutcome<T>
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = T>,
    {
        let token = CancelToken::new();
        let (cancel_responder, mut cancel_rx) = dialog_channel::<()>();
        let (close_tx, close_rx) = mpsc::channel::<CloseReason>(1);
        let (quit_tx, quit_rx) = oneshot::channel::<()>();

        debug!("Opening spinner: {message}");
        self.display.show_spinner(
            message,
            SpinnerDialog {
                cancel: cancel_responder,
                close: close_rx,
            },
        );

        let supervisor = tokio::spawn({
            let token = token.clone();
            async move {
                let user_cancelled = tokio::select! {
                    Some(()) = cancel_rx.recv() => true,
                    _ = quit_rx => false,
                };
                token.cancel();
                user_cancelled
            }
        });
        let teardown = Teardown::new(quit_tx, close_tx);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = op(token.clone()) => Some(result),
        };
        if result.is_some() {
            teardown.finished();
        } else {
            drop(teardown);
        }

        let user_cancelled = match supervisor.await {
            Ok(cancelled) => cancelled,
            Err(e) => {
                warn!("Spinner supervisor failed: {e}");
                result.is_none()
            }
        };

        match result {
            Some(value) if !user_cancelled => SpinOutcome::Completed(value),
            _ => {
                debug!("Spinner dismissed by user: {message}");
                SpinOutcome::Cancelled
            }
        }
    }

    pub async fn ask_retry(&self, message: &str) -> Result<RetryChoice, PeekError> {
        self.dialog(|reply| self.display.show_retry(message, reply))
            .await
    }

    pub async fn ask_list(&self, title: &str, items: &[Target]) -> Result<ListChoice, PeekError> {
        self.dialog(|reply| self.display.show_list(title, items, reply))
            .await
    }

    pub async fn ask_form(&self, title: &str, default_value: &str) -> Result<FormChoice, PeekError> {
        self.dialog(|reply| self.display.show_form(title, default_value, reply))
            .await
    }

    async fn dialog<T>(&self, open: impl FnOnce(Responder<T>)) -> Result<T, PeekError> {
        let (reply, mut outcome) = dialog_channel();
        open(reply);
        outcome.recv().await.ok_or(PeekError::DisplayClosed)
    }
}
