//! # Controller
//!
//! The `StateMachine` sequences the screens of a peek session. Each handler
//! blocks on its screen's outcome and returns the next `Action`:
//!
//! ```text
//!   Connect ──ok──▶ Select ──pick──▶ Peek ◀──────────┐
//!     ▲  │            ▲  │            │              │
//!     └──┘ retry      └──┘ retry      ├─▶ Filter ────┤
//!                                     ├─▶ Search ────┘
//!                                     └─▶ Select / Quit
//! ```
//!
//! Any step may end in `Quit`. Transient source errors become a retry
//! dialog; everything else ends the loop with a `PeekError`.

pub mod display;
pub mod error;
pub mod modal;
pub mod stream;

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc;

use crate::core::action::{Action, Step};
use crate::core::config::ResolvedConfig;
use crate::source::{ConnectionError, Credentials, DataSource};

pub use display::{Display, FormChoice, Indicator, ListChoice, Responder, RetryChoice};
pub use error::PeekError;
pub use modal::{ModalCoordinator, SpinOutcome};
pub use stream::{PauseGate, StreamSession};

pub const CONNECT_FAILED: &str = "ERROR: Unable to connect!";
pub const FETCH_FAILED: &str = "ERROR: Unable to fetch live components!";
pub const SELECT_TITLE: &str = "Select a component";
pub const FILTER_TITLE: &str = "Filter";
pub const SEARCH_TITLE: &str = "Search";

/// Keystrokes buffered between the peek pane and the session.
const COMMAND_BUFFER: usize = 8;

pub struct StateMachine {
    config: ResolvedConfig,
    source: Arc<dyn DataSource>,
    display: Arc<dyn Display>,
    modal: ModalCoordinator,
    session: Option<StreamSession>,
    announce_filter: bool,
}

impl StateMachine {
    pub fn new(
        config: ResolvedConfig,
        source: Arc<dyn DataSource>,
        display: Arc<dyn Display>,
    ) -> Self {
        Self {
            modal: ModalCoordinator::new(display.clone()),
            config,
            source,
            display,
            session: None,
            announce_filter: false,
        }
    }

    /// The live session, if a component is being peeked.
    pub fn session(&self) -> Option<&StreamSession> {
        self.session.as_ref()
    }

    /// Dispatch actions until one of them is `Quit`, then stop the display.
    pub async fn run(&mut self, initial: Action) -> Result<(), PeekError> {
        let mut action = initial;
        while !action.is_quit() {
            info!("Step: {}", action.step);
            let step = action.step;
            action = self.step(action).await.map_err(|e| e.at(step))?;
        }
        info!("Quitting");
        self.session = None;
        self.display.stop();
        Ok(())
    }

    /// Run a single handler and return the action it produced.
    pub async fn step(&mut self, action: Action) -> Result<Action, PeekError> {
        match action.step {
            Step::Connect => self.connect().await,
            Step::Select => self.select().await,
            Step::Peek => self.peek(action).await,
            Step::Filter => self.filter(action).await,
            Step::Search => self.search(action).await,
            Step::Pause => Err(PeekError::precondition(
                "pause is handled by the peek loop and cannot be dispatched",
            )),
            Step::Quit => Ok(action),
        }
    }

    async fn connect(&mut self) -> Result<Action, PeekError> {
        let source = Arc::clone(&self.source);
        let address = self.config.address.clone();
        let credentials = Credentials {
            auth_token: self.config.auth_token.clone(),
        };
        let timeout = self.config.connect_timeout;

        let message = format!("Connecting to {address}...");
        let outcome = self
            .modal
            .spin(&message, move |cancel| async move {
                let attempt = source.connect(&cancel, &address, &credentials, timeout);
                tokio::time::timeout(timeout, attempt)
                    .await
                    .unwrap_or(Err(ConnectionError::Timeout(timeout)))
            })
            .await;

        match outcome {
            SpinOutcome::Cancelled => Ok(Action::new(Step::Quit)),
            SpinOutcome::Completed(Ok(connected)) => {
                info!("Connected to {}", connected.address);
                Ok(Action::new(Step::Select))
            }
            SpinOutcome::Completed(Err(e)) => self.offer_retry(CONNECT_FAILED, &e, Step::Connect).await,
        }
    }

    async fn select(&mut self) -> Result<Action, PeekError> {
        let source = Arc::clone(&self.source);
        let outcome = self
            .modal
            .spin("Fetching live components...", move |cancel| async move {
                source.list_targets(&cancel).await
            })
            .await;

        let targets = match outcome {
            SpinOutcome::Cancelled => return Ok(Action::new(Step::Quit)),
            SpinOutcome::Completed(Ok(targets)) => targets,
            SpinOutcome::Completed(Err(e)) => {
                return self.offer_retry(FETCH_FAILED, &e, Step::Select).await;
            }
        };

        match self.modal.ask_list(SELECT_TITLE, &targets).await? {
            ListChoice::Selected(component) => Ok(Action::peek(component)),
            ListChoice::Quit => Ok(Action::new(Step::Quit)),
        }
    }

    async fn offer_retry(
        &self,
        headline: &str,
        error: &(dyn std::error::Error + Send + Sync),
        again: Step,
    ) -> Result<Action, PeekError> {
        warn!("{headline} {error}");
        let message = format!("{headline}\n\n{error}");
        match self.modal.ask_retry(&message).await? {
            RetryChoice::Retry => {
                info!("Retrying {again}");
                Ok(Action::new(again))
            }
            RetryChoice::Quit => Ok(Action::new(Step::Quit)),
        }
    }

    async fn peek(&mut self, action: Action) -> Result<Action, PeekError> {
        if action.component.is_empty() {
            return Err(PeekError::precondition("peek requires a component"));
        }

        let session = match self.session.take() {
            Some(session) if session.component() == action.component => session,
            stale => {
                drop(stale);
                self.display.replace_scrollback(Vec::new());
                self.display.set_indicator(Indicator::Pause, false);
                StreamSession::start(
                    self.source.as_ref(),
                    &action.component,
                    self.config.max_output_lines,
                )
            }
        };
        let session = self.session.insert(session);

        self.display
            .set_indicator(Indicator::Filter, !action.filter.is_empty());
        self.display
            .set_indicator(Indicator::Search, !action.search.is_empty());

        let (tx, mut commands) = mpsc::channel(COMMAND_BUFFER);
        self.display.show_peek(&action.component, tx);

        let announce = std::mem::take(&mut self.announce_filter);
        session.apply(&action, announce, self.display.as_ref());
        session.consume(self.display.as_ref(), &mut commands).await
    }

    async fn filter(&mut self, action: Action) -> Result<Action, PeekError> {
        let choice = self.modal.ask_form(FILTER_TITLE, &action.filter).await?;
        let filter = choice.resolve(&action.filter);
        self.display
            .set_indicator(Indicator::Filter, !filter.is_empty());
        self.announce_filter = true;
        Ok(Action {
            step: Step::Peek,
            filter,
            ..action
        })
    }

    async fn search(&mut self, action: Action) -> Result<Action, PeekError> {
        let choice = self.modal.ask_form(SEARCH_TITLE, &action.search).await?;
        let search = choice.resolve(&action.search);
        self.display
            .set_indicator(Indicator::Search, !search.is_empty());
        Ok(Action {
            step: Step::Peek,
            previous_search: action.search.clone(),
            search,
            ..action
        })
    }
}
