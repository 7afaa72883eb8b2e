//! # TUI Adapter
//!
//! The ratatui-specific layer. This is the only module that knows about
//! ratatui and crossterm.
//!
//! ```text
//!  controller task ──TuiDisplay──▶ DisplayCommand ──▶ run() (foreground)
//!        ▲                                              │
//!        └──── dialog responders / peek commands ◀──────┘ keys
//! ```
//!
//! `TuiDisplay` implements `controller::Display` by posting commands on a
//! std channel; it never touches the terminal. `run()` is the single
//! foreground loop that owns all screen state: it drains commands, draws,
//! and turns key presses into dialog answers or peek gestures.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (spinner visible): draws every 100ms for the spinner.
//! - **Idle**: polls input for up to 50ms, redraws only after a command,
//!   an event, or a resize.

mod component;
pub mod components;
mod event;
mod ui;

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::sync::mpsc as async_mpsc;

use crate::controller::display::{
    CloseReason, Display, FormChoice, Indicator, ListChoice, Responder, RetryChoice,
    SpinnerDialog,
};
use crate::core::action::Step;
use crate::core::line::DecoratedLine;
use crate::source::Target;
use crate::tui::component::EventHandler;
use crate::tui::components::spinner::FRAME_INTERVAL;
use crate::tui::components::{InputFormState, MenuState, PeekViewState, RetryState, TargetListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(50);

/// Everything the controller can ask of the screen.
pub enum DisplayCommand {
    Spinner {
        message: String,
        dialog: SpinnerDialog,
    },
    Retry {
        message: String,
        reply: Responder<RetryChoice>,
    },
    List {
        title: String,
        items: Vec<Target>,
        reply: Responder<ListChoice>,
    },
    Form {
        title: String,
        default_value: String,
        reply: Responder<FormChoice>,
    },
    Peek {
        component: String,
        commands: async_mpsc::Sender<Step>,
    },
    Append(DecoratedLine),
    Replace(Vec<DecoratedLine>),
    Indicator(Indicator, bool),
    Fatal(String),
    Stop,
}

/// `Display` handle given to the controller.
#[derive(Clone)]
pub struct TuiDisplay {
    tx: mpsc::Sender<DisplayCommand>,
}

impl TuiDisplay {
    /// A display handle and the receiving end for `run()`.
    pub fn channel() -> (Self, mpsc::Receiver<DisplayCommand>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn post(&self, command: DisplayCommand) {
        // A dropped dialog command drops its responder, which the asker
        // sees as the display closing.
        if self.tx.send(command).is_err() {
            warn!("Display command dropped: UI already closed");
        }
    }
}

impl Display for TuiDisplay {
    fn show_spinner(&self, message: &str, dialog: SpinnerDialog) {
        self.post(DisplayCommand::Spinner {
            message: message.to_string(),
            dialog,
        });
    }

    fn show_retry(&self, message: &str, reply: Responder<RetryChoice>) {
        self.post(DisplayCommand::Retry {
            message: message.to_string(),
            reply,
        });
    }

    fn show_list(&self, title: &str, items: &[Target], reply: Responder<ListChoice>) {
        self.post(DisplayCommand::List {
            title: title.to_string(),
            items: items.to_vec(),
            reply,
        });
    }

    fn show_form(&self, title: &str, default_value: &str, reply: Responder<FormChoice>) {
        self.post(DisplayCommand::Form {
            title: title.to_string(),
            default_value: default_value.to_string(),
            reply,
        });
    }

    fn show_peek(&self, component: &str, commands: async_mpsc::Sender<Step>) {
        self.post(DisplayCommand::Peek {
            component: component.to_string(),
            commands,
        });
    }

    fn append_line(&self, line: DecoratedLine) {
        self.post(DisplayCommand::Append(line));
    }

    fn replace_scrollback(&self, lines: Vec<DecoratedLine>) {
        self.post(DisplayCommand::Replace(lines));
    }

    fn set_indicator(&self, indicator: Indicator, on: bool) {
        self.post(DisplayCommand::Indicator(indicator, on));
    }

    fn show_fatal_error(&self, message: &str) {
        self.post(DisplayCommand::Fatal(message.to_string()));
    }

    fn stop(&self) {
        self.post(DisplayCommand::Stop);
    }
}

/// A spinner that is currently on screen.
pub struct SpinnerModalState {
    pub message: String,
    pub dialog: SpinnerDialog,
    pub shown_at: Instant,
}

/// Focus-exclusive dialog drawn over the peek pane.
pub enum Modal {
    Spinner(SpinnerModalState),
    Retry(RetryState, Responder<RetryChoice>),
    List(TargetListState, Responder<ListChoice>),
    Form(InputFormState, Responder<FormChoice>),
    Fatal(String),
}

/// TUI-specific presentation state
pub struct TuiState {
    pub peek: PeekViewState,
    pub menu: MenuState,
    pub modal: Option<Modal>,
    /// Set once the UI should exit.
    pub done: bool,
}

impl TuiState {
    pub fn new(max_lines: usize) -> Self {
        Self {
            peek: PeekViewState::new(max_lines),
            menu: MenuState::default(),
            modal: None,
            done: false,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.modal, Some(Modal::Spinner(_)))
    }

    /// Peek shortcuts are live only with no dialog open.
    pub fn peek_active(&self) -> bool {
        self.modal.is_none() && self.peek.is_active()
    }

    /// Apply one controller command to the screen state.
    pub fn apply(&mut self, command: DisplayCommand) {
        match command {
            DisplayCommand::Spinner { message, dialog } => {
                debug!("Showing spinner: {message}");
                self.modal = Some(Modal::Spinner(SpinnerModalState {
                    message,
                    dialog,
                    shown_at: Instant::now(),
                }));
            }
            DisplayCommand::Retry { message, reply } => {
                self.modal = Some(Modal::Retry(RetryState::new(message), reply));
            }
            DisplayCommand::List { title, items, reply } => {
                self.modal = Some(Modal::List(TargetListState::new(title, items), reply));
            }
            DisplayCommand::Form {
                title,
                default_value,
                reply,
            } => {
                self.modal = Some(Modal::Form(InputFormState::new(title, default_value), reply));
            }
            DisplayCommand::Peek {
                component,
                commands,
            } => {
                self.modal = None;
                self.peek.show(&component, commands);
            }
            DisplayCommand::Append(line) => self.peek.append(line),
            DisplayCommand::Replace(lines) => self.peek.replace(lines),
            DisplayCommand::Indicator(indicator, on) => self.menu.set(indicator, on),
            DisplayCommand::Fatal(message) => {
                self.modal = Some(Modal::Fatal(message));
            }
            DisplayCommand::Stop => {
                info!("Display stop requested");
                self.done = true;
            }
        }
    }

    /// Close the spinner once its owner signals completion.
    pub fn poll_spinner(&mut self) -> bool {
        let Some(Modal::Spinner(spinner)) = &mut self.modal else {
            return false;
        };
        let closed: Option<CloseReason> = match spinner.dialog.close.try_recv() {
            Ok(reason) => Some(reason),
            Err(async_mpsc::error::TryRecvError::Disconnected) => Some(None),
            Err(async_mpsc::error::TryRecvError::Empty) => None,
        };
        match closed {
            Some(reason) => {
                debug!("Spinner closed: {reason:?}");
                self.modal = None;
                true
            }
            None => false,
        }
    }

    /// Route one input event to whatever has focus.
    pub fn handle_event(&mut self, event: &TuiEvent) {
        let Some(modal) = &mut self.modal else {
            if let Some(step) = self.peek.handle_event(event)
                && !self.peek.send(step)
            {
                warn!("Peek command {step} dropped: no session listening");
            }
            return;
        };

        let answered = match modal {
            Modal::Spinner(spinner) => {
                if matches!(event, TuiEvent::Enter | TuiEvent::Escape | TuiEvent::ForceQuit) {
                    // The coordinator closes the spinner once it has torn down
                    spinner.dialog.cancel.respond(());
                }
                false
            }
            Modal::Retry(state, reply) => state
                .handle_event(event)
                .map(|choice| reply.respond(choice))
                .is_some(),
            Modal::List(state, reply) => state
                .handle_event(event)
                .map(|choice| reply.respond(choice))
                .is_some(),
            Modal::Form(state, reply) => state
                .handle_event(event)
                .map(|choice| reply.respond(choice))
                .is_some(),
            Modal::Fatal(_) => {
                if matches!(
                    event,
                    TuiEvent::Enter | TuiEvent::Escape | TuiEvent::ForceQuit | TuiEvent::Char('q')
                ) {
                    self.done = true;
                }
                false
            }
        };
        if answered {
            self.modal = None;
        }
    }
}

/// Foreground UI loop. Returns once the controller stops the display, the
/// user dismisses a fatal error, or the controller goes away.
pub fn run(commands: mpsc::Receiver<DisplayCommand>, max_lines: usize) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let mut tui = TuiState::new(max_lines);
    let result = event_loop(&mut terminal, &mut tui, &commands);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    tui: &mut TuiState,
    commands: &mpsc::Receiver<DisplayCommand>,
) -> io::Result<()> {
    let mut needs_redraw = true;
    let mut last_frame = Instant::now();

    while !tui.done {
        loop {
            match commands.try_recv() {
                Ok(command) => {
                    tui.apply(command);
                    needs_redraw = true;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Leave a fatal error up until the user has read it
                    if !matches!(tui.modal, Some(Modal::Fatal(_))) {
                        info!("Controller gone, closing UI");
                        tui.done = true;
                    }
                    break;
                }
            }
        }
        if tui.done {
            break;
        }
        needs_redraw |= tui.poll_spinner();

        if tui.is_animating() && last_frame.elapsed() >= FRAME_INTERVAL {
            needs_redraw = true;
        }
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, tui))?;
            last_frame = Instant::now();
            needs_redraw = false;
        }

        let timeout = if tui.is_animating() {
            FRAME_INTERVAL.saturating_sub(last_frame.elapsed()).min(IDLE_POLL)
        } else {
            IDLE_POLL
        };
        let mut next = poll_event_timeout(timeout)?;
        while let Some(event) = next {
            needs_redraw = true;
            if event != TuiEvent::Resize {
                tui.handle_event(&event);
            }
            next = poll_event_immediate()?;
        }
    }
    Ok(())
}
