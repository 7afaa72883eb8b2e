//! # Stream Session
//!
//! One live peek of one component.
//!
//! ```text
//!  DataSource::stream_lines ──▶ producer task ──lines──▶ consume() ──▶ Display
//!                                   ▲                       ▲
//!                              PauseGate ◀── Pause ─── commands (keys)
//! ```
//!
//! The producer runs in the background for as long as the session lives;
//! `consume()` runs in the foreground until the user asks for another
//! screen, then hands back an `Action`. Re-entering peek for the same
//! component reuses the session and its scrollback.

use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::display::{Display, Indicator};
use super::error::PeekError;
use crate::core::action::{Action, Step};
use crate::core::cancel::CancelToken;
use crate::core::highlight::{mark_filter, mark_search, rehighlight};
use crate::core::line::DecoratedLine;
use crate::core::scrollback::Scrollback;
use crate::source::DataSource;

/// Lines fetched but not yet consumed.
const LINE_BUFFER: usize = 64;

/// Synchronized pause flag shared by the consumer (writer) and the
/// producer (waiter). Waiting is a blocking wait on the flag, not a poll.
#[derive(Debug, Clone)]
pub struct PauseGate {
    state: Arc<watch::Sender<bool>>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Flip the flag; returns the new paused state.
    pub fn toggle(&self) -> bool {
        let mut paused = false;
        self.state.send_modify(|p| {
            *p = !*p;
            paused = *p;
        });
        paused
    }

    pub fn is_paused(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves immediately when running, otherwise once resumed.
    pub async fn wait_resumed(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|paused| !*paused).await;
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

async fn produce(
    mut lines: BoxStream<'static, String>,
    gate: PauseGate,
    cancel: CancelToken,
    tx: mpsc::Sender<String>,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = async {
                gate.wait_resumed().await;
                lines.next().await
            } => next,
        };
        let Some(line) = next else {
            debug!("Line stream ended");
            break;
        };
        // A line fetched right before a pause is held, never dropped.
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = gate.wait_resumed() => {}
        }
        if tx.send(line).await.is_err() {
            break;
        }
    }
}

pub struct StreamSession {
    component: String,
    scrollback: Scrollback,
    filter: String,
    search: String,
    previous_search: String,
    /// Search term whose highlights are currently in the scrollback.
    applied_search: String,
    announce_filter: bool,
    next_ordinal: u64,
    gate: PauseGate,
    lines: mpsc::Receiver<String>,
    exhausted: bool,
    cancel: CancelToken,
    producer: JoinHandle<()>,
}

impl StreamSession {
    /// Start streaming `component` in the background.
    pub fn start(source: &dyn DataSource, component: &str, max_lines: usize) -> Self {
        let cancel = CancelToken::new();
        let gate = PauseGate::new();
        let (tx, lines) = mpsc::channel(LINE_BUFFER);
        let stream = source.stream_lines(cancel.clone(), component);
        let producer = tokio::spawn(produce(stream, gate.clone(), cancel.clone(), tx));
        info!("Started {} stream for {component}", source.name());

        Self {
            component: component.to_string(),
            scrollback: Scrollback::new(max_lines),
            filter: String::new(),
            search: String::new(),
            previous_search: String::new(),
            applied_search: String::new(),
            announce_filter: false,
            next_ordinal: 1,
            gate,
            lines,
            exhausted: false,
            cancel,
            producer,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Adopt the context of an incoming peek action.
    ///
    /// Prints the filter banner if `announce_filter` is set, and rescans the
    /// scrollback when a search term is set or being replaced.
    pub fn apply(&mut self, action: &Action, announce_filter: bool, display: &dyn Display) {
        self.filter = action.filter.clone();
        self.search = action.search.clone();
        self.previous_search = if !action.previous_search.is_empty() {
            action.previous_search.clone()
        } else if self.applied_search != self.search {
            self.applied_search.clone()
        } else {
            String::new()
        };
        self.announce_filter |= announce_filter;

        if !self.search.is_empty() || !self.previous_search.is_empty() {
            let changed = rehighlight(
                self.scrollback.iter_mut(),
                &self.search,
                &self.previous_search,
            );
            debug!(
                "Rehighlighted {changed} line(s): search='{}' previous='{}'",
                self.search, self.previous_search
            );
            display.replace_scrollback(self.scrollback.to_vec());
        }
        self.applied_search = self.search.clone();

        if self.announce_filter {
            let text = format!("Filter set to '{}'", self.filter);
            self.push(display, DecoratedLine::status_banner(&text, Local::now()));
            self.announce_filter = false;
        }
    }

    /// Run the foreground loop until a command other than `Pause` arrives.
    ///
    /// The returned action carries this session's context.
    pub async fn consume(
        &mut self,
        display: &dyn Display,
        commands: &mut mpsc::Receiver<Step>,
    ) -> Result<Action, PeekError> {
        loop {
            let accepting = !self.exhausted && !self.gate.is_paused();
            tokio::select! {
                command = commands.recv() => {
                    let Some(step) = command else {
                        return Err(PeekError::DisplayClosed);
                    };
                    if step == Step::Pause {
                        self.toggle_pause(display);
                        continue;
                    }
                    debug!("Peek of {} yielding {step}", self.component);
                    return Ok(self.stamp(step));
                }
                line = self.lines.recv(), if accepting => match line {
                    Some(raw) => self.ingest(display, raw),
                    None => {
                        self.exhausted = true;
                        info!("Stream for {} ended", self.component);
                        self.push(display, DecoratedLine::status_banner("Stream ended", Local::now()));
                    }
                },
            }
        }
    }

    fn toggle_pause(&mut self, display: &dyn Display) {
        let paused = self.gate.toggle();
        display.set_indicator(Indicator::Pause, paused);
        let status = if paused { "PAUSED" } else { "RESUMED" };
        info!("{status} {}", self.component);
        self.push(display, DecoratedLine::status_banner(status, Local::now()));
    }

    fn ingest(&mut self, display: &dyn Display, raw: String) {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        if !raw.contains(self.filter.as_str()) {
            return;
        }
        let mut line = DecoratedLine::entry(ordinal, Local::now(), raw);
        mark_filter(&mut line, &self.filter);
        mark_search(&mut line, &self.search);
        self.push(display, line);
    }

    fn push(&mut self, display: &dyn Display, line: DecoratedLine) {
        self.scrollback.push(line.clone());
        display.append_line(line);
    }

    fn stamp(&self, step: Step) -> Action {
        Action {
            step,
            component: self.component.clone(),
            filter: self.filter.clone(),
            search: self.search.clone(),
            previous_search: self.previous_search.clone(),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.producer.abort();
        debug!("Stopped stream for {}", self.component);
    }
}
