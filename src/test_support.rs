//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::controller::display::{
    CloseReason, Display, FormChoice, Indicator, ListChoice, Responder, RetryChoice,
    SpinnerDialog,
};
use crate::core::action::Step;
use crate::core::cancel::CancelToken;
use crate::core::line::DecoratedLine;
use crate::source::{ConnectionError, Connected, Credentials, DataSource, FetchError, Target};

/// Delay before each scripted peek command is sent.
pub const PEEK_COMMAND_DELAY: Duration = Duration::from_millis(100);

/// Everything the controller asked the display to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Spinner(String),
    Retry(String),
    List(String, Vec<String>),
    Form(String, String),
    Peek(String),
    Append(String),
    Replace(Vec<String>),
    Indicator(Indicator, bool),
    Fatal(String),
    Stop,
}

/// A display that answers dialogs from a script.
///
/// Unscripted dialogs have their responder dropped, which the controller
/// sees as the display closing.
#[derive(Default)]
pub struct ScriptedDisplay {
    calls: Mutex<Vec<DisplayCall>>,
    retries: Mutex<VecDeque<RetryChoice>>,
    lists: Mutex<VecDeque<ListChoice>>,
    forms: Mutex<VecDeque<FormChoice>>,
    peeks: Mutex<VecDeque<Vec<Step>>>,
    cancel_spinners_after: Mutex<Option<Duration>>,
    spinners: Mutex<Vec<SpinnerDialog>>,
    closes: Mutex<Vec<CloseReason>>,
}

impl ScriptedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_retry(&self, choice: RetryChoice) {
        self.retries.lock().unwrap().push_back(choice);
    }

    pub fn script_list(&self, choice: ListChoice) {
        self.lists.lock().unwrap().push_back(choice);
    }

    pub fn script_form(&self, choice: FormChoice) {
        self.forms.lock().unwrap().push_back(choice);
    }

    /// Commands sent, one every `PEEK_COMMAND_DELAY`, the next time the
    /// peek pane is shown.
    pub fn script_peek(&self, commands: &[Step]) {
        self.peeks.lock().unwrap().push_back(commands.to_vec());
    }

    /// Press Cancel on every spinner after `delay`.
    pub fn cancel_spinners_after(&self, delay: Duration) {
        *self.cancel_spinners_after.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Close reasons received so far, one per finished spinner.
    pub fn spinner_closes(&self) -> Vec<CloseReason> {
        let mut closes = self.closes.lock().unwrap();
        for dialog in self.spinners.lock().unwrap().iter_mut() {
            while let Ok(reason) = dialog.close.try_recv() {
                closes.push(reason);
            }
        }
        closes.clone()
    }

    /// Content of every appended line, banners included.
    pub fn appended(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DisplayCall::Append(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DisplayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn answer<T>(script: &Mutex<VecDeque<T>>, reply: Responder<T>) {
    if let Some(choice) = script.lock().unwrap().pop_front() {
        reply.respond(choice);
    }
}

impl Display for ScriptedDisplay {
    fn show_spinner(&self, message: &str, dialog: SpinnerDialog) {
        self.record(DisplayCall::Spinner(message.to_string()));
        if let Some(delay) = *self.cancel_spinners_after.lock().unwrap() {
            let cancel = dialog.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                cancel.respond(());
            });
        }
        self.spinners.lock().unwrap().push(dialog);
    }

    fn show_retry(&self, message: &str, reply: Responder<RetryChoice>) {
        self.record(DisplayCall::Retry(message.to_string()));
        answer(&self.retries, reply);
    }

    fn show_list(&self, title: &str, items: &[Target], reply: Responder<ListChoice>) {
        let ids = items.iter().map(|t| t.id.clone()).collect();
        self.record(DisplayCall::List(title.to_string(), ids));
        answer(&self.lists, reply);
    }

    fn show_form(&self, title: &str, default_value: &str, reply: Responder<FormChoice>) {
        self.record(DisplayCall::Form(title.to_string(), default_value.to_string()));
        answer(&self.forms, reply);
    }

    fn show_peek(&self, component: &str, commands: mpsc::Sender<Step>) {
        self.record(DisplayCall::Peek(component.to_string()));
        let Some(script) = self.peeks.lock().unwrap().pop_front() else {
            return;
        };
        tokio::spawn(async move {
            for step in script {
                tokio::time::sleep(PEEK_COMMAND_DELAY).await;
                if commands.send(step).await.is_err() {
                    break;
                }
            }
            // Hold the channel open until the session stops listening.
            commands.closed().await;
        });
    }

    fn append_line(&self, line: DecoratedLine) {
        self.record(DisplayCall::Append(line.content));
    }

    fn replace_scrollback(&self, lines: Vec<DecoratedLine>) {
        self.record(DisplayCall::Replace(
            lines.into_iter().map(|l| l.content).collect(),
        ));
    }

    fn set_indicator(&self, indicator: Indicator, on: bool) {
        self.record(DisplayCall::Indicator(indicator, on));
    }

    fn show_fatal_error(&self, message: &str) {
        self.record(DisplayCall::Fatal(message.to_string()));
    }

    fn stop(&self) {
        self.record(DisplayCall::Stop);
    }
}

/// A data source driven by counters and fixed lines.
pub struct ScriptedSource {
    connect_failures: u32,
    fetch_failures: u32,
    connects: AtomicU32,
    fetches: AtomicU32,
    targets: Vec<Target>,
    lines: Vec<String>,
    line_interval: Duration,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            connect_failures: 0,
            fetch_failures: 0,
            connects: AtomicU32::new(0),
            fetches: AtomicU32::new(0),
            targets: vec![Target::new("a", "first"), Target::new("b", "second")],
            lines: Vec::new(),
            line_interval: Duration::from_millis(10),
        }
    }

    pub fn with_connect_failures(mut self, count: u32) -> Self {
        self.connect_failures = count;
        self
    }

    pub fn with_fetch_failures(mut self, count: u32) -> Self {
        self.fetch_failures = count;
        self
    }

    pub fn with_targets(mut self, ids: &[&str]) -> Self {
        self.targets = ids.iter().map(|id| Target::new(*id, "")).collect();
        self
    }

    /// Lines emitted by every stream, in order; the stream then ends.
    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_line_interval(mut self, interval: Duration) -> Self {
        self.line_interval = interval;
        self
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fetch_attempts(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn connect(
        &self,
        _cancel: &CancelToken,
        address: &str,
        _credentials: &Credentials,
        _timeout: Duration,
    ) -> Result<Connected, ConnectionError> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.connect_failures {
            return Err(ConnectionError::Refused(format!("attempt {attempt}")));
        }
        Ok(Connected {
            address: address.to_string(),
        })
    }

    async fn list_targets(&self, _cancel: &CancelToken) -> Result<Vec<Target>, FetchError> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fetch_failures {
            return Err(FetchError::Unavailable(format!("attempt {attempt}")));
        }
        Ok(self.targets.clone())
    }

    fn stream_lines(&self, cancel: CancelToken, _target: &str) -> BoxStream<'static, String> {
        let interval = self.line_interval;
        futures::stream::iter(self.lines.clone())
            .then(move |line| async move {
                tokio::time::sleep(interval).await;
                line
            })
            .take_until(async move { cancel.cancelled().await })
            .boxed()
    }
}
