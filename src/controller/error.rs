use std::fmt;

use crate::core::action::Step;

/// Errors that end the run loop.
///
/// Transient data-source failures never show up here; they are turned into
/// a retry decision inside the handler that hit them.
#[derive(Debug)]
pub enum PeekError {
    /// Caller bug, e.g. a peek without a component.
    Precondition(String),
    /// The display dropped a dialog without answering it.
    DisplayClosed,
    /// A handler failed; carries the step for the diagnostic.
    Step { step: Step, source: Box<PeekError> },
}

impl PeekError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        PeekError::Precondition(msg.into())
    }

    /// Wrap `self` with the step it escaped from. Already-wrapped errors are
    /// left as they are.
    pub fn at(self, step: Step) -> Self {
        match self {
            PeekError::Step { .. } => self,
            other => PeekError::Step {
                step,
                source: Box::new(other),
            },
        }
    }
}

impl fmt::Display for PeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeekError::Precondition(msg) => write!(f, "bug? {msg}"),
            PeekError::DisplayClosed => write!(f, "display closed before answering"),
            PeekError::Step { step, source } => write!(f, "unable to run {step}: {source}"),
        }
    }
}

impl std::error::Error for PeekError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PeekError::Step { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
