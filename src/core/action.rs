//! # Actions
//!
//! Every screen transition in Peek is requested with an `Action`.
//! The state machine evaluates the current action's `Step`, runs the
//! matching handler, and receives the next action back.
//!
//! ```text
//! Action(Connect) → handler → Action(Select) → handler → Action(Peek) → …
//! ```
//!
//! The context fields (`component`, `filter`, `search`, `previous_search`)
//! ride along on every action so the next screen knows what the user was
//! looking at. Handlers ignore the fields that don't apply to them.

use std::fmt;

/// Which screen to show next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    Connect,
    Select,
    Peek,
    Filter,
    Search,
    /// Handled entirely inside the peek loop; never dispatched.
    Pause,
    Quit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Connect => "connect",
            Step::Select => "select",
            Step::Peek => "peek",
            Step::Filter => "filter",
            Step::Search => "search",
            Step::Pause => "pause",
            Step::Quit => "quit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub step: Step,
    /// Target currently being peeked.
    pub component: String,
    /// Active substring filter. Empty = no filtering.
    pub filter: String,
    /// Active highlight term. Empty = none.
    pub search: String,
    /// The search term being replaced, so its stale highlights can be stripped.
    pub previous_search: String,
}

impl Action {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    pub fn peek(component: impl Into<String>) -> Self {
        Self {
            step: Step::Peek,
            component: component.into(),
            ..Default::default()
        }
    }

    pub fn is_quit(&self) -> bool {
        self.step == Step::Quit
    }
}
