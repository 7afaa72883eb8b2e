//! # Decorated Lines
//!
//! A scrollback line is plain text plus a list of highlight spans. Markup
//! never lives inside the text itself: the TUI translates spans into styles
//! at render time, so rewriting highlights can't corrupt the content.
//!
//! ```text
//! DecoratedLine
//! ├── kind: Entry { ordinal, timestamp } | Banner
//! ├── content: "billing: ERR timeout"
//! └── spans: [Highlight { offset: 9, len: 3, kind: Filter }]
//! ```
//!
//! Only `Entry` lines have the ordinal/timestamp/content shape. Banners
//! (pause, resume, filter changes) are never touched by highlighting.

use chrono::{DateTime, Local};

pub const BANNER_PAD: usize = 16;
pub const BANNER_FILL: char = '░';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Filter,
    Search,
}

/// A highlighted byte range inside a line's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Highlight {
    pub offset: usize,
    pub len: usize,
    pub kind: HighlightKind,
}

impl Highlight {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A streamed line. Ordinal and timestamp are structurally separate from
    /// the content, so filter and search can never match them.
    Entry {
        ordinal: u64,
        timestamp: DateTime<Local>,
    },
    /// Inline status marker (pause/resume, filter changes, stream end).
    Banner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedLine {
    pub kind: LineKind,
    pub content: String,
    pub spans: Vec<Highlight>,
}

impl DecoratedLine {
    pub fn entry(ordinal: u64, timestamp: DateTime<Local>, content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Entry { ordinal, timestamp },
            content: content.into(),
            spans: Vec::new(),
        }
    }

    pub fn banner(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Banner,
            content: text.into(),
            spans: Vec::new(),
        }
    }

    /// Banner of the form `"<status> @ HH:MM:SS"`.
    pub fn status_banner(status: &str, at: DateTime<Local>) -> Self {
        Self::banner(format!("{status} @ {}", at.format("%H:%M:%S")))
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, LineKind::Entry { .. })
    }

    /// Text of the highlight span, if it lies on char boundaries.
    pub fn span_text(&self, span: &Highlight) -> Option<&str> {
        self.content.get(span.offset..span.end())
    }

    /// Plain-text form `"<ordinal>: HH:MM:SS <content>"`, used for logging
    /// and the banner padding shown in the peek view.
    pub fn plain(&self) -> String {
        match &self.kind {
            LineKind::Entry { ordinal, timestamp } => {
                format!("{ordinal}: {} {}", timestamp.format("%H:%M:%S"), self.content)
            }
            LineKind::Banner => {
                let pad = BANNER_FILL.to_string().repeat(BANNER_PAD);
                format!("{pad} {} {pad}", self.content)
            }
        }
    }
}
