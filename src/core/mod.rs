//! # Core Domain
//!
//! Peek's domain types. Nothing here touches the terminal or a data source.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Action (transitions) │
//!                    │  • DecoratedLine        │
//!                    │  • highlight (spans)    │
//!                    │  • Scrollback           │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │ controller │      │   source   │      │    TUI     │
//!     │  (state    │      │ (demo and  │      │  Adapter   │
//!     │  machine)  │      │   files)   │      │ (ratatui)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`action`]: `Step` and `Action`, the value that picks the next screen
//! - [`line`]: Decorated scrollback lines and highlight spans
//! - [`highlight`]: Filter/search span maintenance
//! - [`scrollback`]: Bounded line buffer
//! - [`cancel`]: Cancellable context for long-running operations
//! - [`config`]: Layered settings

pub mod action;
pub mod cancel;
pub mod config;
pub mod highlight;
pub mod line;
pub mod scrollback;
