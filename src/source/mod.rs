//! # Data Sources
//!
//! The `DataSource` trait is the only way the controller reaches outside the
//! process. Two implementations ship:
//!
//! - [`DemoSource`]: synthetic lines at a fixed pace, for trying the UI
//! - [`FileSource`]: tails the files in a local directory

pub mod provider;
pub mod providers;

use std::sync::Arc;

use crate::core::config::{ResolvedConfig, SourceKind};

pub use provider::{ConnectionError, Connected, Credentials, DataSource, FetchError, Target};
pub use providers::{DemoSource, FileSource};

/// Build the data source selected by the resolved config.
pub fn build_source(config: &ResolvedConfig) -> Arc<dyn DataSource> {
    match config.source {
        SourceKind::Demo => Arc::new(DemoSource::from_config(config)),
        SourceKind::Files => Arc::new(FileSource::from_config(config)),
    }
}
