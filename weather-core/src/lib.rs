//! Core library for the `weather-query` form.
//!
//! This crate defines:
//! - The query model (location, variables, time frame) and its mutations
//! - A state container that notifies subscribers on every change
//! - The CSV / JSON export serializer
//! - Configuration handling for the CLI front end
//!
//! It is used by `weather-query-cli`, but holds no terminal or file-system
//! assumptions apart from [`Config`], so other front ends can reuse it.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod state;

pub use config::Config;
pub use error::QueryError;
pub use export::{EXPORT_METADATA, Export, ExportFormat, ExportMetadata, serialize};
pub use model::{Month, QueryConfig, Season, TimeFrame, TimeFrameMode, TimeFrameValue, Variable};
pub use state::{QueryAction, QueryStore, SubscriptionId};
