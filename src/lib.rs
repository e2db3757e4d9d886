pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::LocalStorage;

pub use config::{
    AppSettings, OpenAiSettings, PostgresSettings, ServiceSettings, TemperatureSettings,
};
pub use crate::core::{
    apphost::mealplanner_app, engine::HostEngine, graph::AppGraph, plan::ExportFormat,
};
pub use utils::duration::parse_flexible_duration;
pub use utils::error::{HostError, Result};
