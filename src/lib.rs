#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod resources;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::App;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::{FileSessionStore, MemorySessionStore};
pub use config::Settings;
pub use core::{ApiClient, DataLayer, QueryCache, QueryKey};
pub use resources::Resources;
pub use utils::error::{AdminError, Result};
