mod app;
mod runtime;

pub use app::{AppConfig, AppConfigError, LogConfig, StorageConfig};
pub(crate) use runtime::layout;
pub use runtime::Config;
