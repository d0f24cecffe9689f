mod log_level;
mod sync_interval;

pub use log_level::LogLevel;
pub use sync_interval::SyncInterval;
