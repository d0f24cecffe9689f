mod application;
pub mod data;
mod runtime_config;

pub(crate) use application::LogFileSnafu;
pub use application::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
