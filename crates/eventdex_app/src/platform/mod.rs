mod app;
mod config;
pub mod logging;
mod persistence;
mod reporter;
mod watch;

pub(crate) use app::{run, Command};
pub(crate) use config::CONFIG_FILENAME;
