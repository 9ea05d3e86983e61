//! Configuration handling

mod config;

pub use config::{timeout_from_secs, Config, CONFIG_DIR_ENV, CONFIG_FILE_NAME};
