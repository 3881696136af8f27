// src/commands/mod.rs
mod commit;
mod config;

pub use commit::cmd_commit;
pub use config::{cmd_config_update, cmd_show_config};

use config::ensure_configured;
