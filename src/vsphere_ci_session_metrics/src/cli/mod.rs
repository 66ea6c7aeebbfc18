mod commands;
mod process_command;

pub use commands::{Cli, Command, StartArgs};
pub use process_command::{process_command, start};
