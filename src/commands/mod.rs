/*!
Command handlers for the CLI

Each subcommand of `bedtime` maps to one handler in [`stories`]. Handlers
build a [`Library`](crate::library::Library) over the configured store,
run one operation and print the result.
*/

pub mod stories;

pub use stories::{handle_command, resolve_story};
