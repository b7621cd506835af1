//! Command-line interface module.

mod args;
pub mod apply;
pub mod check;
pub mod common;
pub mod watch;

pub use args::{Cli, Commands, FilterArgs};
