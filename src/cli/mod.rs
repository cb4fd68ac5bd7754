pub mod commands;
pub mod progress;
pub mod render;
pub mod run;
pub mod system;
pub mod validate;

pub use commands::{Cli, Commands};
