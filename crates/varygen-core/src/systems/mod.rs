pub mod commands;
pub mod tick;

pub use commands::*;
pub use tick::*;
