#[macro_use]
pub mod macros;

pub mod ast;
pub mod error;
pub mod utils;

// Re-export commonly used items for convenience
pub use tracing;

pub use error::{Error, Result};
