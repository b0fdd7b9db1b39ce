pub mod columns;
pub mod config;
pub mod date;
pub mod error;
pub mod flatten;
pub mod io;
pub mod model;
pub mod store;
pub mod sync;

pub use error::{Result, ToolError};
