//! # Built-in callbacks
//!
//! Small, self-contained implementations useful for demos and debugging.
//!
//! - [`LogWriter`]: traces every dispatched value (demo/debug).

mod log;

pub use log::LogWriter;
