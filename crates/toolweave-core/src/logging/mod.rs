//! Logging abstractions for runtime-agnostic logging
//!
//! Components receive an `Arc<dyn Logger>` at construction; nothing logs
//! through global state.

mod traits;
mod console;
mod capture;

pub use traits::{Logger, SharedLogger};
pub use console::{ConsoleLogger, LogLevel};
pub use capture::{CaptureLogger, NoOpLogger};
