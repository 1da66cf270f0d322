//! Terminal output and progress reporting helpers.

mod output;
mod progress;

pub use output::{Output, Verbosity};
pub use progress::{format_bytes, ProgressManager};
