//! Page composition
//!
//! Each of the four page variants is the same component set (device
//! registry, capture session, one remote session) with different credential
//! fields. [`spawn`] runs a page on a single task so that user commands and
//! vendor callbacks share one queue.

mod instance;
mod runner;
mod variant;

pub use instance::Page;
pub use runner::{spawn, PageCommand, PageHandle};
pub use variant::PageVariant;
