//! Bookshelf application library
//!
//! Wires the book catalogue module onto the shared kernel, database and
//! HTTP crates.

pub mod app;
pub mod modules;

pub use app::{shutdown_signal, App};
