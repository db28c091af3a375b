//! Core traits, settings, and module registry shared by the bookshelf crates.

pub mod module;
pub mod registry;
pub mod settings;

pub use bookshelf_db::{Database, Migration};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
