//! Configuration loading and schema definitions
//!
//! Process-wide settings are read once at startup and handed to the access
//! layer as plain values.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
