//! Core library components.
//!
//! Project discovery, credential preparation and deployment dispatch,
//! independent of the command-line surface.

pub mod changes;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod dispatch;
pub mod environment;
pub mod keys;
pub mod project;
pub mod secrets;
pub mod target;
