//! Application layer: session configuration and the dependency injection
//! container.

pub mod config;
pub mod container;

pub use config::SessionConfig;
pub use container::{App, AppBuilder};
