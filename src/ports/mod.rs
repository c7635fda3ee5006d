//! Ports - trait boundaries between the learning core and its collaborators
//!
//! Following hexagonal architecture, these traits define what the core
//! expects from the outside world (persistence) and what it offers to it
//! (session observation). Concrete implementations live in `adapters` and
//! `pipeline`.

pub mod observer;
pub mod repository;

pub use observer::SessionObserver;
pub use repository::SnapshotRepository;
