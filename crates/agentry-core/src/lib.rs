//! Agentry Core - recurring background task agents and their repository.
//!
//! The domain model of an agent (its schedule, run bookkeeping, and tags)
//! together with the repository that persists agents through the
//! row-oriented store contract from agentry-storage. The repository keeps a
//! process-wide identity cache so every caller holding an agent with a
//! given id observes the same live instance.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{AgentError, Result};
pub use models::*;
pub use repository::AgentRepository;
