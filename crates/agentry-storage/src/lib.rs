//! Agentry Storage - Low-level storage boundary for agent rows
//!
//! This crate defines the row-oriented contract the agent repository talks
//! to: the field schema of the agent table, a filter/order query model, and
//! the [`AgentStore`] trait exposing query/insert/update/delete primitives
//! over raw JSON rows.
//!
//! # Architecture
//!
//! Rows cross this boundary as loosely typed `serde_json` maps; all typed
//! decoding and validation happens one layer up, in agentry-core. The crate
//! also ships [`AgentTable`], an embedded reference adapter backed by redb
//! that stores rows as JSON bytes keyed by their integer id.

pub mod schema;
pub mod store;
pub mod table;

pub use schema::Truth;
pub use store::{AgentStore, Condition, Direction, Filter, Order, RawRow};
pub use table::AgentTable;
