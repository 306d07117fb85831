//! dealdesk-core — fund settlement for a dealership sales network.
//!
//! The settlement pipeline (engine.rs) is a pure computation over a
//! consistent snapshot of the ledger; everything stateful lives behind
//! the SQLite store.

pub mod allocator;
pub mod calendar;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod event;
pub mod kpi;
pub mod period;
pub mod pool;
pub mod records;
pub mod settlement;
pub mod snapshot;
pub mod store;
pub mod types;
