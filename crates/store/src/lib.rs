//! In-memory record store for Oncekey
//!
//! This crate implements [`RecordStore`] over a DashMap-sharded record
//! table with:
//! - Atomic create-if-absent via the entry API (claims never race)
//! - Lazy TTL expiry on read plus an explicit purge sweep
//! - Claim takeover for executors that crashed without completing
//! - Push-based completion notification via parking_lot condvars
//!
//! [`RecordStore`]: oncekey_core::RecordStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
mod notify;

pub use memory::MemoryStore;
