//! Collaborator implementations for the outcome recorder
//!
//! - `memory`: in-memory status logs and queue tracking, for tests and for
//!   embedding the policy engine where outcomes are consumed in-process

pub mod memory;

pub use memory::{LoggedRecord, MemoryQueue, MemoryStatusLog};
