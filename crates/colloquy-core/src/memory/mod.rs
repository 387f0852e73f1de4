//! Session memory: the ordered record of committed turns.

pub mod store;

pub use store::MemoryStore;
