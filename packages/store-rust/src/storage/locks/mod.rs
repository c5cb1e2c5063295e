//! [`LockService`](super::LockService) implementations.

pub mod memory;

pub use memory::InMemoryLockService;
