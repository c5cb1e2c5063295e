//! [`DataGrid`](super::DataGrid) implementations.

pub mod memory;

pub use memory::InMemoryGrid;
