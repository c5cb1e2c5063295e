//! Context-scoped versioned storage for the `sessiongrid` service.
//!
//! Provides the trait seams and the service built on top of them:
//!
//! - [`DataGrid`]: the distributed keyed-collection collaborator (get/put
//!   with native TTL, paged key scans)
//! - [`LockService`]: the distributed named-lock collaborator
//! - [`KeyMapping`]: resolves a logical `(context, key)` pair onto a physical
//!   collection and key; per-context and shared-collection variants
//! - [`ContextScanner`]: resumable paged iteration over one context's keys
//! - [`StorageService`]: the public CRUD/versioning/expiration contract,
//!   written once against [`KeyMapping`] so both layouts share identical
//!   concurrency logic
//!
//! [`InMemoryGrid`] and [`InMemoryLockService`] are single-process reference
//! implementations of the collaborator seams, used in tests and single-node
//! deployments.

pub mod error;
pub mod grid;
pub mod grids;
pub mod lock;
pub mod locks;
pub mod mapping;
pub mod scanner;
pub mod service;

pub use error::*;
pub use grid::*;
pub use grids::InMemoryGrid;
pub use lock::*;
pub use locks::InMemoryLockService;
pub use mapping::*;
pub use scanner::*;
pub use service::*;
