//! pkgquery-core: Package ownership queries
//!
//! Detects the package managers present on the system, dispatches owner lookups
//! across them (native manager first) and caches the answers.

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;

pub use cache::{CacheLookup, QueryCache};
pub use config::ServiceConfig;
pub use error::CoreError;
pub use registry::{ManagerRegistry, ManagerRole, RegisteredManager};
pub use service::{OwnerQuery, PackageQueryService};
