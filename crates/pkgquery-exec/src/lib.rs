//! pkgquery-exec: Command execution abstraction
//!
//! Provides the `CommandExecutor` capability the package manager adapters run their
//! queries through, and a local implementation based on `tokio::process`.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
