//! pkgquery-pkg: Package manager abstraction
//!
//! Provides the `PackageManagerAdapter` trait and implementations for the
//! supported native package managers (dpkg, rpm, pacman).

pub mod dpkg;
pub mod error;
pub mod pacman;
pub mod rpm;
pub mod traits;
pub mod types;

mod command;
#[cfg(test)]
mod mock;

pub use dpkg::DpkgAdapter;
pub use error::PackageError;
pub use pacman::PacmanAdapter;
pub use rpm::RpmAdapter;
pub use traits::PackageManagerAdapter;
pub use types::{PackageManagerKind, PackageRecord};
