//! Type definitions for package queries

use std::fmt;

use serde::{Deserialize, Serialize};

/// An installed package as reported by a package manager
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name
    pub name: String,
    /// Installed version
    pub version: String,
    /// Package architecture (may be empty if the manager does not report one)
    pub architecture: String,
}

impl PackageRecord {
    /// Create a new package record
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
        }
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.architecture.is_empty() {
            write!(f, "{} {}", self.name, self.version)
        } else {
            write!(f, "{} {} {}", self.name, self.version, self.architecture)
        }
    }
}

/// Package manager type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManagerKind {
    /// dpkg (Debian/Ubuntu)
    Dpkg,
    /// rpm (SUSE/Red Hat/Fedora)
    Rpm,
    /// pacman (Arch/Manjaro)
    Pacman,
}

impl PackageManagerKind {
    /// All supported kinds, in detection order
    pub const ALL: [PackageManagerKind; 3] = [
        PackageManagerKind::Dpkg,
        PackageManagerKind::Rpm,
        PackageManagerKind::Pacman,
    ];

    /// Short lowercase name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PackageManagerKind::Dpkg => "dpkg",
            PackageManagerKind::Rpm => "rpm",
            PackageManagerKind::Pacman => "pacman",
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
