//! rpm package manager (SUSE/Red Hat/Fedora)

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use pkgquery_exec::CommandExecutor;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::command::{QueryRunner, parse_name_arch_version, path_arg};
use crate::error::PackageError;
use crate::traits::PackageManagerAdapter;
use crate::types::{PackageManagerKind, PackageRecord};

const RPM: &str = "/usr/bin/rpm";
/// Location on old SUSE / Red Hat releases
const LEGACY_RPM: &str = "/bin/rpm";
const LIST_FORMAT: &str = "%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n";
const NOT_OWNED: &str = "not owned by any package";

static PRIMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^rpm.*").expect("static regex is valid"));

/// rpm adapter
///
/// The binary location is resolved once at construction: `/usr/bin/rpm` if it
/// exists, `/bin/rpm` otherwise. A `/bin/rpm -> /usr/bin/rpm` symlink cannot be
/// relied upon since rpm installed as a secondary manager on Debian-based systems
/// only ships `/usr/bin/rpm`.
pub struct RpmAdapter {
    runner: QueryRunner,
    rpm: &'static str,
}

impl RpmAdapter {
    /// Create a new rpm adapter
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        let rpm = if executor.have_command(RPM) {
            RPM
        } else {
            LEGACY_RPM
        };

        Self {
            runner: QueryRunner::new(executor, timeout),
            rpm,
        }
    }

    /// Resolved rpm binary
    #[must_use]
    pub fn command(&self) -> &str {
        self.rpm
    }

    /// Parse `rpm -qf --queryformat %{NAME}` output
    fn parse_owner(output: &str) -> Option<String> {
        let pkg = output.trim();
        (!pkg.is_empty()).then(|| pkg.to_string())
    }

    /// Parse `rpm -ql` output, dropping notes such as `(contains no files)`
    fn parse_file_list(output: &str) -> Vec<PathBuf> {
        output
            .lines()
            .filter(|line| line.starts_with('/'))
            .map(PathBuf::from)
            .collect()
    }
}

#[async_trait]
impl PackageManagerAdapter for RpmAdapter {
    fn kind(&self) -> PackageManagerKind {
        PackageManagerKind::Rpm
    }

    async fn is_available(&self) -> bool {
        self.runner.executor().have_command(self.rpm)
    }

    async fn is_primary(&self) -> bool {
        self.runner
            .executor()
            .probe(self.rpm, &["-qf", self.rpm], &PRIMARY_PATTERN, self.runner.timeout())
            .await
    }

    #[instrument(skip(self))]
    async fn owning_pkg(&self, path: &Path) -> Result<Option<String>, PackageError> {
        let result = self
            .runner
            .run(
                "rpm",
                self.rpm,
                &["-qf", "--queryformat", "%{NAME}", path_arg(path)?],
            )
            .await?;

        if !result.success() || result.combined_output().contains(NOT_OWNED) {
            return Ok(None);
        }

        Ok(Self::parse_owner(&result.stdout))
    }

    #[instrument(skip(self))]
    async fn installed_pkg(&self) -> Result<Vec<PackageRecord>, PackageError> {
        let result = self
            .runner
            .run("rpm", self.rpm, &["-qa", "--queryformat", LIST_FORMAT])
            .await?;

        if !result.success() {
            warn!(status = result.status, stderr = %result.stderr.trim(), "rpm -qa failed");
            return Ok(Vec::new());
        }

        let packages = parse_name_arch_version("rpm", &result.stdout);
        debug!(count = packages.len(), "rpm installed packages");

        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn file_list(&self, pkg: &str) -> Result<Vec<PathBuf>, PackageError> {
        let result = self.runner.run("rpm", self.rpm, &["-ql", pkg]).await?;

        if !result.success() {
            return Ok(Vec::new());
        }

        Ok(Self::parse_file_list(&result.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedExecutor;

    fn adapter(executor: ScriptedExecutor) -> RpmAdapter {
        RpmAdapter::new(Arc::new(executor), Duration::from_secs(5))
    }

    #[test]
    fn test_binary_resolution() {
        let rpm = adapter(ScriptedExecutor::new().with_binary("/usr/bin/rpm"));
        assert_eq!(rpm.command(), "/usr/bin/rpm");

        let rpm = adapter(ScriptedExecutor::new().with_binary("/bin/rpm"));
        assert_eq!(rpm.command(), "/bin/rpm");

        // never left empty, even if rpm is missing altogether
        let rpm = adapter(ScriptedExecutor::new());
        assert_eq!(rpm.command(), "/bin/rpm");
    }

    #[test]
    fn test_parse_owner() {
        assert_eq!(RpmAdapter::parse_owner("bash"), Some("bash".to_string()));
        assert_eq!(RpmAdapter::parse_owner("  glibc\n"), Some("glibc".to_string()));
        assert_eq!(RpmAdapter::parse_owner("\n"), None);
    }

    #[test]
    fn test_parse_file_list() {
        let output = "/usr/bin/which\n/usr/share/man/man1/which.1.gz\n(contains no files)\n";

        let files = RpmAdapter::parse_file_list(output);

        assert_eq!(
            files,
            vec![
                PathBuf::from("/usr/bin/which"),
                PathBuf::from("/usr/share/man/man1/which.1.gz")
            ]
        );
    }

    #[tokio::test]
    async fn test_detection() {
        let rpm = adapter(
            ScriptedExecutor::new()
                .with_binary("/usr/bin/rpm")
                .with_output("/usr/bin/rpm -qf /usr/bin/rpm", 0, "rpm-4.18.0-1.fc38.x86_64\n"),
        );
        assert!(rpm.is_available().await);
        assert!(rpm.is_primary().await);

        // rpm installed on a Debian system owns nothing itself
        let rpm = adapter(ScriptedExecutor::new().with_binary("/usr/bin/rpm").with_output(
            "/usr/bin/rpm -qf /usr/bin/rpm",
            1,
            "file /usr/bin/rpm is not owned by any package\n",
        ));
        assert!(rpm.is_available().await);
        assert!(!rpm.is_primary().await);
    }

    #[tokio::test]
    async fn test_owning_pkg() {
        let rpm = adapter(
            ScriptedExecutor::new()
                .with_binary("/usr/bin/rpm")
                .with_output("/usr/bin/rpm -qf --queryformat %{NAME} /usr/bin/bash", 0, "bash")
                .with_output(
                    "/usr/bin/rpm -qf --queryformat %{NAME} /tmp/x",
                    1,
                    "file /tmp/x is not owned by any package\n",
                ),
        );

        assert_eq!(
            rpm.owning_pkg(Path::new("/usr/bin/bash")).await.unwrap(),
            Some("bash".to_string())
        );
        assert_eq!(rpm.owning_pkg(Path::new("/tmp/x")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_owning_pkg_timeout() {
        let rpm = adapter(ScriptedExecutor::new().with_error(
            "/bin/rpm -qf --queryformat %{NAME} /usr/bin/bash",
            pkgquery_exec::ExecError::Timeout {
                timeout: Duration::from_secs(5),
            },
        ));

        let result = rpm.owning_pkg(Path::new("/usr/bin/bash")).await;

        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_installed_pkg() {
        let rpm = adapter(ScriptedExecutor::new().with_binary("/usr/bin/rpm").with_output(
            &format!("/usr/bin/rpm -qa --queryformat {LIST_FORMAT}"),
            0,
            "bash x86_64 5.2.15-3.fc38\ngpg-pubkey (none) 5323552a-6112bcdc\n",
        ));

        let packages = rpm.installed_pkg().await.unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0], PackageRecord::new("bash", "5.2.15-3.fc38", "x86_64"));
    }

    #[tokio::test]
    async fn test_file_list_not_installed() {
        let rpm = adapter(ScriptedExecutor::new().with_output(
            "/bin/rpm -ql foo",
            1,
            "package foo is not installed\n",
        ));

        assert!(rpm.file_list("foo").await.unwrap().is_empty());
    }
}
