//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Capability for running external programs and capturing their output.
///
/// Programs are executed directly, never through a shell, so arguments such as
/// file paths containing blanks are passed through untouched.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` and wait for it to finish
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ExecError>;

    /// Like [`CommandExecutor::run`], failing with [`ExecError::Timeout`] if the
    /// command does not finish in time
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Check whether `program` exists and is executable
    fn have_command(&self, program: &str) -> bool;

    /// Short label for log output
    fn executor_type(&self) -> &'static str;

    /// Run a command and report whether it exited with status 0 within `timeout`
    /// and its stdout matches `success_pattern`. Any failure counts as `false`.
    async fn probe(
        &self,
        program: &str,
        args: &[&str],
        success_pattern: &Regex,
        timeout: Duration,
    ) -> bool {
        match self.run_with_timeout(program, args, timeout).await {
            Ok(result) => result.success() && success_pattern.is_match(&result.stdout),
            Err(ExecError::Timeout { .. }) => {
                tracing::warn!(program, ?timeout, "probe timed out");
                false
            }
            Err(e) => {
                tracing::debug!(program, error = %e, "probe failed to run");
                false
            }
        }
    }
}
