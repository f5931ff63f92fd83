//! Scripted executor for adapter tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pkgquery_exec::{CommandExecutor, CommandResult, ExecError};

/// Replays canned results keyed by the full command line (`program arg...`).
/// Unscripted commands fail to spawn.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    commands: HashMap<String, Result<CommandResult, ExecError>>,
    binaries: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_binary(mut self, path: &str) -> Self {
        self.binaries.insert(path.to_string());
        self
    }

    pub(crate) fn with_output(mut self, command: &str, status: i32, stdout: &str) -> Self {
        self.commands
            .insert(command.to_string(), Ok(CommandResult::new(status, stdout)));
        self
    }

    pub(crate) fn with_error(mut self, command: &str, error: ExecError) -> Self {
        self.commands.insert(command.to_string(), Err(error));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ExecError> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().unwrap().push(line.clone());

        self.commands
            .get(&line)
            .cloned()
            .unwrap_or_else(|| Err(ExecError::SpawnError(format!("unscripted: {line}"))))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.run(program, args).await
    }

    fn have_command(&self, program: &str) -> bool {
        self.binaries.contains(program)
    }

    fn executor_type(&self) -> &'static str {
        "scripted"
    }
}
