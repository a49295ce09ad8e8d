//! Process and name-resolution side effects
//!
//! The orchestrator never spawns processes or resolves hosts directly; it goes through
//! a [`Toolchain`] so a run can be driven end-to-end without yarn, npm or Node.js.

use super::check::{check_node, check_yarn};
use anyhow::{Context, Result};
use semver::Version;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// A program invocation with a deterministic argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Everything the orchestrator needs from the host system
#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Whether the yarn binary is available
    fn has_yarn(&self) -> bool;

    /// Version of the Node.js runtime that will run the installed package
    fn runtime_version(&self) -> Option<Version>;

    /// Resolve `host`; `false` when the lookup fails
    async fn lookup_host(&self, host: &str) -> bool;

    /// Run `command` in `cwd` with the terminal's standard streams
    ///
    /// Returns whether the process exited with status 0.
    async fn run(&self, command: &ExternalCommand, cwd: &Path) -> Result<bool>;
}

/// The real host: `yarnpkg`, `node`, the system resolver, child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolchain;

impl Toolchain for SystemToolchain {
    fn has_yarn(&self) -> bool {
        check_yarn().available
    }

    fn runtime_version(&self) -> Option<Version> {
        check_node().semver()
    }

    async fn lookup_host(&self, host: &str) -> bool {
        match tokio::net::lookup_host((host, 443)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(_) => false,
        }
    }

    async fn run(&self, command: &ExternalCommand, cwd: &Path) -> Result<bool> {
        let status = TokioCommand::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to start {}", command.program))?;

        Ok(status.success())
    }
}
