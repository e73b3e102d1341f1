use super::error::PipelineError;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

/// One call of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs to completion. The docking workflow shares one
/// runner across its worker threads.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput>;
}

/// Runs programs as child processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }
        debug!("Running {} {}", invocation.program, invocation.args.join(" "));
        let output = command.output()?;
        trace!("'{}' finished with {}", invocation.program, output.status);
        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs `invocation` and turns a launch failure or nonzero exit into an error.
pub fn run_checked(
    runner: &dyn ToolRunner,
    invocation: &ToolInvocation,
) -> Result<ToolOutput, PipelineError> {
    let output = runner
        .run(invocation)
        .map_err(|source| PipelineError::ToolLaunch {
            program: invocation.program.clone(),
            source,
        })?;
    if output.success {
        return Ok(output);
    }
    Err(PipelineError::ToolFailed {
        program: invocation.program.clone(),
        status: output
            .code
            .map_or_else(|| "signal".to_string(), |c| format!("exit code {}", c)),
        stderr: output.stderr.trim().to_string(),
    })
}
