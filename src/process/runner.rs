//! Process execution.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use anyhow::anyhow;

use crate::build_log::LogHandle;
use crate::error::{BuildError, Result};

use super::command::{Invocation, ProcessResult};

/// Launches external programs on behalf of the pipeline.
///
/// This trait allows mocking process execution in tests.
pub trait ProcessRunner {
    /// Run one invocation to completion, routing all of its output into `log`.
    ///
    /// Returns `Ok` for any process that actually started, whatever its exit
    /// status. Errors mean the program could not be launched or its output
    /// could not be recorded.
    fn run(&mut self, invocation: &Invocation, log: &mut LogHandle) -> Result<ProcessResult>;

    /// Also copy process output to the terminal as it arrives.
    fn set_echo(&mut self, _echo: bool) {}
}

/// Runs invocations as real child processes.
#[derive(Debug, Default)]
pub struct SystemRunner {
    echo: bool,
}

impl SystemRunner {
    /// Create a runner that only writes process output to the log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessRunner for SystemRunner {
    fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    fn run(&mut self, invocation: &Invocation, log: &mut LogHandle) -> Result<ProcessResult> {
        if !invocation.cwd.is_dir() {
            return Err(BuildError::filesystem(
                &invocation.cwd,
                io::Error::new(io::ErrorKind::NotFound, "working directory does not exist"),
            ));
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        tracing::debug!(
            "Spawning {} in {}",
            invocation.command_line(),
            invocation.cwd.display()
        );

        let mut child = cmd
            .spawn()
            .map_err(|source| BuildError::ExternalToolUnavailable {
                command: invocation.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout of {} was not captured", invocation.program))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr of {} was not captured", invocation.program))?;

        let (tx, rx) = mpsc::channel();
        let readers = [spawn_reader(stdout, tx.clone()), spawn_reader(stderr, tx)];

        // Keep draining after a failed write so the child never blocks on a full pipe.
        let mut write_error = None;
        for chunk in rx {
            if write_error.is_none() {
                if let Err(e) = log.write_chunk(&chunk) {
                    write_error = Some(e);
                }
            }
            if self.echo {
                let mut out = io::stdout().lock();
                let _ = out.write_all(&chunk);
                let _ = out.flush();
            }
        }

        for reader in readers {
            reader
                .join()
                .map_err(|_| anyhow!("output reader for {} panicked", invocation.program))?;
        }

        let status = child.wait()?;
        if let Some(e) = write_error {
            return Err(e);
        }

        let result = ProcessResult::from(status);
        tracing::debug!("{} finished: {:?}", invocation.program, result);
        Ok(result)
    }
}

fn spawn_reader<R>(mut reader: R, tx: Sender<Vec<u8>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    })
}
