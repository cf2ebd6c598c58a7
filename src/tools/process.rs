use std::io::{Read, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) fn command_available(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Runs `command` to completion, killing it once `timeout` elapses.
///
/// Output pipes are drained on helper threads so a chatty child cannot block on a full pipe.
pub(crate) fn run_with_timeout(
    command: &mut Command,
    timeout: Duration,
    stdin_data: Option<&[u8]>,
) -> Result<Output> {
    let program = command.get_program().to_string_lossy().into_owned();

    let mut child = command
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute {program}"))?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    if let Some(data) = stdin_data {
        if let Some(mut pipe) = child.stdin.take() {
            if let Err(err) = pipe.write_all(data) {
                // Reap the child and its readers before reporting.
                let _ = child.kill();
                let _ = child.wait();
                collect(stdout_reader);
                collect(stderr_reader);
                return Err(err).with_context(|| format!("failed to write stdin of {program}"));
            }
        }
    }

    let status = wait_or_kill(&mut child, timeout)
        .with_context(|| format!("{program} did not complete"))?;

    Ok(Output {
        status,
        stdout: collect(stdout_reader),
        stderr: collect(stderr_reader),
    })
}

fn wait_or_kill(child: &mut Child, timeout: Duration) -> Result<std::process::ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("failed to poll child process")? {
            return Ok(status);
        }

        if started.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            bail!("timed out after {}s", timeout.as_secs());
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
