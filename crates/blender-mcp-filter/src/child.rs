//! Child process supervision
//!
//! Runs the wrapped command with stdout and stderr piped. Two reader tasks
//! drain the pipes concurrently: stdout goes through a [`FrameFilter`], stderr
//! is copied verbatim. stdin is inherited so the client talks to the child
//! directly.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use crate::demux::{FilterLimits, FrameFilter};

/// How the child's output is read and joined
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    /// Read size for both pipes
    pub chunk_size: usize,
    pub limits: FilterLimits,
    /// How long to wait for the reader tasks once the child has exited
    pub join_timeout: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            limits: FilterLimits::default(),
            join_timeout: Duration::from_secs(2),
        }
    }
}

/// Run `command`, forwarding JSON frames to `out` and stderr to `err`
///
/// Returns the child's exit status once it has exited and both readers have
/// finished or timed out.
pub async fn run<O, E>(mut command: Command, settings: RunSettings, out: O, err: E) -> Result<ExitStatus>
where
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to start '{program}'"))?;
    tracing::info!(program = %program, pid = child.id(), "Child process started");

    let stdout = child.stdout.take().context("Child stdout was not captured")?;
    let stderr = child.stderr.take().context("Child stderr was not captured")?;

    let frames = tokio::spawn(pump_frames(stdout, out, settings));
    let diagnostics = tokio::spawn(copy_verbatim(stderr, err, settings.chunk_size));

    let status = child.wait().await.context("Failed to wait for child process")?;
    tracing::info!(%status, "Child process exited");

    let readers = async { (frames.await, diagnostics.await) };
    match tokio::time::timeout(settings.join_timeout, readers).await {
        Ok((frames, diagnostics)) => {
            match frames {
                Ok(Ok(count)) => tracing::debug!(frames = count, "Stdout reader finished"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Stdout reader failed"),
                Err(e) => tracing::warn!(error = %e, "Stdout reader panicked"),
            }
            if let Ok(Err(e)) = diagnostics {
                tracing::warn!(error = %e, "Stderr reader failed");
            }
        }
        Err(_) => tracing::warn!(
            timeout_ms = settings.join_timeout.as_millis() as u64,
            "Output readers still busy after child exit, not waiting"
        ),
    }

    Ok(status)
}

/// Exit code to report for `status`
///
/// A child killed by a signal has no code and is reported as `1`.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Read `input` to its end, writing complete frames to `out`
///
/// Returns the number of frames written.
pub async fn pump_frames<R, W>(mut input: R, mut out: W, settings: RunSettings) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut filter = FrameFilter::new(settings.limits);
    let mut chunk = vec![0u8; settings.chunk_size.max(1)];
    let mut written = 0;

    loop {
        let n = input.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        for frame in filter.feed(&chunk[..n]) {
            out.write_all(frame.as_bytes()).await?;
            out.flush().await?;
            written += 1;
        }
    }

    if let Some(frame) = filter.finish() {
        out.write_all(frame.as_bytes()).await?;
        written += 1;
    }
    out.flush().await?;
    Ok(written)
}

async fn copy_verbatim<R, W>(mut input: R, mut out: W, chunk_size: usize) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let n = input.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        out.write_all(&chunk[..n]).await?;
        out.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pump_frames_over_small_chunks() {
        let input = b"Blender 4.0 (hash abc)\n{\"id\":1}\nWarning: junk\n{\"id\":2}\n".to_vec();
        let settings = RunSettings {
            chunk_size: 3,
            ..RunSettings::default()
        };
        let mut out = Vec::new();
        let count = pump_frames(input.as_slice(), &mut out, settings).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"id\":1}\n{\"id\":2}\n");
    }

    #[tokio::test]
    async fn test_copy_verbatim_keeps_everything() {
        let input = b"Error: not json { at all\n".to_vec();
        let mut out = Vec::new();
        copy_verbatim(input.as_slice(), &mut out, 4).await.unwrap();
        assert_eq!(out, input);
    }
}
