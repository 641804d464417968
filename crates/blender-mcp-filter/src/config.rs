//! Command line configuration for the filter

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use tokio::process::Command;

use crate::child::RunSettings;
use crate::demux::{DEFAULT_MAX_BUFFER, DEFAULT_NOISE_THRESHOLD, FilterLimits};

#[derive(Parser, Debug, Clone)]
#[command(name = "blender-mcp-filter")]
#[command(about = "Run Blender (or any command) and pass only JSON frames through stdout", long_about = None)]
#[command(version)]
pub struct FilterConfig {
    /// Blender executable
    #[arg(long, env = "BLENDER_PATH", default_value = "blender")]
    pub blender: PathBuf,

    /// Python script that runs the MCP server inside Blender
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Start Blender without its UI
    #[arg(short, long)]
    pub background: bool,

    /// Read size for the child's pipes
    #[arg(long, default_value_t = 4096)]
    pub chunk_size: usize,

    /// Drop buffered output with no JSON start once it exceeds this many bytes
    #[arg(long, default_value_t = DEFAULT_NOISE_THRESHOLD)]
    pub noise_threshold: usize,

    /// Hard cap on buffered stdout bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER)]
    pub max_buffer: usize,

    /// How long to wait for output readers after the child exits
    #[arg(long, default_value_t = 2000)]
    pub join_timeout_ms: u64,

    /// Explicit command to run instead of Blender (after `--`)
    #[arg(last = true)]
    pub command: Vec<OsString>,
}

impl FilterConfig {
    pub fn limits(&self) -> FilterLimits {
        FilterLimits {
            noise_threshold: self.noise_threshold,
            max_buffer: self.max_buffer,
        }
    }

    pub fn settings(&self) -> RunSettings {
        RunSettings {
            chunk_size: self.chunk_size,
            limits: self.limits(),
            join_timeout: Duration::from_millis(self.join_timeout_ms),
        }
    }

    /// Build the child command
    ///
    /// An explicit command after `--` wins. Otherwise Blender is started with
    /// `--script`, and a Python error makes it exit non-zero.
    pub fn command(&self) -> Result<Command> {
        if let Some((program, args)) = self.command.split_first() {
            let mut command = Command::new(program);
            command.args(args);
            return Ok(command);
        }

        let Some(script) = &self.script else {
            bail!("Nothing to run: pass --script <file.py> or a command after --");
        };

        let mut command = Command::new(&self.blender);
        if self.background {
            command.arg("--background");
        }
        command
            .arg("--python-exit-code")
            .arg("1")
            .arg("--python")
            .arg(script);
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_blender_command_from_script() {
        let config = FilterConfig::parse_from([
            "blender-mcp-filter",
            "--blender",
            "/opt/blender/blender",
            "--script",
            "server.py",
            "--background",
        ]);
        let cmd = config.command().unwrap();
        assert_eq!(cmd.as_std().get_program(), "/opt/blender/blender");
        assert_eq!(
            args(&cmd),
            ["--background", "--python-exit-code", "1", "--python", "server.py"]
        );
    }

    #[test]
    fn test_explicit_command_wins() {
        let config = FilterConfig::parse_from([
            "blender-mcp-filter",
            "--script",
            "ignored.py",
            "--",
            "python3",
            "-u",
            "server.py",
        ]);
        let cmd = config.command().unwrap();
        assert_eq!(cmd.as_std().get_program(), "python3");
        assert_eq!(args(&cmd), ["-u", "server.py"]);
    }

    #[test]
    fn test_nothing_to_run() {
        let config = FilterConfig::parse_from(["blender-mcp-filter"]);
        assert!(config.command().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfig::parse_from(["blender-mcp-filter", "--script", "s.py"]);
        assert_eq!(config.limits(), FilterLimits::default());
        let settings = config.settings();
        assert_eq!(settings.chunk_size, 4096);
        assert_eq!(settings.join_timeout, Duration::from_secs(2));
    }
}
