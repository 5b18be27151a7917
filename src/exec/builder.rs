// src/exec/builder.rs

//! Invokes the build toolchain: `<toolchain> build -o <output> <program>`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::RunConfiguration;
use crate::errors::{HotdlvError, Result};
use crate::exec::backend::BuildStep;
use crate::exec::retention::cleanup_old_binaries;
use crate::exec::streams::{LineSource, forward_lines};
use crate::fs::FileSystem;
use crate::output::OutputChannel;
use crate::types::BoxFuture;

/// Production [`BuildStep`].
pub struct Builder {
    config: Arc<RunConfiguration>,
    fs: Arc<dyn FileSystem>,
    out: OutputChannel,
}

impl Builder {
    pub fn new(config: Arc<RunConfiguration>, fs: Arc<dyn FileSystem>, out: OutputChannel) -> Self {
        Self { config, fs, out }
    }

    /// Build the workspace's entry point into the configured output path.
    ///
    /// Toolchain output is streamed to the output channel while the build
    /// runs. On success, superseded binaries are removed before returning.
    pub async fn run(&self, workspace: &Path) -> Result<PathBuf> {
        let output = self.config.output_path(workspace);
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            toolchain = %self.config.toolchain,
            program = %self.config.program,
            output = %output.display(),
            "starting build"
        );

        let mut cmd = Command::new(&self.config.toolchain);
        cmd.arg("build")
            .arg("-o")
            .arg(&output)
            .arg(&self.config.program)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| HotdlvError::SpawnError {
            program: self.config.toolchain.clone(),
            source,
        })?;

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(forward_lines(stdout, LineSource::BuildStdout, self.out.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(forward_lines(stderr, LineSource::BuildStderr, self.out.clone()));
        }

        let status = child.wait().await?;

        // Flush remaining output before reporting the result.
        for forwarder in forwarders {
            let _ = forwarder.await;
        }

        if !status.success() {
            debug!(code = ?status.code(), "build failed");
            return Err(HotdlvError::BuildFailed {
                code: status.code(),
            });
        }

        self.out.log(format!("Build successful -> {}", output.display()));

        cleanup_old_binaries(
            self.fs.as_ref(),
            &self.config.bin_dir_path(workspace),
            &self.config.binary_prefix,
            &self.out,
        );

        Ok(output)
    }
}

impl BuildStep for Builder {
    fn build<'a>(&'a self, workspace: &'a Path) -> BoxFuture<'a, Result<PathBuf>> {
        Box::pin(self.run(workspace))
    }
}
