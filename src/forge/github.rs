//! GitHub forge implementation backed by the `gh` CLI.
use log::*;
use std::{
    io::{ErrorKind, Write},
    path::PathBuf,
    process::{Command, Output, Stdio},
};

use crate::{
    error::{ReleaseError, Result},
    forge::{
        config::ForgeConfig, request::CreateReleaseRequest, traits::Forge,
    },
};

/// Creates GitHub releases by running `gh release create` inside the
/// repository working directory.
pub struct Github {
    config: ForgeConfig,
    workdir: PathBuf,
}

impl Github {
    pub fn new(config: ForgeConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            workdir: workdir.into(),
        }
    }

    fn gh_cmd(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.current_dir(&self.workdir);
        // never block a CI job on an interactive prompt
        cmd.env("GH_PROMPT_DISABLED", "1");
        cmd
    }

    /// Arguments for `gh` to create the requested release. The notes body is
    /// read from stdin, not passed on the command line.
    pub fn release_args(&self, req: &CreateReleaseRequest) -> Vec<String> {
        let mut args = vec![
            "release".to_string(),
            "create".to_string(),
            req.tag.clone(),
            "--title".to_string(),
            req.title.clone(),
            "--notes-file".to_string(),
            "-".to_string(),
        ];

        if req.latest {
            args.push("--latest".to_string());
        } else {
            args.push("--latest=false".to_string());
        }

        if let Some(repo) = &self.config.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }

        args
    }
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    }
}

impl Forge for Github {
    fn check_available(&self) -> Result<String> {
        let output = self
            .gh_cmd()
            .arg("--version")
            .output()
            .map_err(|err| {
                ReleaseError::HostingUnavailable(format!(
                    "failed to run '{}': {err}",
                    self.config.program
                ))
            })?;

        if !output.status.success() {
            return Err(ReleaseError::HostingUnavailable(format!(
                "'{} --version' failed: {}",
                self.config.program,
                stderr_message(&output)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or_default().trim();

        debug!("release hosting client: {version}");

        Ok(version.to_string())
    }

    fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        if self.config.dry_run {
            warn!(
                "dry_run: would create release '{}' for tag {} (latest: {})",
                req.title, req.tag, req.latest
            );
            debug!("dry_run: release notes:\n{}", req.notes);
            return Ok(());
        }

        info!("creating release: {}", req.title);

        let mut child = self
            .gh_cmd()
            .args(self.release_args(&req))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ReleaseError::hosting_call(&req.tag, err))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(req.notes.as_bytes()) {
                Ok(()) => {}
                // the exit status below decides the outcome
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", self.config.program)
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ReleaseError::hosting_call(&req.tag, err));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| ReleaseError::hosting_call(&req.tag, err))?;

        if !output.status.success() {
            return Err(ReleaseError::hosting_call(
                &req.tag,
                stderr_message(&output),
            ));
        }

        Ok(())
    }
}
