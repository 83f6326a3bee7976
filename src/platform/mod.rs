use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use wait_timeout::ChildExt;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommandRunOptions {
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

pub fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
    run_command_with_options(cmd, args, timeout, &CommandRunOptions::default())
}

pub fn run_command_with_options(
    cmd: &str,
    args: &[&str],
    timeout: Duration,
    options: &CommandRunOptions,
) -> Result<CommandOutput> {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }
    for (k, v) in &options.env {
        command.env(k, v);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("进程启动失败: {cmd}"))?;

    let status = match child
        .wait_timeout(timeout)
        .with_context(|| format!("进程等待失败: {cmd}"))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("已超时（{timeout:?}）: {cmd}"));
        }
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let _ = err.read_to_string(&mut stderr);
    }

    Ok(CommandOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

/// Lists file paths staged for commit in the repository at `repo`.
/// Returns an empty list when git fails (not a repo, git missing).
pub fn staged_files(repo: &Path, timeout: Duration) -> Vec<PathBuf> {
    let options = CommandRunOptions {
        cwd: Some(repo.to_path_buf()),
        env: Vec::new(),
    };
    let Ok(output) = run_command_with_options(
        "git",
        &["diff", "--cached", "--name-only"],
        timeout,
        &options,
    ) else {
        return Vec::new();
    };
    if output.exit_code != 0 {
        return Vec::new();
    }
    output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| repo.join(l))
        .collect()
}

pub fn effective_home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("环境变量 HOME 未设置"))
}
