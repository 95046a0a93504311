use std::time::Duration;

use tokio::process::{Child, Command};

pub fn cmd_program(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd
}

/// SIGTERM, then SIGKILL if the child is still around after `grace`.
#[cfg(target_family = "unix")]
pub async fn kill_graceful(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    let Some(id) = child.id() else {
        return Ok(());
    };
    // SAFETY: signalling a pid we spawned and have not reaped yet.
    unsafe {
        libc::kill(id as libc::pid_t, libc::SIGTERM);
    }
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status.map(|_| ()),
        Err(_) => child.kill().await,
    }
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child, _grace: Duration) -> std::io::Result<()> {
    if child.id().is_none() {
        return Ok(());
    }
    child.kill().await
}
