// viewer.rs - Hand a generated file to the platform's default viewer

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

pub fn display(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("nothing to display at {:?}, generate a mesh first", path);
    }

    let mut cmd = viewer_command(path);
    tracing::info!("Opening {:?}", path);
    let status = cmd
        .status()
        .with_context(|| format!("Failed to launch viewer for {:?}", path))?;

    if !status.success() {
        bail!("viewer exited with {}", status);
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn viewer_command(path: &Path) -> Command {
    // Empty title argument, otherwise `start` treats a quoted path as the title
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
