//! Opens a file with the operating system's default application.

use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to launch viewer: {0}")]
    Launch(#[from] std::io::Error),
}

#[cfg(target_os = "windows")]
fn command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Launches the default viewer for `path` without waiting for it to exit.
///
/// # Errors
///
/// * [`OpenError::NotFound`] if `path` does not exist
/// * [`OpenError::Launch`] if the viewer could not be started
pub fn open_path(path: &Path) -> Result<(), OpenError> {
    if !path.exists() {
        return Err(OpenError::NotFound(path.to_path_buf()));
    }

    log::debug!("Opening {}", path.display());
    command(path).spawn()?;

    Ok(())
}
