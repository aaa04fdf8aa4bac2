//! External sinks: clipboard, URI handler, processes and notifications.
//!
//! [`Sinks`] is the seam between the dispatcher's routing policy and the
//! desktop. [`SystemSinks`] talks to the real system through `tokio::process`,
//! the `open` crate and `which`.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::CommandSpec;

use super::error::SinkError;

/// External operations invoked by the dispatcher.
#[async_trait]
pub trait Sinks: Send + Sync {
    /// Replace the clipboard contents.
    async fn write_clipboard(&self, text: &str) -> Result<(), SinkError>;

    /// Hand a URI to the desktop's default handler.
    async fn launch_uri(&self, uri: &str) -> Result<(), SinkError>;

    /// Run the generic opener command on `target` and wait for it.
    async fn run_opener(&self, command: &CommandSpec, target: &str) -> Result<(), SinkError>;

    fn is_installed(&self, program: &str) -> bool;

    /// Start a terminal running `script`; does not wait for it.
    async fn spawn_terminal(&self, command: &CommandSpec, script: &str) -> Result<(), SinkError>;

    /// Run a lookup command for `name` and return its first output line.
    async fn read_first_line(&self, command: &CommandSpec, name: &str) -> Result<String, SinkError>;

    /// Show a desktop notification. Best effort.
    async fn notify(&self, summary: &str, body: &str);
}

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(not(target_os = "macos"))]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Sinks backed by the running desktop session.
#[derive(Debug, Clone, Default)]
pub struct SystemSinks;

impl SystemSinks {
    pub fn new() -> Self {
        Self
    }

    /// Pipe `text` into a clipboard tool and wait for it to exit.
    ///
    /// `wl-copy` and `xclip` leave a child behind that serves the selection,
    /// so only the exit status is awaited and no output pipe is held open.
    pub(crate) async fn copy_with_command(
        program: &str,
        args: &[&str],
        text: &str,
    ) -> Result<(), SinkError> {
        let spawn_error = |source| SinkError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(spawn_error)?;
            // Dropping stdin signals end of input
        }

        let status = child.wait().await.map_err(spawn_error)?;
        if status.success() {
            Ok(())
        } else {
            Err(SinkError::exit_status(program, status, &[]))
        }
    }
}

#[async_trait]
impl Sinks for SystemSinks {
    async fn write_clipboard(&self, text: &str) -> Result<(), SinkError> {
        for (program, args) in CLIPBOARD_TOOLS {
            match Self::copy_with_command(program, args, text).await {
                Ok(()) => return Ok(()),
                Err(e) => crate::debug_event!("sink", "clipboard tool failed", "{e}"),
            }
        }

        let tried: Vec<&str> = CLIPBOARD_TOOLS.iter().map(|(p, _)| *p).collect();
        Err(SinkError::NoClipboardTool {
            tried: tried.join(", "),
        })
    }

    async fn launch_uri(&self, uri: &str) -> Result<(), SinkError> {
        let target = uri.to_string();
        let result = tokio::task::spawn_blocking(move || open::that(&target))
            .await
            .map_err(|e| SinkError::Launch {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        result.map_err(|e| SinkError::Launch {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }

    async fn run_opener(&self, command: &CommandSpec, target: &str) -> Result<(), SinkError> {
        // xdg-open may hand off to a long-lived browser; wait for the exit
        // status only
        let status = Command::new(&command.program)
            .args(command.render_args("target", target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| SinkError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SinkError::exit_status(&command.program, status, &[]))
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    async fn spawn_terminal(&self, command: &CommandSpec, script: &str) -> Result<(), SinkError> {
        Command::new(&command.program)
            .args(command.render_args("script", script))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| SinkError::Spawn {
                program: command.program.clone(),
                source,
            })
    }

    async fn read_first_line(&self, command: &CommandSpec, name: &str) -> Result<String, SinkError> {
        let output = Command::new(&command.program)
            .args(command.render_args("name", name))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SinkError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SinkError::exit_status(&command.program, output.status, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().next().map(str::trim) {
            Some(line) if !line.is_empty() => Ok(line.to_string()),
            _ => Err(SinkError::EmptyOutput {
                program: command.program.clone(),
            }),
        }
    }

    async fn notify(&self, summary: &str, body: &str) {
        let status = Command::new("notify-send")
            .args(["--app-name=linedex", summary, body])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if !matches!(status, Ok(s) if s.success()) {
            tracing::info!("[notify] {summary}: {body}");
        }
    }
}
