//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use linedex::config::{CommandSpec, Settings};
use linedex::dispatch::{SinkError, Sinks};

/// Settings rooted at `root` with notifications on.
pub fn settings_for(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.watch.root = root.to_path_buf();
    settings.watch.debounce_ms = 50;
    settings
}

/// One observed sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Clipboard(String),
    LaunchUri(String),
    Opener { program: String, target: String },
    Terminal { program: String, script: String },
    Lookup { program: String, name: String },
}

/// Sinks that record every call and fail on demand.
#[derive(Default)]
pub struct RecordingSinks {
    pub calls: Mutex<Vec<Call>>,
    pub notifications: Mutex<Vec<(String, String)>>,
    pub installed: Vec<String>,
    pub lookup_output: String,
    pub lookup_delay: Option<Duration>,
    pub fail_clipboard: bool,
    pub fail_launch: bool,
    pub fail_opener: bool,
    pub fail_terminal: bool,
    pub fail_lookup: bool,
}

impl RecordingSinks {
    /// Every sink fails.
    pub fn failing() -> Self {
        Self {
            fail_clipboard: true,
            fail_launch: true,
            fail_opener: true,
            fail_terminal: true,
            fail_lookup: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Clipboard(text) => Some(text),
            _ => None,
        })
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn launch_error(uri: &str) -> SinkError {
    SinkError::Launch {
        uri: uri.to_string(),
        reason: "no handler".to_string(),
    }
}

fn spawn_error(program: &str) -> SinkError {
    SinkError::Spawn {
        program: program.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
    }
}

#[async_trait]
impl Sinks for RecordingSinks {
    async fn write_clipboard(&self, text: &str) -> Result<(), SinkError> {
        if self.fail_clipboard {
            return Err(SinkError::NoClipboardTool {
                tried: "test".to_string(),
            });
        }
        self.record(Call::Clipboard(text.to_string()));
        Ok(())
    }

    async fn launch_uri(&self, uri: &str) -> Result<(), SinkError> {
        self.record(Call::LaunchUri(uri.to_string()));
        if self.fail_launch { Err(launch_error(uri)) } else { Ok(()) }
    }

    async fn run_opener(&self, command: &CommandSpec, target: &str) -> Result<(), SinkError> {
        self.record(Call::Opener {
            program: command.program.clone(),
            target: target.to_string(),
        });
        if self.fail_opener {
            Err(spawn_error(&command.program))
        } else {
            Ok(())
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        self.installed.iter().any(|p| p == program)
    }

    async fn spawn_terminal(&self, command: &CommandSpec, script: &str) -> Result<(), SinkError> {
        self.record(Call::Terminal {
            program: command.program.clone(),
            script: script.to_string(),
        });
        if self.fail_terminal {
            Err(spawn_error(&command.program))
        } else {
            Ok(())
        }
    }

    async fn read_first_line(&self, command: &CommandSpec, name: &str) -> Result<String, SinkError> {
        self.record(Call::Lookup {
            program: command.program.clone(),
            name: name.to_string(),
        });
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lookup {
            return Err(SinkError::EmptyOutput {
                program: command.program.clone(),
            });
        }
        Ok(self.lookup_output.clone())
    }

    async fn notify(&self, summary: &str, body: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((summary.to_string(), body.to_string()));
    }
}

/// Write `content` to `root/name` and return the canonical path.
pub fn write_entry_file(root: &Path, name: &str, content: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, content).unwrap();
    path.canonicalize().unwrap()
}
