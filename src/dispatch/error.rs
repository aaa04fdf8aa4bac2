//! Error types for external sinks and dispatched actions.

use thiserror::Error;

/// Failure of one external sink call.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited unsuccessfully ({status}){stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} printed nothing")]
    EmptyOutput { program: String },

    #[error("No clipboard tool available (tried {tried})")]
    NoClipboardTool { tried: String },

    #[error("Cannot open {uri}: {reason}")]
    Launch { uri: String, reason: String },
}

impl SinkError {
    pub(crate) fn exit_status(program: &str, status: std::process::ExitStatus, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr);
        let stderr = stderr.lines().next().unwrap_or("").trim();
        SinkError::ExitStatus {
            program: program.to_string(),
            status: status.to_string(),
            stderr: if stderr.is_empty() {
                String::new()
            } else {
                format!(": {stderr}")
            },
        }
    }
}

/// An activation that could not be carried out.
///
/// Never escapes the dispatcher; it is logged, reported to the user and
/// turned into [`super::Activation::Failed`].
#[derive(Error, Debug)]
#[error("{action} failed for '{label}': {source}")]
pub struct ActionFailure {
    pub action: &'static str,
    pub label: String,
    #[source]
    pub source: SinkError,
}
