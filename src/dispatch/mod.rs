//! Activation dispatch.
//!
//! Maps an entry's content type to exactly one action on the external
//! sinks, applies the fallback chain for that action, and absorbs every
//! failure. Callers always get an [`Activation`] back, never an error.
//!
//! | content type          | action                          | fallback                      |
//! |-----------------------|---------------------------------|-------------------------------|
//! | url, url-meeting      | URI handler on first URL        | opener command                |
//! | email                 | URI handler on `mailto:`        | opener command                |
//! | shell-script          | preferred terminal              | generic terminal launcher     |
//! | note-link             | URI handler on raw payload      | none                          |
//! | otp / secret          | lookup command, copy first line | none                          |
//! | encrypted, plain-text | copy payload                    | none                          |

pub mod error;
pub mod sink;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::classify::{email_address, first_url, script_line};
use crate::config::{CommandSpec, DispatchConfig};
use crate::types::{ContentType, Entry};

pub use error::{ActionFailure, SinkError};
pub use sink::{Sinks, SystemSinks};

/// What an activation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Activation {
    /// A URI was handed to the default handler or the opener command.
    Opened { uri: String, via_fallback: bool },
    /// Text was copied; `preview` is what the user was shown.
    Copied { preview: String },
    /// A terminal program was started.
    Spawned { program: String },
    /// The action failed and was reported.
    Failed { reason: String },
    /// The caller cancelled before the action completed.
    Cancelled,
}

type ActionResult = Result<Activation, ActionFailure>;

/// Routes activated entries to external sinks.
#[derive(Clone)]
pub struct Dispatcher {
    sinks: Arc<dyn Sinks>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(sinks: Arc<dyn Sinks>, config: DispatchConfig) -> Self {
        Self { sinks, config }
    }

    /// Perform the single action for `entry`.
    pub async fn activate(&self, entry: &Entry, cancel: &CancellationToken) -> Activation {
        if cancel.is_cancelled() {
            return Activation::Cancelled;
        }

        crate::debug_event!(
            "dispatch",
            "activate",
            "'{}' as {}",
            entry.display_text,
            entry.content_type
        );

        let result = match entry.content_type {
            ContentType::Url(_) => self.open_url(entry, cancel).await,
            ContentType::Email => self.open_email(entry, cancel).await,
            ContentType::ShellScript => self.run_script(entry, cancel).await,
            ContentType::NoteLink => self.open_note(entry, cancel).await,
            ContentType::OtpReference => {
                self.copy_lookup("one-time code", &self.config.otp_command, entry, cancel)
                    .await
            }
            ContentType::SecretReference => {
                self.copy_lookup("secret", &self.config.secret_command, entry, cancel)
                    .await
            }
            ContentType::EncryptedBlock | ContentType::PlainText => {
                self.copy_payload(entry, cancel).await
            }
        };

        match result {
            Ok(activation) => activation,
            Err(failure) => {
                tracing::warn!("[dispatch] {failure}");
                self.report("Action failed", &failure.to_string()).await;
                Activation::Failed {
                    reason: failure.to_string(),
                }
            }
        }
    }

    async fn open_url(&self, entry: &Entry, cancel: &CancellationToken) -> ActionResult {
        let uri = first_url(&entry.payload).unwrap_or(entry.payload.trim());
        self.open_with_fallback("open link", uri, entry, cancel).await
    }

    async fn open_email(&self, entry: &Entry, cancel: &CancellationToken) -> ActionResult {
        let address = email_address(&entry.payload).unwrap_or(entry.payload.trim());
        self.open_with_fallback("send mail", &mailto_uri(address), entry, cancel)
            .await
    }

    /// URI handler first, then the opener command.
    async fn open_with_fallback(
        &self,
        action: &'static str,
        uri: &str,
        entry: &Entry,
        cancel: &CancellationToken,
    ) -> ActionResult {
        let Some(primary) = cancellable(cancel, self.sinks.launch_uri(uri)).await else {
            return Ok(Activation::Cancelled);
        };
        match primary {
            Ok(()) => {
                return Ok(Activation::Opened {
                    uri: uri.to_string(),
                    via_fallback: false,
                });
            }
            Err(e) => {
                tracing::info!("[dispatch] URI handler failed, trying {}: {e}", self.config.opener.program);
            }
        }

        let Some(fallback) = cancellable(cancel, self.sinks.run_opener(&self.config.opener, uri)).await
        else {
            return Ok(Activation::Cancelled);
        };
        fallback
            .map(|()| Activation::Opened {
                uri: uri.to_string(),
                via_fallback: true,
            })
            .map_err(|source| failure(action, entry, source))
    }

    async fn open_note(&self, entry: &Entry, cancel: &CancellationToken) -> ActionResult {
        let uri = entry.payload.trim();
        let Some(result) = cancellable(cancel, self.sinks.launch_uri(uri)).await else {
            return Ok(Activation::Cancelled);
        };
        result
            .map(|()| Activation::Opened {
                uri: uri.to_string(),
                via_fallback: false,
            })
            .map_err(|source| failure("open note", entry, source))
    }

    /// Preferred terminal when installed, else the generic launcher.
    async fn run_script(&self, entry: &Entry, cancel: &CancellationToken) -> ActionResult {
        let line = script_line(&entry.payload).unwrap_or(entry.payload.trim());
        let script = script_command(line);

        let terminal = if self.sinks.is_installed(&self.config.preferred_terminal.program) {
            &self.config.preferred_terminal
        } else {
            &self.config.fallback_terminal
        };

        let Some(result) = cancellable(cancel, self.sinks.spawn_terminal(terminal, &script)).await
        else {
            return Ok(Activation::Cancelled);
        };
        result
            .map(|()| Activation::Spawned {
                program: terminal.program.clone(),
            })
            .map_err(|source| failure("run script", entry, source))
    }

    /// Run a lookup command named after the entry and copy its first line.
    async fn copy_lookup(
        &self,
        what: &str,
        command: &CommandSpec,
        entry: &Entry,
        cancel: &CancellationToken,
    ) -> ActionResult {
        let Some(result) = cancellable(
            cancel,
            self.sinks.read_first_line(command, &entry.display_text),
        )
        .await
        else {
            return Ok(Activation::Cancelled);
        };
        let value = result.map_err(|source| failure("fetch", entry, source))?;

        // The fetch may finish after the user has moved on
        if cancel.is_cancelled() {
            return Ok(Activation::Cancelled);
        }
        self.sinks
            .write_clipboard(&value)
            .await
            .map_err(|source| failure("copy", entry, source))?;

        let preview = format!("{what} for {}", entry.display_text);
        self.report("Copied", &preview).await;
        Ok(Activation::Copied { preview })
    }

    async fn copy_payload(&self, entry: &Entry, cancel: &CancellationToken) -> ActionResult {
        if cancel.is_cancelled() {
            return Ok(Activation::Cancelled);
        }
        self.sinks
            .write_clipboard(&entry.payload)
            .await
            .map_err(|source| failure("copy", entry, source))?;

        let preview = preview(&entry.payload, self.config.preview_chars);
        self.report(&entry.display_text, &preview).await;
        Ok(Activation::Copied { preview })
    }

    async fn report(&self, summary: &str, body: &str) {
        if self.config.notify {
            self.sinks.notify(summary, body).await;
        }
    }
}

fn failure(action: &'static str, entry: &Entry, source: SinkError) -> ActionFailure {
    ActionFailure {
        action,
        label: entry.display_text.clone(),
        source,
    }
}

/// Await `fut` unless `cancel` fires first.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

/// `mailto:` URI for an address, keeping an existing prefix.
pub fn mailto_uri(address: &str) -> String {
    if address.starts_with("mailto:") {
        address.to_string()
    } else {
        format!("mailto:{address}")
    }
}

/// Single-line preview of at most `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

/// Shell command line for a script reference.
///
/// A leading `~/` is expanded; a line that names an existing file is
/// quoted as one word, anything else is passed through as a command line.
pub fn script_command(line: &str) -> String {
    let expanded = match (line.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => line.to_string(),
    };

    if Path::new(&expanded).is_file() {
        shell_quote(&expanded)
    } else {
        expanded
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
