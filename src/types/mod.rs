//! Core entry types shared by the parser, store, matcher and dispatcher.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier of an entry.
///
/// Derived from the source file and the record ordinal, so reparsing an
/// unchanged file yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Build the id for the `ordinal`-th record of `source`.
    pub fn new(source: &Path, ordinal: usize) -> Self {
        Self(format!("{}:{ordinal}", source.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flavour of a URL payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlKind {
    Generic,
    Meeting,
}

/// Content type assigned to a payload by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    EncryptedBlock,
    OtpReference,
    SecretReference,
    NoteLink,
    Url(UrlKind),
    Email,
    ShellScript,
    PlainText,
}

impl ContentType {
    /// Canonical tag, e.g. `url-meeting` or `shell-script`.
    pub fn tag(&self) -> &'static str {
        match self {
            ContentType::EncryptedBlock => "encrypted-block",
            ContentType::OtpReference => "otp-reference",
            ContentType::SecretReference => "secret-reference",
            ContentType::NoteLink => "note-link",
            ContentType::Url(UrlKind::Generic) => "url",
            ContentType::Url(UrlKind::Meeting) => "url-meeting",
            ContentType::Email => "email",
            ContentType::ShellScript => "shell-script",
            ContentType::PlainText => "plain-text",
        }
    }

    /// Map a category name from a tabular record onto the tag set.
    ///
    /// Accepts canonical tags and a handful of short aliases,
    /// case-insensitively. Returns `None` for unknown names.
    pub fn from_category(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let content_type = match normalized.as_str() {
            "encrypted-block" | "encrypted" | "gpg" | "pgp" => ContentType::EncryptedBlock,
            "otp-reference" | "otp" | "totp" => ContentType::OtpReference,
            "secret-reference" | "secret" | "pass" | "password" => ContentType::SecretReference,
            "note-link" | "note" | "obsidian" => ContentType::NoteLink,
            "url" | "link" | "web" => ContentType::Url(UrlKind::Generic),
            "url-meeting" | "meeting" => ContentType::Url(UrlKind::Meeting),
            "email" | "mail" => ContentType::Email,
            "shell-script" | "script" | "sh" | "shell" => ContentType::ShellScript,
            "plain-text" | "text" | "plain" => ContentType::PlainText,
            _ => return None,
        };
        Some(content_type)
    }

    /// Whether the payload should be hidden when describing the entry.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            ContentType::EncryptedBlock | ContentType::OtpReference | ContentType::SecretReference
        )
    }

    /// Themed icon name used when the record carries no icon hint.
    pub fn icon_name(&self) -> &'static str {
        match self {
            ContentType::EncryptedBlock => "channel-secure-symbolic",
            ContentType::OtpReference | ContentType::SecretReference => "dialog-password",
            ContentType::NoteLink => "accessories-text-editor",
            ContentType::Url(UrlKind::Generic) => "web-browser",
            ContentType::Url(UrlKind::Meeting) => "camera-web",
            ContentType::Email => "mail-send",
            ContentType::ShellScript => "utilities-terminal",
            ContentType::PlainText => "edit-copy",
        }
    }
}

/// Emblem keys a tabular record may carry, with their themed icon names.
/// The first row is the fallback for unrecognised keys.
pub const EMBLEMS: &[(&str, &str)] = &[
    ("NX", "remmina-nx"),
    ("RDP", "remmina-rdp"),
    ("SFTP", "remmina-sftp"),
    ("SPICE", "remmina-spice"),
    ("SSH", "remmina-ssh"),
    ("VNC", "remmina-vnc"),
    ("XDMCP", "remmina-xdmcp"),
];

/// Themed icon name for an emblem key, ignoring case.
pub fn emblem_icon(key: &str) -> &'static str {
    let key = key.trim();
    EMBLEMS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .unwrap_or(&EMBLEMS[0])
        .1
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One indexed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub display_text: String,
    pub payload: String,
    pub source_file: PathBuf,
    pub content_type: ContentType,
    /// Icon key supplied by a tabular record (e.g. `SSH`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_hint: Option<String>,
}

/// Result description handed to the search host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    pub id: EntryId,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_is_path_and_ordinal() {
        let id = EntryId::new(Path::new("/data/links.csv"), 3);
        assert_eq!(id.as_str(), "/data/links.csv:3");
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!(
            ContentType::from_category("Meeting"),
            Some(ContentType::Url(UrlKind::Meeting))
        );
        assert_eq!(ContentType::from_category(" pass "), Some(ContentType::SecretReference));
        assert_eq!(ContentType::from_category("sh"), Some(ContentType::ShellScript));
        assert_eq!(ContentType::from_category("SSH"), None);
    }

    #[test]
    fn test_every_tag_maps_back() {
        let all = [
            ContentType::EncryptedBlock,
            ContentType::OtpReference,
            ContentType::SecretReference,
            ContentType::NoteLink,
            ContentType::Url(UrlKind::Generic),
            ContentType::Url(UrlKind::Meeting),
            ContentType::Email,
            ContentType::ShellScript,
            ContentType::PlainText,
        ];
        for content_type in all {
            assert_eq!(ContentType::from_category(content_type.tag()), Some(content_type));
        }
    }

    #[test]
    fn test_emblem_icon_lookup() {
        assert_eq!(emblem_icon("SSH"), "remmina-ssh");
        assert_eq!(emblem_icon(" vnc "), "remmina-vnc");
        assert_eq!(emblem_icon("telnet"), "remmina-nx");
    }
}
