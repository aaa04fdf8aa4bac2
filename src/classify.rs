//! Payload classification.
//!
//! Rules are an ordered table of `(name, predicate, tag)`; the first rule
//! whose predicate accepts the payload decides the content type. The final
//! fallback is `plain-text`, so classification never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ClassifyConfig;
use crate::parsing::RawRecord;
use crate::types::{ContentType, UrlKind};

/// Markers of armored encrypted payloads.
const ENCRYPTED_MARKERS: &[&str] = &[
    "-----BEGIN PGP MESSAGE-----",
    "-----BEGIN AGE ENCRYPTED FILE-----",
];

/// Reserved payload meaning "fetch a one-time code for this label".
pub const OTP_MARKER: &str = "otp";
/// Reserved payload meaning "fetch the stored secret for this label".
pub const SECRET_MARKER: &str = "pass";

const OTP_SCHEME: &str = "otpauth://";
const NOTE_SCHEME: &str = "obsidian://";
const SHELL_SUFFIX: &str = ".sh";

/// Video-conference hosts, matched case-insensitively.
const MEETING_KEYWORDS: &[&str] = &[
    "zoom.us",
    "meet.google",
    "teams.microsoft",
    "teams.live",
    "webex",
    "jitsi",
    "whereby",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"']+"#).expect("valid url regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// One classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub predicate: fn(&str) -> bool,
    pub tag: ContentType,
}

/// The built-in rule table, highest precedence first.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "encrypted",
            predicate: is_encrypted,
            tag: ContentType::EncryptedBlock,
        },
        Rule {
            name: "otp",
            predicate: is_otp_reference,
            tag: ContentType::OtpReference,
        },
        Rule {
            name: "secret",
            predicate: is_secret_reference,
            tag: ContentType::SecretReference,
        },
        Rule {
            name: "note",
            predicate: is_note_link,
            tag: ContentType::NoteLink,
        },
        Rule {
            name: "meeting-url",
            predicate: is_meeting_url,
            tag: ContentType::Url(UrlKind::Meeting),
        },
        Rule {
            name: "url",
            predicate: is_url,
            tag: ContentType::Url(UrlKind::Generic),
        },
        Rule {
            name: "email",
            predicate: is_email,
            tag: ContentType::Email,
        },
        Rule {
            name: "shell-script",
            predicate: is_shell_script,
            tag: ContentType::ShellScript,
        },
    ]
}

fn is_encrypted(payload: &str) -> bool {
    ENCRYPTED_MARKERS.iter().any(|m| payload.contains(m))
}

fn is_otp_reference(payload: &str) -> bool {
    let trimmed = payload.trim();
    trimmed.eq_ignore_ascii_case(OTP_MARKER) || trimmed.starts_with(OTP_SCHEME)
}

fn is_secret_reference(payload: &str) -> bool {
    payload.trim().eq_ignore_ascii_case(SECRET_MARKER)
}

fn is_note_link(payload: &str) -> bool {
    payload.trim().starts_with(NOTE_SCHEME)
}

fn is_meeting_url(payload: &str) -> bool {
    if first_url(payload).is_none() {
        return false;
    }
    let lower = payload.to_lowercase();
    MEETING_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn is_url(payload: &str) -> bool {
    first_url(payload).is_some()
}

fn is_email(payload: &str) -> bool {
    email_address(payload).is_some()
}

/// Trailing `.sh` is the common case; any occurrence counts.
fn is_shell_script(payload: &str) -> bool {
    payload.contains(SHELL_SUFFIX)
}

/// First HTTP(S) URL found on any line.
pub fn first_url(payload: &str) -> Option<&str> {
    URL_RE.find(payload).map(|m| m.as_str())
}

/// First line that is an email address, with any `mailto:` prefix stripped.
pub fn email_address(payload: &str) -> Option<&str> {
    payload.lines().map(str::trim).find_map(|line| {
        let candidate = line.strip_prefix("mailto:").unwrap_or(line);
        EMAIL_RE.is_match(candidate).then_some(candidate)
    })
}

/// First line naming a shell script.
pub fn script_line(payload: &str) -> Option<&str> {
    payload
        .lines()
        .map(str::trim)
        .find(|line| line.contains(SHELL_SUFFIX))
}

/// Assigns exactly one content type per payload.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    honor_category: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifyConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            rules: default_rules(),
            honor_category: config.honor_category,
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a payload heuristically.
    pub fn classify(&self, payload: &str) -> ContentType {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(payload))
            .map(|rule| rule.tag)
            .unwrap_or(ContentType::PlainText)
    }

    /// Classify a parsed record, honoring its category column when enabled.
    pub fn classify_record(&self, record: &RawRecord) -> ContentType {
        if self.honor_category
            && let Some(content_type) = record
                .category
                .as_deref()
                .and_then(ContentType::from_category)
        {
            return content_type;
        }
        self.classify(&record.payload)
    }
}
