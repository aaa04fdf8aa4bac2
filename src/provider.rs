//! Search-host facade.
//!
//! [`SearchProvider`] is the surface a desktop search host drives: list ids
//! for terms, describe ids, activate one, and narrow a previous result list.
//! No error crosses this boundary; unknown ids are skipped or reported as a
//! failed activation.

use tokio_util::sync::CancellationToken;

use crate::dispatch::{Activation, Dispatcher, preview};
use crate::search;
use crate::storage::StoreReader;
use crate::types::{Entry, EntryId, ResultMeta, emblem_icon};

/// Subtitle shown in place of sensitive payloads.
pub const MASKED_SUBTITLE: &str = "••••••••";

/// Subtitle length in characters.
pub const SUBTITLE_CHARS: usize = 60;

#[derive(Clone)]
pub struct SearchProvider {
    reader: StoreReader,
    dispatcher: Dispatcher,
}

impl SearchProvider {
    pub fn new(reader: StoreReader, dispatcher: Dispatcher) -> Self {
        Self { reader, dispatcher }
    }

    /// Ids of entries whose label contains every term.
    pub async fn list_matches<S: AsRef<str>>(&self, terms: &[S]) -> Vec<EntryId> {
        let store = self.reader.read().await;
        search::search(&store, terms)
    }

    /// Narrow `previous` with the complete current term set.
    pub async fn refine_matches<S: AsRef<str>>(
        &self,
        previous: &[EntryId],
        terms: &[S],
    ) -> Vec<EntryId> {
        let store = self.reader.read().await;
        search::refine(&store, previous, terms)
    }

    /// Cap a result list for display.
    pub fn filter_results(&self, ids: Vec<EntryId>, max: usize) -> Vec<EntryId> {
        search::limit(ids, max)
    }

    /// Title, subtitle and icon for each known id, in request order.
    pub async fn describe(&self, ids: &[EntryId]) -> Vec<ResultMeta> {
        let store = self.reader.read().await;
        ids.iter()
            .filter_map(|id| store.get(id))
            .map(describe_entry)
            .collect()
    }

    /// Run the entry's action.
    ///
    /// The entry is cloned out of the store before dispatching, so no lock is
    /// held while external programs run.
    pub async fn activate(&self, id: &EntryId, cancel: &CancellationToken) -> Activation {
        let entry = self.reader.read().await.get(id).cloned();
        match entry {
            Some(entry) => self.dispatcher.activate(&entry, cancel).await,
            None => {
                tracing::debug!("[provider] activate on unknown id {id}");
                Activation::Failed {
                    reason: format!("unknown entry {id}"),
                }
            }
        }
    }
}

/// Result metadata for one entry.
pub fn describe_entry(entry: &Entry) -> ResultMeta {
    let subtitle = if entry.content_type.is_sensitive() {
        MASKED_SUBTITLE.to_string()
    } else {
        let first_line = entry.payload.lines().next().unwrap_or_default();
        preview(first_line, SUBTITLE_CHARS)
    };

    ResultMeta {
        id: entry.id.clone(),
        title: entry.display_text.clone(),
        subtitle,
        icon: entry
            .icon_hint
            .as_deref()
            .map_or_else(|| entry.content_type.icon_name(), emblem_icon)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentType, UrlKind};
    use std::path::{Path, PathBuf};

    fn entry(payload: &str, content_type: ContentType, icon_hint: Option<&str>) -> Entry {
        let path = Path::new("/data/links.txt");
        Entry {
            id: EntryId::new(path, 0),
            display_text: "Label".to_string(),
            payload: payload.to_string(),
            source_file: PathBuf::from(path),
            content_type,
            icon_hint: icon_hint.map(str::to_string),
        }
    }

    #[test]
    fn test_subtitle_is_first_line() {
        let meta = describe_entry(&entry(
            "https://example.com\nsecond line",
            ContentType::Url(UrlKind::Generic),
            None,
        ));
        assert_eq!(meta.subtitle, "https://example.com");
        assert_eq!(meta.icon, "web-browser");
    }

    #[test]
    fn test_sensitive_payload_is_masked() {
        let meta = describe_entry(&entry(
            "-----BEGIN PGP MESSAGE-----\nabc",
            ContentType::EncryptedBlock,
            None,
        ));
        assert_eq!(meta.subtitle, MASKED_SUBTITLE);
    }

    #[test]
    fn test_icon_hint_maps_to_emblem() {
        let meta = describe_entry(&entry("host", ContentType::PlainText, Some("SSH")));
        assert_eq!(meta.icon, "remmina-ssh");

        let meta = describe_entry(&entry("host", ContentType::PlainText, Some("ssh")));
        assert_eq!(meta.icon, "remmina-ssh");

        let meta = describe_entry(&entry("host", ContentType::PlainText, Some("Gopher")));
        assert_eq!(meta.icon, "remmina-nx");
    }
}
