//! Binary payloads and scoped object URLs.
//!
//! Downloads (PDFs, CSV samples, QR images, report exports) come back as [`Blob`]s.
//! Previews reference a blob through an [`ObjectUrl`] registered in an
//! [`ObjectUrlRegistry`]. The URL is revoked when the handle is dropped, so it is
//! released exactly once and cannot be resolved afterwards.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::framework::RawResponse;

/// A binary response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub content_type: String,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl Blob {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: None,
            bytes: bytes.into(),
        }
    }

    pub fn from_raw(raw: RawResponse) -> Self {
        let file_name = raw
            .content_disposition
            .as_deref()
            .and_then(disposition_file_name);
        Self {
            content_type: raw
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            file_name,
            bytes: raw.body,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Server-provided file name, or `fallback`.
    pub fn file_name_or(&self, fallback: &str) -> String {
        self.file_name.clone().unwrap_or_else(|| fallback.to_string())
    }

    /// Writes the blob to disk.
    pub async fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, &self.bytes).await
    }
}

fn disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Number of recently revoked URLs kept for [`ObjectUrlRegistry::revocation_count`].
pub const REVOCATION_HISTORY: usize = 64;

/// Tracks live object URLs and the most recent revocations.
#[derive(Default)]
pub struct ObjectUrlRegistry {
    live: DashMap<String, Blob>,
    recently_revoked: Mutex<VecDeque<String>>,
    revoked_total: AtomicU64,
}

impl ObjectUrlRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers `blob` and returns the guard that owns its URL.
    pub fn create(self: &Arc<Self>, blob: Blob) -> ObjectUrl {
        let url = format!("blob:pharmacy/{}", Uuid::new_v4());
        debug!(%url, bytes = blob.len(), "Object URL created");
        self.live.insert(url.clone(), blob);
        ObjectUrl {
            url,
            registry: Arc::clone(self),
        }
    }

    /// Returns the blob behind a live URL. Revoked URLs resolve to `None`.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.live.get(url).map(|entry| entry.value().clone())
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains_key(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// How often `url` was revoked, counted over the last [`REVOCATION_HISTORY`]
    /// revocations.
    pub fn revocation_count(&self, url: &str) -> usize {
        let history = self
            .recently_revoked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.iter().filter(|u| u.as_str() == url).count()
    }

    pub fn revoked_total(&self) -> u64 {
        self.revoked_total.load(Ordering::Relaxed)
    }

    fn revoke(&self, url: &str) {
        self.live.remove(url);
        self.revoked_total.fetch_add(1, Ordering::Relaxed);
        let mut history = self
            .recently_revoked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if history.len() == REVOCATION_HISTORY {
            history.pop_front();
        }
        history.push_back(url.to_string());
        debug!(%url, "Object URL revoked");
    }
}

/// Owned handle to a registered blob URL. Dropping it revokes the URL.
pub struct ObjectUrl {
    url: String,
    registry: Arc<ObjectUrlRegistry>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn blob(&self) -> Option<Blob> {
        self.registry.resolve(&self.url)
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

/// A single preview position (QR image, PDF viewer).
///
/// Replacing the content revokes the previous URL first. Dropping the slot
/// revokes whatever it still holds.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    current: Option<ObjectUrl>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, url: ObjectUrl) -> &ObjectUrl {
        self.current.take();
        self.current.insert(url)
    }

    pub fn clear(&mut self) {
        self.current.take();
    }

    pub fn current(&self) -> Option<&ObjectUrl> {
        self.current.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.current.as_ref().map(ObjectUrl::as_str)
    }
}
