//! Attachment accumulator and upload acceptance policy.
//!
//! Only file metadata (name, declared MIME type, size) is ever inspected. The
//! content buffer is carried along untouched so the submission payload can
//! share it without copying.

use std::fmt;

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ACCEPT: &str = ".stl,.pdf,.jpg,.jpeg,.png";
pub const DEFAULT_MAX_SIZE_MB: u64 = 50;
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Kind of file, derived from the extension and falling back to MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Stl,
    Pdf,
    Jpeg,
    Png,
    Other,
}

impl MediaKind {
    pub fn detect(name: &str, mime_type: Option<&str>) -> Self {
        let from_extension = match extension(name).as_deref() {
            Some(".stl") => Some(Self::Stl),
            Some(".pdf") => Some(Self::Pdf),
            Some(".jpg" | ".jpeg") => Some(Self::Jpeg),
            Some(".png") => Some(Self::Png),
            _ => None,
        };
        from_extension.unwrap_or_else(|| {
            match mime_type.map(|mime| mime.trim().to_ascii_lowercase()).as_deref() {
                Some("model/stl" | "application/sla" | "application/vnd.ms-pki.stl") => Self::Stl,
                Some("application/pdf") => Self::Pdf,
                Some("image/jpeg") => Self::Jpeg,
                Some("image/png") => Self::Png,
                _ => Self::Other,
            }
        })
    }
}

/// Lower-cased extension including the leading dot, e.g. `.stl`.
fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
}

/// One entry of an HTML-style `accept` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptPattern {
    /// `.stl`; compared case-insensitively against the file extension.
    Extension(String),
    /// `application/pdf`; exact MIME match.
    Mime(String),
    /// `image/*`; stored as the `image/` prefix.
    MimeFamily(String),
}

impl AcceptPattern {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('.') {
            return Some(Self::Extension(raw));
        }
        if let Some(family) = raw.strip_suffix("/*") {
            return Some(Self::MimeFamily(format!("{family}/")));
        }
        raw.contains('/').then_some(Self::Mime(raw))
    }

    /// Parses a comma-separated list, skipping blank or malformed entries.
    pub fn parse_list(accept: &str) -> Vec<Self> {
        accept.split(',').filter_map(Self::parse).collect()
    }

    pub fn matches(&self, name: &str, mime_type: Option<&str>) -> bool {
        let mime = mime_type.map(|mime| mime.trim().to_ascii_lowercase());
        match self {
            Self::Extension(ext) => extension(name).as_deref() == Some(ext.as_str()),
            Self::Mime(expected) => mime.as_deref() == Some(expected.as_str()),
            Self::MimeFamily(prefix) => mime.is_some_and(|mime| mime.starts_with(prefix.as_str())),
        }
    }
}

impl fmt::Display for AcceptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension(ext) => f.write_str(ext),
            Self::Mime(mime) => f.write_str(mime),
            Self::MimeFamily(prefix) => write!(f, "{prefix}*"),
        }
    }
}

/// Rules a file must pass before it is admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub allowed_kinds: Vec<AcceptPattern>,
    pub max_size_bytes: u64,
    pub allow_multiple: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPT, DEFAULT_MAX_SIZE_MB * BYTES_PER_MB, true)
    }
}

impl UploadPolicy {
    pub fn new(accept: &str, max_size_bytes: u64, allow_multiple: bool) -> Self {
        Self {
            allowed_kinds: AcceptPattern::parse_list(accept),
            max_size_bytes,
            allow_multiple,
        }
    }

    pub fn single_file(mut self) -> Self {
        self.allow_multiple = false;
        self
    }

    pub fn accepts_kind(&self, file: &CandidateFile) -> bool {
        self.allowed_kinds
            .iter()
            .any(|pattern| pattern.matches(&file.name, file.mime_type.as_deref()))
    }

    pub fn accepts_size(&self, file: &CandidateFile) -> bool {
        file.size_bytes <= self.max_size_bytes
    }

    /// Accepted formats in `accept` attribute form.
    pub fn accepted_formats(&self) -> String {
        self.allowed_kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Size limit as shown to users, `50MB` for whole megabytes.
    pub fn size_limit(&self) -> String {
        if self.max_size_bytes > 0 && self.max_size_bytes % BYTES_PER_MB == 0 {
            format!("{}MB", self.max_size_bytes / BYTES_PER_MB)
        } else {
            format_file_size(self.max_size_bytes)
        }
    }
}

/// A file the user picked or dropped, not yet screened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub content: Bytes,
}

impl CandidateFile {
    /// Metadata-only candidate with a declared size and no content.
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: None,
            content: Bytes::new(),
        }
    }

    /// Candidate whose size is taken from its content.
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size_bytes: content.len() as u64,
            mime_type: None,
            content,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// An admitted file. Owned by an [`AttachmentList`]; clones share `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub size_bytes: u64,
    pub media_kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip)]
    pub content: Bytes,
}

impl From<CandidateFile> for Attachment {
    fn from(file: CandidateFile) -> Self {
        Self {
            media_kind: MediaKind::detect(&file.name, file.mime_type.as_deref()),
            name: file.name,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
            content: file.content,
        }
    }
}

/// Why some files of a batch were not admitted. Later checks override
/// earlier ones, so only the last applicable reason is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Some files were rejected. Accepted formats: {accepted}")]
    UnsupportedKind { accepted: String },
    #[error("Some files exceed the maximum size of {limit}")]
    TooLarge { limit: String },
    #[error("Only one file allowed")]
    SingleFileOnly,
}

/// Outcome of screening one batch of candidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screening {
    pub admitted: Vec<Attachment>,
    pub rejection: Option<RejectionReason>,
}

/// Filters a batch by kind, then size, then the single-file rule.
pub fn screen(candidates: Vec<CandidateFile>, policy: &UploadPolicy) -> Screening {
    let offered = candidates.len();
    let mut rejection = None;

    let (kept, dropped): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|file| policy.accepts_kind(file));
    if !dropped.is_empty() {
        rejection = Some(RejectionReason::UnsupportedKind {
            accepted: policy.accepted_formats(),
        });
    }

    let (mut kept, dropped): (Vec<_>, Vec<_>) =
        kept.into_iter().partition(|file| policy.accepts_size(file));
    if !dropped.is_empty() {
        rejection = Some(RejectionReason::TooLarge {
            limit: policy.size_limit(),
        });
    }

    if !policy.allow_multiple && kept.len() > 1 {
        kept.truncate(1);
        rejection = Some(RejectionReason::SingleFileOnly);
    }

    debug!(
        offered,
        admitted = kept.len(),
        rejection = ?rejection,
        "screened attachment batch"
    );

    Screening {
        admitted: kept.into_iter().map(Attachment::from).collect(),
        rejection,
    }
}

/// Ordered attachments; entries are identified by position, not by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttachmentList {
    items: Vec<Attachment>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screens `candidates` and appends whatever passes. Existing entries are
    /// never removed, whatever the outcome.
    pub fn accept(
        &mut self,
        candidates: Vec<CandidateFile>,
        policy: &UploadPolicy,
    ) -> Option<RejectionReason> {
        let Screening {
            admitted,
            rejection,
        } = screen(candidates, policy);
        self.items.extend(admitted);
        rejection
    }

    /// Removes the entry at `index`, shifting later entries down.
    /// Out-of-range indexes leave the list untouched and return `None`.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attachment> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }

}

/// Human-readable size: bytes below 1 KB, one decimal KB below 1 MB, else MB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < BYTES_PER_MB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_prefers_extension() {
        assert_eq!(MediaKind::detect("Scan.STL", None), MediaKind::Stl);
        assert_eq!(MediaKind::detect("photo.jpeg", None), MediaKind::Jpeg);
        assert_eq!(
            MediaKind::detect("blob", Some("application/pdf")),
            MediaKind::Pdf
        );
        assert_eq!(MediaKind::detect("setup.exe", None), MediaKind::Other);
    }

    #[test]
    fn accept_patterns_cover_extension_and_mime_forms() {
        let patterns = AcceptPattern::parse_list(".STL, image/*, application/pdf, ,junk");
        assert_eq!(patterns.len(), 3);
        assert!(patterns[0].matches("upper.stl", None));
        assert!(patterns[1].matches("x", Some("image/webp")));
        assert!(!patterns[1].matches("x.png", None));
        assert!(patterns[2].matches("x", Some("Application/PDF")));
        assert_eq!(patterns[1].to_string(), "image/*");
    }

    #[test]
    fn formats_sizes_like_the_upload_list() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * BYTES_PER_MB), "2.0 MB");
    }

    #[test]
    fn size_limit_is_whole_megabytes_when_possible() {
        assert_eq!(UploadPolicy::default().size_limit(), "50MB");
        assert_eq!(UploadPolicy::new(".stl", 1536, true).size_limit(), "1.5 KB");
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        let mut list = AttachmentList::new();
        list.accept(
            vec![CandidateFile::new("a.stl", 1)],
            &UploadPolicy::default(),
        );
        assert!(list.remove(5).is_none());
        assert_eq!(list.names(), vec!["a.stl"]);
    }
}
