//! Directory entries as reported by the repository storage API.

use serde::{Deserialize, Deserializer, Serialize};

/// One child of a directory listing.
///
/// `uri` is the entry name with a leading slash (`/README.md`), never a
/// nested path. Field names on the wire follow the storage API
/// (`folder`, `lastModified`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Leading-slash name: "/prod-v2-changelog.md"
    pub uri: String,
    /// Whether the entry is a folder
    #[serde(rename = "folder", default)]
    pub is_folder: bool,
    /// Size in bytes, when the upstream reports it
    #[serde(default, deserialize_with = "size_from_number_or_string")]
    pub size: Option<i64>,
    /// Upstream modification timestamp, compared verbatim
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,
}

impl DirectoryEntry {
    /// A file entry with no size or timestamp.
    pub fn file(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_folder: false,
            size: None,
            last_modified: None,
        }
    }

    /// A folder entry.
    pub fn folder(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_folder: true,
            size: None,
            last_modified: None,
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    /// The entry name without its leading slash: "README.md"
    pub fn name(&self) -> &str {
        self.uri.strip_prefix('/').unwrap_or(&self.uri)
    }

    /// True when `uri` is a single segment starting with `/`.
    pub fn is_well_formed(&self) -> bool {
        self.uri.len() > 1 && self.uri.starts_with('/') && !self.uri[1..].contains('/')
    }

    /// Repair a missing leading slash. Returns `None` for nested or empty uris.
    pub fn normalized(mut self) -> Option<Self> {
        if !self.uri.starts_with('/') {
            self.uri.insert(0, '/');
        }
        self.is_well_formed().then_some(self)
    }
}

/// Sort entries the way the listing is displayed: folders first, then by uri.
pub fn sort_for_display(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        b.is_folder
            .cmp(&a.is_folder)
            .then_with(|| a.uri.to_lowercase().cmp(&b.uri.to_lowercase()))
            .then_with(|| a.uri.cmp(&b.uri))
    });
}

/// Some storage API versions report `size` as a string ("1234").
fn size_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Number(i64),
        Text(String),
    }

    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSize::Number(n)) => Ok(Some(n)),
        Some(RawSize::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid size: {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_strips_leading_slash() {
        assert_eq!(DirectoryEntry::file("/README.md").name(), "README.md");
        assert_eq!(DirectoryEntry::file("README.md").name(), "README.md");
    }

    #[test]
    fn normalized_repairs_missing_slash_and_rejects_nested() {
        let fixed = DirectoryEntry::file("notes.md").normalized().unwrap();
        assert_eq!(fixed.uri, "/notes.md");

        assert!(DirectoryEntry::file("/a/b.md").normalized().is_none());
        assert!(DirectoryEntry::file("/").normalized().is_none());
    }

    #[test]
    fn deserialize_wire_names() {
        let json = r#"{"uri":"/lib-1.0.aar","folder":false,"size":"2048","lastModified":"2024-01-02T03:04:05.000Z"}"#;
        let entry: DirectoryEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.uri, "/lib-1.0.aar");
        assert!(!entry.is_folder);
        assert_eq!(entry.size, Some(2048));
        assert_eq!(entry.last_modified.as_deref(), Some("2024-01-02T03:04:05.000Z"));
    }

    #[test]
    fn deserialize_folder_without_optional_fields() {
        let entry: DirectoryEntry = serde_json::from_str(r#"{"uri":"/1.2.0","folder":true}"#).unwrap();

        assert!(entry.is_folder);
        assert_eq!(entry.size, None);
        assert_eq!(entry.last_modified, None);
    }

    #[test]
    fn display_order_puts_folders_first() {
        let mut entries = vec![
            DirectoryEntry::file("/b.md"),
            DirectoryEntry::folder("/z"),
            DirectoryEntry::file("/A.md"),
            DirectoryEntry::folder("/a"),
        ];
        sort_for_display(&mut entries);

        let uris: Vec<_> = entries.iter().map(|e| e.uri.as_str()).collect();
        assert_eq!(uris, vec!["/a", "/z", "/A.md", "/b.md"]);
    }
}
