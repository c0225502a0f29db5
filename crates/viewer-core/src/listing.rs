//! Storage API listing body.
//!
//! `GET /api/browse?path=...` answers with the upstream storage document:
//! `{"children": [{"uri": "/x", "folder": false, ...}], "errors": [...]}`.

use repo_links::DirectoryEntry;
use serde::Deserialize;

use crate::error::RepoError;

#[derive(Debug, Deserialize)]
pub struct ListingBody {
    #[serde(default)]
    pub children: Option<Vec<DirectoryEntry>>,
    #[serde(default)]
    pub errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode a listing body for `path`.
///
/// An `errors` array is a failure even on a 2xx response; a 404 inside it
/// means the directory does not exist. Entries whose uri breaks the
/// single-segment rule are repaired or dropped.
pub fn decode_listing(path: &str, body: &[u8]) -> Result<Vec<DirectoryEntry>, RepoError> {
    let listing: ListingBody = serde_json::from_slice(body).map_err(|e| RepoError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    // Present at all means failure, even when empty
    if let Some(errors) = &listing.errors {
        let first = errors.first();
        if first.and_then(|e| e.status) == Some(404) {
            return Err(RepoError::NotFound {
                path: path.to_string(),
            });
        }
        return Err(RepoError::Upstream {
            path: path.to_string(),
            message: first
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| "Failed to load directory".to_string()),
        });
    }

    let entries = listing
        .children
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let uri = entry.uri.clone();
            let normalized = entry.normalized();
            if normalized.is_none() {
                tracing::warn!("Dropping malformed listing entry {:?} in {:?}", uri, path);
            }
            normalized
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_children() {
        let body = br#"{
            "repo": "libs",
            "path": "/1.0.0",
            "children": [
                {"uri": "/README.md", "folder": false, "size": 120},
                {"uri": "/docs", "folder": true}
            ]
        }"#;
        let entries = decode_listing("/1.0.0", body).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].size, Some(120));
        assert!(entries[1].is_folder);
    }

    #[test]
    fn missing_children_is_empty() {
        assert!(decode_listing("", b"{}").unwrap().is_empty());
    }

    #[test]
    fn errors_array_signals_failure() {
        let body = br#"{"errors":[{"status":404,"message":"Unable to find item"}]}"#;
        assert!(decode_listing("/x", body).unwrap_err().is_not_found());

        let body = br#"{"errors":[{"status":403,"message":"Forbidden"}]}"#;
        assert_eq!(
            decode_listing("/x", body).unwrap_err(),
            RepoError::Upstream {
                path: "/x".into(),
                message: "Forbidden".into()
            }
        );
    }

    #[test]
    fn empty_errors_array_is_still_a_failure() {
        let body = br#"{"children":[{"uri":"/a.md"}],"errors":[]}"#;
        assert_eq!(
            decode_listing("/x", body).unwrap_err(),
            RepoError::Upstream {
                path: "/x".into(),
                message: "Failed to load directory".into()
            }
        );
    }

    #[test]
    fn malformed_entries_are_repaired_or_dropped() {
        let body = br#"{"children":[{"uri":"a.md"},{"uri":"/b/c.md"}]}"#;
        let entries = decode_listing("", body).unwrap();

        assert_eq!(entries, vec![DirectoryEntry::file("/a.md")]);
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = decode_listing("/x", b"<html>").unwrap_err();
        assert!(matches!(err, RepoError::Decode { .. }));
    }
}
