//! Path arithmetic over the repository's virtual filesystem.
//!
//! Paths are `/`-separated strings rooted at the browsed repository
//! (`/1.2.0/docs/guide.md`); the root directory is the empty string. These
//! are pure functions with no I/O: a resolved path may not exist, existence
//! is checked by the caller.

use serde::Serialize;

/// Resolve `target` as written in the document at `current_file_path`.
///
/// - `/x` is absolute and returned unchanged
/// - `./x` and bare `x` are relative to the document's directory
/// - each leading `../` climbs one directory
pub fn resolve(current_file_path: &str, target: &str) -> String {
    let current_dir = parent_dir(current_file_path);

    if target.starts_with('/') {
        return target.to_string();
    }

    if let Some(rest) = target.strip_prefix("./") {
        return format!("{}/{}", current_dir, rest);
    }

    if target.starts_with("../") {
        let mut dir = current_dir;
        let mut rel = target;
        while let Some(rest) = rel.strip_prefix("../") {
            dir = parent_dir(dir);
            rel = rest;
        }
        return format!("{}/{}", dir, rel);
    }

    format!("{}/{}", current_dir, target)
}

/// Everything before the last `/`, or "" when there is none.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Last segment of a path or href: "../docs/guide.md" -> "guide.md"
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lower-cased file name without its final extension: "Guide.MD" -> "guide"
pub fn file_stem(path: &str) -> String {
    let name = file_name(path).to_lowercase();
    match extension_start(&name) {
        Some(pos) => name[..pos].to_string(),
        None => name,
    }
}

/// Extension including the dot, when the name ends in one: ".md"
pub fn extension(name: &str) -> Option<&str> {
    extension_start(name).map(|pos| &name[pos..])
}

fn extension_start(name: &str) -> Option<usize> {
    let pos = name.rfind('.')?;
    let ext = &name[pos + 1..];
    (!ext.is_empty() && !ext.contains('/')).then_some(pos)
}

/// Drop a `#fragment` or `?query` suffix from an href.
pub fn strip_fragment(href: &str) -> &str {
    match href.find(['#', '?']) {
        Some(pos) => &href[..pos],
        None => href,
    }
}

/// Whether an href names a file rather than a directory.
///
/// File-like hrefs end in a segment with an extension-shaped suffix
/// (`guide.md`, `lib-1.0.aar`). `../docs`, `./` and `v1/` are directories.
pub fn is_file_like(href: &str) -> bool {
    let name = file_name(strip_fragment(href));
    match name.rfind('.') {
        Some(pos) => {
            let ext = &name[pos + 1..];
            !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Collapse `.` and `..` segments and empty segments of a directory path.
///
/// `..` above the root stays at the root, which is "".
/// "/1.0.0/docs/.." -> "/1.0.0", "/1.0.0/.." -> ""
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    segments.iter().map(|s| format!("/{}", s)).collect()
}

/// Append a listing uri to the directory it was listed from.
pub fn join(dir: &str, uri: &str) -> String {
    if uri.starts_with('/') {
        format!("{}{}", dir.trim_end_matches('/'), uri)
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), uri)
    }
}

/// One step of the breadcrumb trail for a directory path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub label: String,
    pub path: String,
}

/// Root crumb followed by one crumb per path segment.
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: "Root".to_string(),
        path: String::new(),
    }];

    let mut accumulated = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        accumulated.push('/');
        accumulated.push_str(part);
        crumbs.push(Crumb {
            label: part.to_string(),
            path: accumulated.clone(),
        });
    }

    crumbs
}
