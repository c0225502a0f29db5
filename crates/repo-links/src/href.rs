//! Hyperlinks found in rendered documents.
//!
//! Supports:
//! - Classification: external (`https:`, `mailto:`), anchor (`#top`), internal
//! - Inline links: `[text](target)`
//! - Images: `![alt](src)`
//! - Angle targets and titles: `[text](<my file.md> "Title")`

use serde::Serialize;

/// How a link target is handled when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HrefKind {
    /// Has a `scheme:` prefix; opened in a new tab, never navigated.
    External,
    /// Starts with `#`; in-page jump, nothing to resolve.
    Anchor,
    /// Points into the repository; resolved by the navigator.
    Internal,
}

/// Classify an href. Empty hrefs are treated as anchors (no-op).
pub fn classify(href: &str) -> HrefKind {
    if href.is_empty() || href.starts_with('#') {
        return HrefKind::Anchor;
    }
    if has_scheme(href) {
        return HrefKind::External;
    }
    HrefKind::Internal
}

/// `^[a-z]+:` case-insensitive.
fn has_scheme(href: &str) -> bool {
    match href.find(':') {
        Some(pos) if pos > 0 => href[..pos].chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// A link parsed from markdown source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownLink {
    /// Link text or image alt text
    pub text: String,
    /// The href or image src as written
    pub target: String,
    /// Whether this is an image (`![alt](src)`)
    pub is_image: bool,
}

impl MarkdownLink {
    pub fn kind(&self) -> HrefKind {
        classify(&self.target)
    }
}

/// Parse all inline links and images from markdown content.
///
/// Fenced code blocks and inline code spans are skipped.
pub fn extract_links(content: &str) -> Vec<MarkdownLink> {
    let mut links = Vec::new();
    let mut in_fence = false;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        extract_from_line(line, &mut links);
    }

    links
}

fn extract_from_line(line: &str, links: &mut Vec<MarkdownLink>) {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        // Skip inline code spans
        if chars[i] == '`' {
            match chars[i + 1..].iter().position(|&c| c == '`') {
                Some(offset) => {
                    i += offset + 2;
                    continue;
                }
                None => return,
            }
        }

        if chars[i] == '[' {
            let is_image = i > 0 && chars[i - 1] == '!';
            if let Some((link, end)) = parse_link_at(&chars, i, is_image) {
                links.push(link);
                i = end;
                continue;
            }
        }
        i += 1;
    }
}

/// Parse a link starting at `start` (pointing to `[`).
/// Returns the link and the position after the closing `)`.
fn parse_link_at(chars: &[char], start: usize, is_image: bool) -> Option<(MarkdownLink, usize)> {
    let len = chars.len();

    // Find the matching ], allowing nested brackets in the text
    let mut depth = 0;
    let mut i = start;
    let text_end = loop {
        if i >= len {
            return None;
        }
        match chars[i] {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break i;
                }
            }
            _ => {}
        }
        i += 1;
    };

    if text_end + 1 >= len || chars[text_end + 1] != '(' {
        return None;
    }

    // Find the closing ), allowing balanced parentheses in the target
    let dest_start = text_end + 2;
    let mut depth = 1;
    let mut j = dest_start;
    let mut in_angle = false;
    while j < len {
        match chars[j] {
            '<' if j == dest_start => in_angle = true,
            '>' if in_angle => in_angle = false,
            '(' if !in_angle => depth += 1,
            ')' if !in_angle => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        j += 1;
    }
    if j >= len {
        return None;
    }

    let text: String = chars[start + 1..text_end].iter().collect();
    let destination: String = chars[dest_start..j].iter().collect();
    let target = parse_destination(&destination);

    Some((
        MarkdownLink {
            text,
            target,
            is_image,
        },
        j + 1,
    ))
}

/// Strip angle brackets and an optional title from a link destination.
fn parse_destination(destination: &str) -> String {
    let destination = destination.trim();

    if let Some(rest) = destination.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            return rest[..end].to_string();
        }
    }

    // Title follows the first whitespace: (target "Title")
    match destination.find(char::is_whitespace) {
        Some(pos) => destination[..pos].to_string(),
        None => destination.to_string(),
    }
}
