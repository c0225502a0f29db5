//! Best-effort lookup of a file whose link target no longer matches.
//!
//! Documents frequently link to generic names (`CHANGELOG.md`) while the
//! stored file carries a product/version prefix
//! (`banner-advertising-2.1-changelog.md`). The matcher filters a directory
//! listing by a normalised search pattern and ranks the survivors.

use crate::entry::DirectoryEntry;
use crate::path::extension;

/// Generic document stems and the dash-prefixed pattern searched for instead.
///
/// Checked in order; the first stem contained in the search term wins.
pub const GENERIC_STEMS: &[(&str, &str)] = &[
    ("changelog", "-changelog"),
    ("readme", "-readme"),
    ("license", "-license"),
    ("migration", "-migration"),
    ("troubleshooting", "-troubleshooting"),
];

const SCORE_TERM: i32 = 10;
const SCORE_PATTERN: i32 = 5;
const SCORE_EXTENSION: i32 = 3;
const SCORE_BASE_NAME: i32 = 8;

/// A candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub entry: &'a DirectoryEntry,
    pub score: i32,
}

/// The pattern actually searched for: the lower-cased term, or the
/// dash-prefixed variant of a generic stem it contains.
pub fn search_pattern(search_term: &str) -> String {
    let term = search_term.to_lowercase();
    GENERIC_STEMS
        .iter()
        .find(|(stem, _)| term.contains(stem))
        .map(|(_, pattern)| pattern.to_string())
        .unwrap_or(term)
}

/// Current file name with its last `-`-delimited segment removed.
///
/// "prod-v2-readme.md" -> "prod-v2"; a name without `-` yields "".
pub fn base_name_of(file_name: &str) -> String {
    match file_name.rfind('-') {
        Some(pos) => file_name[..pos].to_string(),
        None => String::new(),
    }
}

/// Score every file whose name contains the search pattern, in listing order.
pub fn rank<'a>(
    candidates: &'a [DirectoryEntry],
    search_term: &str,
    current_base_name: &str,
) -> Vec<ScoredCandidate<'a>> {
    let term = search_term.to_lowercase();
    let pattern = search_pattern(&term);
    let term_ext = extension(&term);
    let base = current_base_name.to_lowercase();

    candidates
        .iter()
        .filter(|entry| !entry.is_folder && entry.uri.to_lowercase().contains(&pattern))
        .map(|entry| {
            let name = entry.uri.to_lowercase();
            let mut score = 0;
            if name.contains(&term) {
                score += SCORE_TERM;
            }
            if name.contains(&pattern) {
                score += SCORE_PATTERN;
            }
            if term_ext.is_some_and(|ext| name.ends_with(ext)) {
                score += SCORE_EXTENSION;
            }
            if name.contains(&base) {
                score += SCORE_BASE_NAME;
            }
            ScoredCandidate { entry, score }
        })
        .collect()
}

/// Highest-scoring candidate; ties go to the earliest entry in the listing.
pub fn find_similar<'a>(
    candidates: &'a [DirectoryEntry],
    search_term: &str,
    current_base_name: &str,
) -> Option<&'a DirectoryEntry> {
    best(&rank(candidates, search_term, current_base_name)).map(|c| c.entry)
}

/// Highest score in a ranked list, first wins on ties.
pub fn best<'r, 'a>(ranked: &'r [ScoredCandidate<'a>]) -> Option<&'r ScoredCandidate<'a>> {
    ranked.iter().fold(None, |best, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(uris: &[&str]) -> Vec<DirectoryEntry> {
        uris.iter().map(|uri| DirectoryEntry::file(*uri)).collect()
    }

    #[test]
    fn generic_stem_maps_to_prefixed_pattern() {
        let candidates = files(&["/prod-v2-changelog.md", "/other.md"]);
        let found = find_similar(&candidates, "changelog", "prod-v2").unwrap();

        assert_eq!(found.uri, "/prod-v2-changelog.md");
    }

    #[test]
    fn empty_candidates_yield_none() {
        assert!(find_similar(&[], "changelog", "prod-v2").is_none());
    }

    #[test]
    fn folders_are_never_matched() {
        let candidates = vec![DirectoryEntry::folder("/guide"), DirectoryEntry::file("/notes.md")];

        assert!(find_similar(&candidates, "guide", "").is_none());
    }

    #[test]
    fn first_stem_in_table_order_wins() {
        // "readme-changelog" contains both; changelog is listed first
        assert_eq!(search_pattern("README-Changelog"), "-changelog");
        assert_eq!(search_pattern("Install"), "install");
    }

    #[test]
    fn base_name_bonus_prefers_same_product() {
        let candidates = files(&["/other-app-readme.md", "/banner-2.1-readme.md"]);
        let found = find_similar(&candidates, "README", "banner-2.1").unwrap();

        assert_eq!(found.uri, "/banner-2.1-readme.md");
    }

    #[test]
    fn ties_keep_listing_order() {
        let candidates = files(&["/a-guide.md", "/b-guide.md"]);
        let found = find_similar(&candidates, "guide", "zzz").unwrap();

        assert_eq!(found.uri, "/a-guide.md");
    }

    #[test]
    fn scores_follow_weights() {
        let candidates = files(&["/prod-v2-changelog.md"]);
        let ranked = rank(&candidates, "changelog", "prod-v2");

        // term 10 + pattern 5 + base 8; no extension in the term
        assert_eq!(ranked[0].score, 23);
    }

    #[test]
    fn extension_bonus_applies_when_term_has_one() {
        let candidates = files(&["/setup.md", "/setup.txt"]);
        let ranked = rank(&candidates, "setup.md", "none");

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, SCORE_TERM + SCORE_PATTERN + SCORE_EXTENSION);
    }

    #[test]
    fn base_name_of_strips_last_dash_segment() {
        assert_eq!(base_name_of("prod-v2-readme.md"), "prod-v2");
        assert_eq!(base_name_of("README.md"), "");
    }
}
