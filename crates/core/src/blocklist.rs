//! Personal-name blocklist.
//!
//! A crude personal-information filter: clinical text is rejected before it is sent to
//! the AI provider if any of its words is a known given name or surname. Matching is
//! whole-word and case-insensitive; there is no stemming, fuzzy matching or Unicode
//! normalisation beyond case folding, so `Joao` does not match `joão`.

use crate::{CidError, CidResult};
use std::collections::HashSet;
use std::path::Path;

/// Characters removed from the text before it is split into words.
///
/// They are deleted rather than replaced by a space, so `maria.` becomes `maria` and
/// `ana-clara` becomes `anaclara`.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Immutable set of lower-case blocked tokens.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    tokens: HashSet<String>,
}

impl Blocklist {
    /// Builds a blocklist from already-loaded tokens.
    ///
    /// Tokens are trimmed and lower-cased; blank entries are ignored.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// Loads newline-delimited token files and merges them into one blocklist.
    ///
    /// # Errors
    ///
    /// Returns `CidError::BlocklistRead` for the first file that cannot be read. A
    /// partially loaded filter would silently let names through, so there is no
    /// fallback to an empty list.
    pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> CidResult<Self> {
        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| CidError::BlocklistRead {
                path: path.to_path_buf(),
                source,
            })?;
            contents.push(text);
        }

        let blocklist = Self::from_tokens(contents.iter().flat_map(|text| text.lines()));
        tracing::info!("blocklist loaded with {} names and surnames", blocklist.len());
        Ok(blocklist)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the first word of `text` found in the blocklist, if any.
    ///
    /// The returned slice borrows from the blocklist, not from `text`.
    pub fn contains_blocked_token(&self, text: &str) -> Option<&str> {
        let normalised: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
            .collect();

        normalised
            .split_whitespace()
            .find_map(|word| self.tokens.get(word).map(String::as_str))
    }
}
