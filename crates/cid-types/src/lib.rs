//! # CID Types
//!
//! Validated value types shared by the CID suggestion crates.
//!
//! Construction is the only place validation happens; once built, a value is known to be
//! well formed and can be passed around without re-checking.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text is shorter than the required number of characters
    #[error("Text must contain at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },
    /// The input does not have the shape of an ICD-10 code
    #[error("Not an ICD-10 code: {0}")]
    InvalidCidCode(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Builds an optional `NonEmptyText`, treating blank input as absent.
    ///
    /// Browser forms send empty strings for untouched fields, so `Some("")` and `None`
    /// mean the same thing to callers.
    pub fn optional(input: Option<impl AsRef<str>>) -> Option<Self> {
        input.and_then(|s| Self::new(s).ok())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode scalar values in the text.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Free-text clinical narrative (HDA) with a minimum length.
///
/// The length is counted in characters, not bytes, so accented Portuguese text is not
/// penalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalText(NonEmptyText);

impl ClinicalText {
    /// Validates `input` as a clinical narrative of at least `min_chars` characters.
    ///
    /// # Errors
    ///
    /// * `TextError::Empty` - the input is blank.
    /// * `TextError::TooShort` - the trimmed input has fewer than `min_chars` characters.
    pub fn new(input: impl AsRef<str>, min_chars: usize) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        let actual = text.char_count();
        if actual < min_chars {
            return Err(TextError::TooShort {
                min: min_chars,
                actual,
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ClinicalText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// An ICD-10 (CID-10) code in canonical upper-case form, e.g. `J45` or `J45.9`.
///
/// Only the shape is checked (one letter, two digits, optional subdivision). Whether the
/// code actually exists in the classification is not known here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CidCode(String);

impl CidCode {
    const MAX_SUBDIVISION_LEN: usize = 4;

    /// Parses and normalises a code.
    ///
    /// Surrounding whitespace is trimmed and letters are upper-cased. Accepted shapes:
    /// `A00`, `A00.0`, `A00.01`, `A000` (subdivision without the dot).
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::InvalidCidCode`
    /// otherwise.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let raw = NonEmptyText::new(input)?;
        let code = raw.as_str().to_ascii_uppercase();
        let bytes = code.as_bytes();

        let head_ok = bytes.len() >= 3
            && bytes[0].is_ascii_uppercase()
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit();
        if !head_ok {
            return Err(TextError::InvalidCidCode(raw.into_inner()));
        }

        let rest = &code[3..];
        let subdivision = rest.strip_prefix('.').unwrap_or(rest);
        let dotted = subdivision.len() != rest.len();
        let subdivision_ok = if subdivision.is_empty() {
            !dotted
        } else {
            subdivision.len() <= Self::MAX_SUBDIVISION_LEN
                && subdivision.bytes().all(|b| b.is_ascii_alphanumeric())
        };
        if !subdivision_ok {
            return Err(TextError::InvalidCidCode(raw.into_inner()));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The three-character category, e.g. `J45` for `J45.9`.
    pub fn category(&self) -> &str {
        &self.0[..3]
    }
}

impl std::fmt::Display for CidCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for CidCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for CidCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CidCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
