//! Constants used throughout the CID core crate.

use std::time::Duration;

/// How long a fetched model catalog stays fresh (three weeks).
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(3 * 7 * 24 * 60 * 60);

/// Deadline for fetching the model catalog.
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(8);

/// Deadline for a single suggestion generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum number of characters in a clinical narrative.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 10;

/// Model used when callers are not allowed to pick one.
pub const DEFAULT_MODEL_ID: &str = "gemini-1.5-flash-latest";

/// Base URL of the Generative Language REST API.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Blocklist file holding given names.
pub const GIVEN_NAMES_FILENAME: &str = "nomes.txt";

/// Blocklist file holding surnames.
pub const SURNAMES_FILENAME: &str = "sobrenomes.txt";

/// Default directory holding the blocklist files.
pub const DEFAULT_BLOCKLIST_DIR: &str = "data";
