//! Filename sanitization and storage-key derivation.
//!
//! Client-supplied filenames are arbitrary Unicode; blob-store keys must
//! be storage-safe ASCII. The sanitized form NFD-decomposes the name,
//! drops combining marks (so `é` becomes `e` rather than disappearing),
//! drops any remaining non-ASCII, and collapses whitespace and path
//! separators into single underscores. The storage key prefixes the
//! result with a millisecond timestamp and a short random fragment so
//! that identical names never collide across uploads.

use chrono::Utc;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use uuid::Uuid;

/// Fallback used when nothing survives sanitization.
const FALLBACK_NAME: &str = "file";

/// Normalize a client-supplied filename to a storage-safe ASCII form.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if !c.is_ascii() {
            continue;
        }
        // Path separators are folded into the separator run: a key must
        // never introduce directory structure the caller did not ask for.
        if c.is_ascii_whitespace() || c == '/' || c == '\\' {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.push(c);
    }

    if out.is_empty() || out == "." || out == ".." {
        return FALLBACK_NAME.to_owned();
    }
    out
}

/// Derive a unique blob-store key for a filename.
///
/// The key is `{millis}-{fragment}-{sanitized}`: sortable by upload
/// time, unique even for identical names uploaded in the same
/// millisecond.
#[must_use]
pub fn storage_key(name: &str) -> String {
    let fragment = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &fragment[..6],
        sanitize_filename(name)
    )
}
