//! Path segment sanitization
//!
//! Turns arbitrary identity strings (hostnames, usernames, prefixes,
//! namespaces) into segments that are safe to embed in a store path.

/// Segment returned when nothing usable survives sanitization
pub const FALLBACK_SEGMENT: &str = "unknown";

/// Characters that would change a path's shape or break store keys
const UNSAFE_CHARS: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '<', '>', '|', ' ', '\t', '\n', '\r',
];

/// Characters stripped from both ends of a segment
const EDGE_CHARS: &[char] = &['.', '-', '_'];

/// Sanitize a single path component
///
/// Unsafe characters become `_`, then dots, dashes and underscores are
/// trimmed from both ends. An empty result becomes `"unknown"`.
/// The function is idempotent.
pub fn sanitize_component(component: &str) -> String {
    let replaced: String = component
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(EDGE_CHARS);

    if trimmed.is_empty() {
        FALLBACK_SEGMENT.to_string()
    } else {
        trimmed.to_string()
    }
}
