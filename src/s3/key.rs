//! Object key construction.
//!
//! Keys are built as `prefix + "/" + relative_path` with both sides stripped
//! of surrounding whitespace and slashes. Both functions are pure; duplicate
//! detection in the planner relies on them being deterministic.

/// Normalize a context prefix: trim whitespace, then strip leading and
/// trailing slashes. An empty result is a legal "no prefix" value.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_matches('/').to_string()
}

/// Join a normalized prefix with a relative path to form an object key.
///
/// An empty relative path degenerates to the prefix alone; an empty prefix
/// yields the bare relative path.
pub fn join_key(prefix: &str, relative: &str) -> String {
    let rel = relative.trim().trim_matches('/');
    if rel.is_empty() {
        return prefix.to_string();
    }
    if prefix.is_empty() {
        return rel.to_string();
    }
    format!("{prefix}/{rel}")
}
