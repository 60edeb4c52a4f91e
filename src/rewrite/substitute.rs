//! Streaming id substitution over the raw project text.

use crate::unique::ResultStore;

use super::patterns;

#[derive(Debug)]
pub struct Substitution {
    pub output: String,
    /// Lines dropped because they reference removed or dangling ids.
    pub removed_lines: Vec<String>,
}

/// Rewrite every id token to its assigned new id. A line mentioning an id
/// queued for removal, or an id with no result entry at all, is dropped
/// whole and reported. Everything else passes through byte-for-byte.
pub fn substitute(content: &str, store: &ResultStore) -> Substitution {
    let mut output = String::with_capacity(content.len());
    let mut removed_lines = Vec::new();

    for line in content.split_inclusive('\n') {
        let ids = patterns::scan_ids(line);
        if ids.is_empty() {
            output.push_str(line);
            continue;
        }
        if ids.iter().any(|id| store.is_removed(id)) {
            removed_lines.push(line.to_string());
            continue;
        }
        if !ids.iter().all(|id| store.contains(id)) {
            removed_lines.push(line.to_string());
            continue;
        }
        let mut rewritten = line.to_string();
        for id in ids {
            if let Some(new_key) = store.new_key_of(id) {
                rewritten = rewritten.replace(id, new_key);
            }
        }
        output.push_str(&rewritten);
    }

    Substitution {
        output,
        removed_lines,
    }
}
