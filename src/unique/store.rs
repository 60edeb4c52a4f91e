use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use super::hash::md5_hex;

/// Rehashing more than this many times in a row would mean MD5 collides on
/// demand; treat it as a bug rather than looping forever.
const MAX_REHASH: usize = 32;

/// What the walker recorded for one old id.
///
/// Locally walked objects carry the full triple; ids owned by a sibling
/// project carry only the replacement id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub new_key: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub isa: Option<String>,
}

/// Mutable state of a uniquification run: old id → result entry, the
/// inverse new-id → canonical-path map that keeps new ids injective, the
/// removal queue, and accumulated user-facing warnings.
#[derive(Debug, Default, Serialize)]
pub struct ResultStore {
    entries: IndexMap<String, ResultEntry>,
    to_be_removed: IndexSet<String>,
    warnings: Vec<String>,
    #[serde(skip)]
    paths_by_new_key: HashMap<String, String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `old_id` as living at `canonical` with candidate id `new_key`.
    ///
    /// Re-assignment drops the previous inverse mapping first. While the
    /// candidate already names a *different* path, the candidate is rehashed
    /// (the hex string itself fed back through MD5), so no two canonical
    /// paths ever share a new id. Returns the id that was finally recorded.
    pub fn assign(&mut self, old_id: &str, canonical: String, new_key: String, isa: &str) -> String {
        if let Some(previous) = self.entries.get(old_id) {
            debug!("override {}", old_id);
            self.paths_by_new_key.remove(&previous.new_key);
        }
        let mut key = new_key;
        let mut rehashes = 0;
        while self
            .paths_by_new_key
            .get(&key)
            .is_some_and(|path| *path != canonical)
        {
            debug!("hash conflict old:{} => new:{}", old_id, key);
            key = md5_hex(&key);
            rehashes += 1;
            assert!(rehashes <= MAX_REHASH, "rehash loop did not terminate");
        }
        self.paths_by_new_key.insert(key.clone(), canonical.clone());
        self.entries.insert(
            old_id.to_string(),
            ResultEntry {
                path: Some(canonical),
                new_key: key.clone(),
                isa: Some(isa.to_string()),
            },
        );
        key
    }

    /// Record a remote id owned by a sibling project. Only the replacement
    /// id is known; the inverse map is not involved.
    pub fn set_remote(&mut self, old_id: &str, new_key: String) {
        self.entries.insert(
            old_id.to_string(),
            ResultEntry {
                path: None,
                new_key,
                isa: None,
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entry(&self, id: &str) -> Option<&ResultEntry> {
        self.entries.get(id)
    }

    pub fn new_key_of(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|e| e.new_key.as_str())
    }

    /// Canonical path of a locally walked id; None for remote-only entries.
    pub fn path_of(&self, id: &str) -> Option<&str> {
        self.entries.get(id).and_then(|e| e.path.as_deref())
    }

    pub fn mark_removed(&mut self, id: &str) {
        self.to_be_removed.insert(id.to_string());
    }

    pub fn is_removed(&self, id: &str) -> bool {
        self.to_be_removed.contains(id)
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assign_and_lookup() {
        let mut store = ResultStore::new();
        let key = store.assign(
            "OLD0000000000000000000001",
            "PBXGroup[Demo.xcodeproj/Sources]".to_string(),
            md5_hex("Demo.xcodeproj/Sources"),
            "PBXGroup",
        );
        assert_eq!(store.new_key_of("OLD0000000000000000000001"), Some(key.as_str()));
        assert_eq!(
            store.path_of("OLD0000000000000000000001"),
            Some("PBXGroup[Demo.xcodeproj/Sources]")
        );
    }

    #[test]
    fn test_collision_rehashes() {
        let mut store = ResultStore::new();
        let candidate = md5_hex("seed");
        let first = store.assign("A", "path-a".to_string(), candidate.clone(), "PBXGroup");
        assert_eq!(first, candidate);
        // Different path, same candidate: must be rehashed away
        let second = store.assign("B", "path-b".to_string(), candidate.clone(), "PBXGroup");
        assert_ne!(second, first);
        assert_eq!(second, md5_hex(&candidate));
    }

    #[test]
    fn test_same_path_shares_key() {
        let mut store = ResultStore::new();
        let candidate = md5_hex("shared");
        let first = store.assign("A", "shared-path".to_string(), candidate.clone(), "PBXBuildFile");
        let second = store.assign("B", "shared-path".to_string(), candidate, "PBXBuildFile");
        assert_eq!(first, second);
    }

    #[test]
    fn test_reassignment_releases_old_key() {
        let mut store = ResultStore::new();
        let shallow = md5_hex("shallow");
        store.assign("A", "shallow-path".to_string(), shallow.clone(), "PBXNativeTarget");
        // Deeper visit overrides the placeholder; the old inverse slot frees up
        store.assign("A", "deep-path".to_string(), md5_hex("deep"), "PBXNativeTarget");
        let reuse = store.assign("B", "other-path".to_string(), shallow.clone(), "PBXGroup");
        assert_eq!(reuse, shallow);
    }

    #[test]
    fn test_remote_entries() {
        let mut store = ResultStore::new();
        store.set_remote("REMOTE", "0123456789ABCDEF0123456789ABCDEF".to_string());
        assert!(store.contains("REMOTE"));
        assert_eq!(store.new_key_of("REMOTE"), Some("0123456789ABCDEF0123456789ABCDEF"));
        assert_eq!(store.path_of("REMOTE"), None);
    }

    #[test]
    fn test_removed_and_warnings() {
        let mut store = ResultStore::new();
        store.mark_removed("GONE");
        store.mark_removed("GONE");
        store.warn("something odd".to_string());
        assert!(store.is_removed("GONE"));
        assert!(!store.is_removed("HERE"));
        assert_eq!(store.warnings(), ["something odd"]);
    }

    #[test]
    fn test_serializes_for_debug_dump() {
        let mut store = ResultStore::new();
        store.assign("A", "p".to_string(), md5_hex("p"), "PBXGroup");
        store.set_remote("R", "ffff".to_string());
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"new_key\""));
        assert!(json.contains("\"type\":\"PBXGroup\""));
        // Remote entries omit path and type
        assert!(json.contains("\"R\":{\"new_key\":\"ffff\"}"));
    }
}
