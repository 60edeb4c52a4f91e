use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::project::Project;
use crate::rewrite::{backup, sort_content, substitute};
use crate::types::Value;
use crate::unique::{walker, ResultStore, SubprojectCache};

/// What one rewrite stage did to the file.
#[derive(Debug)]
pub struct StageReport {
    /// Whether this stage changed the file on disk.
    pub changed: bool,
    /// Lines dropped by this stage, verbatim.
    pub removed_lines: Vec<String>,
    /// Accumulated non-fatal warnings.
    pub warnings: Vec<String>,
}

/// The whole pipeline for one project file: uniquify (walk the graph, then
/// substitute ids in the text) and sort. A single modified flag spans both
/// stages; sorting relies on the new ids already being in place, so
/// uniquification always runs first when both are requested.
#[derive(Debug)]
pub struct Normalizer {
    project: Project,
    store: ResultStore,
    subprojects: SubprojectCache,
    modified: bool,
}

impl Normalizer {
    /// `target` is a `.xcodeproj` directory or a `project.pbxproj` file.
    pub fn open(target: &Path) -> Result<Self> {
        let project = Project::open(target)?;
        let subprojects = SubprojectCache::new(project.xcodeproj_path.clone());
        Ok(Normalizer {
            project,
            store: ResultStore::new(),
            subprojects,
            modified: false,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    /// Whether any stage so far rewrote the file.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Rewrite every object id to its canonical digest and drop lines that
    /// reference removed or dangling objects.
    pub fn uniquify(&mut self) -> Result<StageReport> {
        self.store = walker::walk(&self.project, &self.subprojects)?;
        debug!("replace ids and drop unused ids");
        let original = self.project.read_text()?;
        let substitution = substitute(&original, &self.store);
        let changed = backup::commit(
            &self.project.pbxproj_path,
            &original,
            &substitution.output,
            ".ubak",
        )?;
        self.modified |= changed;
        Ok(StageReport {
            changed,
            removed_lines: substitution.removed_lines,
            warnings: self.store.warnings().to_vec(),
        })
    }

    /// Sort section objects and `files`/`children` arrays in place.
    pub fn sort(&mut self, by_filename: bool) -> Result<StageReport> {
        debug!("sort project file");
        let pinned = self.pinned_product_groups();
        let original = self.project.read_text()?;
        let outcome = sort_content(&original, by_filename, &pinned)?;
        let changed = backup::commit(
            &self.project.pbxproj_path,
            &original,
            &outcome.output,
            ".sbak",
        )?;
        self.modified |= changed;
        Ok(StageReport {
            changed,
            removed_lines: outcome.removed_lines,
            warnings: Vec::new(),
        })
    }

    /// Groups listed as `projectReferences[*].ProductGroup`: Xcode keeps
    /// their children in a significant order, so the sorter must not touch
    /// them. Ids are mapped through the result store because sorting runs
    /// on the already-substituted text.
    fn pinned_product_groups(&self) -> HashSet<String> {
        let mut pinned = HashSet::new();
        if let Some(references) = self.project.root_object().get_array("projectReferences") {
            for reference in references {
                if let Some(group) = reference.get("ProductGroup").and_then(Value::as_str) {
                    let id = self.store.new_key_of(group).unwrap_or(group);
                    pinned.insert(id.to_string());
                }
            }
        }
        pinned
    }

    /// Verbose-mode dump of the walker's assignments next to the project
    /// file. Returns the path written.
    pub fn dump_debug_result(&self) -> Result<PathBuf> {
        let path = self.project.xcodeproj_path.join("debug_result.json");
        let json = serde_json::to_string_pretty(&self.store)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
