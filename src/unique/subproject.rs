use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::error::Result;
use crate::project::Project;

use super::store::ResultStore;
use super::walker;

/// A sibling project materialized up to the walking step: its object store
/// plus the id assignments its own walker produced. Never rewritten from
/// here; only consulted to resolve remote ids.
#[derive(Debug)]
pub struct Subproject {
    pub project: Project,
    pub store: ResultStore,
}

impl Subproject {
    fn find_target(&self, name: &str) -> Option<&str> {
        let targets = self.project.root_object().get_array("targets")?;
        targets
            .iter()
            .filter_map(|v| v.as_str())
            .find(|id| {
                self.project
                    .object(id)
                    .and_then(|t| t.get_str("name"))
                    == Some(name)
            })
    }

    /// New id of the target called `name`, falling back to the target's
    /// current id when its assignment is somehow missing.
    pub fn target_new_key(&self, name: &str) -> Option<String> {
        let target_id = self.find_target(name)?;
        Some(
            self.store
                .new_key_of(target_id)
                .unwrap_or(target_id)
                .to_string(),
        )
    }

    /// New id of the product reference of the target called `name`.
    pub fn product_new_key(&self, name: &str) -> Option<String> {
        let target_id = self.find_target(name)?;
        let product_id = self.project.object(target_id)?.get_str("productReference")?;
        Some(
            self.store
                .new_key_of(product_id)
                .unwrap_or(product_id)
                .to_string(),
        )
    }
}

/// Memoized sibling-project cache, owned by the root pipeline and keyed by
/// the sibling's normalized absolute `.xcodeproj` path. Each sibling is
/// materialized at most once; a lookup that re-enters a project still being
/// walked reports a cycle instead of recursing forever.
#[derive(Debug)]
pub struct SubprojectCache {
    loaded: RefCell<HashMap<PathBuf, Rc<Subproject>>>,
    in_progress: RefCell<HashSet<PathBuf>>,
}

impl SubprojectCache {
    /// `root` is the owning project's own path, seeded so a sibling chain
    /// leading back to it is detected as a cycle.
    pub fn new(root: PathBuf) -> Self {
        let mut in_progress = HashSet::new();
        in_progress.insert(root);
        SubprojectCache {
            loaded: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(in_progress),
        }
    }

    /// Load and walk the project at `path`, reusing a previous
    /// materialization when there is one. `Ok(None)` means the project is
    /// already being walked somewhere up the chain (a reference cycle).
    pub fn materialize(&self, path: &Path) -> Result<Option<Rc<Subproject>>> {
        if let Some(existing) = self.loaded.borrow().get(path) {
            return Ok(Some(existing.clone()));
        }
        if !self.in_progress.borrow_mut().insert(path.to_path_buf()) {
            return Ok(None);
        }

        debug!("materializing subproject {}", path.display());
        let outcome: Result<Rc<Subproject>> = (|| {
            let project = Project::open(path)?;
            let store = walker::walk(&project, self)?;
            Ok(Rc::new(Subproject { project, store }))
        })();
        self.in_progress.borrow_mut().remove(path);

        let subproject = outcome?;
        self.loaded
            .borrow_mut()
            .insert(path.to_path_buf(), subproject.clone());
        Ok(Some(subproject))
    }
}
