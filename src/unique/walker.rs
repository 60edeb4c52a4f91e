//! Typed traversal of the project graph.
//!
//! Starting at the root `PBXProject`, every reachable object gets a
//! canonical path of the form `<isa>[<parent path>/<local key>]` and a new
//! id derived from hashing the bracketed path. The local key depends on the
//! object's kind; forward references from target dependencies are handled
//! by pre-assigning all targets before descending into any of them.

use log::debug;

use crate::error::{Error, Result};
use crate::project::{paths, Project};
use crate::types::Isa;

use super::hash::md5_hex;
use super::store::ResultStore;
use super::subproject::SubprojectCache;

/// How an object's local path segment is derived from its node.
enum PathKey<'a> {
    /// The named attribute's text when present, else the key text itself.
    /// (This one rule covers `name`-keyed kinds, the literal fallbacks, and
    /// build phases keyed by their own isa.)
    Attr(&'a str),
    /// Rendered attribute values joined with `/`; missing components render
    /// empty.
    Join(&'a [&'a str]),
    /// A precomputed segment, e.g. another object's canonical path.
    Text(String),
}

/// Walk `project` and return the completed id assignments. Sibling projects
/// reached through container item proxies are materialized via `cache`.
pub fn walk(project: &Project, cache: &SubprojectCache) -> Result<ResultStore> {
    let mut store = ResultStore::new();
    let root_key = md5_hex(&project.root_name);
    store.assign(
        &project.root_id,
        project.root_name.clone(),
        root_key,
        &project.root_object().isa,
    );
    Walker {
        project,
        store: &mut store,
        cache,
    }
    .unique_project()?;
    Ok(store)
}

struct Walker<'a> {
    project: &'a Project,
    store: &'a mut ResultStore,
    cache: &'a SubprojectCache,
}

impl<'a> Walker<'a> {
    /// Derive the child's path under its parent, hash it, and record the
    /// assignment. Returns the final new id, or None when the parent was
    /// never walked (the subtree is skipped with a warning).
    fn set_to_result(&mut self, parent_id: &str, id: &str, key: PathKey<'_>) -> Option<String> {
        let node = self.project.object(id)?;
        let local = match key {
            PathKey::Attr(attr) => node
                .attr_text(attr)
                .map(|text| text.into_owned())
                .unwrap_or_else(|| attr.to_string()),
            PathKey::Join(attrs) => attrs
                .iter()
                .map(|attr| {
                    node.attr_text(attr)
                        .map(|text| text.into_owned())
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
                .join("/"),
            PathKey::Text(text) => text,
        };
        let Some(parent_path) = self.store.path_of(parent_id).map(str::to_string) else {
            self.store.warn(format!(
                "object '{}' hangs off '{}' which was never reached from the project root; skipped",
                id, parent_id
            ));
            return None;
        };
        let child_path = format!("{}/{}", parent_path, local);
        let canonical = format!("{}[{}]", node.isa, child_path);
        let new_key = md5_hex(&child_path);
        let isa = node.isa.clone();
        Some(self.store.assign(id, canonical, new_key, &isa))
    }

    fn unique_project(&mut self) -> Result<()> {
        debug!("uniquify PBXProject");
        let project = self.project;
        let root = project.root_object();
        let root_id = project.root_id.clone();

        debug!("uniquify PBX*Group and PBX*Reference*");
        if let Some(main_group) = root.get_str("mainGroup") {
            self.unique_group_or_ref(&root_id, main_group)?;
        }
        debug!("uniquify XCConfigurationList");
        if let Some(list) = root.get_str("buildConfigurationList") {
            self.unique_configuration_list(&root_id, list);
        }
        if let Some(references) = root.get_array("projectReferences") {
            debug!("uniquify subproject references");
            for reference in references {
                let product_group = reference.get("ProductGroup").and_then(|v| v.as_str());
                let project_ref = reference.get("ProjectRef").and_then(|v| v.as_str());
                if let (Some(product_group), Some(project_ref)) = (product_group, project_ref) {
                    self.unique_group_or_ref(project_ref, product_group)?;
                }
            }
        }

        let targets: Vec<&str> = root
            .get_array("targets")
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        // Pre-assign every target first: a PBXTargetDependency may name a
        // target the walk has not descended into yet.
        for target_id in &targets {
            if project.object(target_id).is_some() {
                self.set_to_result(&root_id, target_id, PathKey::Join(&["productName", "name"]));
            } else {
                self.store.mark_removed(target_id);
            }
        }
        for target_id in &targets {
            if project.object(target_id).is_some() {
                self.unique_target(target_id)?;
            }
        }
        Ok(())
    }

    fn unique_group_or_ref(&mut self, parent_id: &str, id: &str) -> Result<()> {
        let project = self.project;
        let Some(node) = project.object(id) else {
            debug!("group/reference '{}' not found, it will be removed", id);
            self.store.mark_removed(id);
            return Ok(());
        };
        let key = if node.has_text("name") {
            PathKey::Attr("name")
        } else if node.has_text("path") {
            PathKey::Attr("path")
        } else if node.kind().is_some_and(|k| k.is_file_tree()) {
            // A main group carries neither name nor path
            PathKey::Text("PBXRootGroup".to_string())
        } else {
            // Unknown kinds are opaque leaves keyed by their own isa
            PathKey::Text(node.isa.clone())
        };
        if self.set_to_result(parent_id, id, key).is_none() {
            return Ok(());
        }
        if let Some(children) = node.get_array("children") {
            for child in children {
                if let Some(child_id) = child.as_str() {
                    self.unique_group_or_ref(id, child_id)?;
                }
            }
        }
        if node.kind() == Some(Isa::PBXReferenceProxy) {
            if let Some(remote_ref) = node.get_str("remoteRef") {
                self.unique_container_item_proxy(parent_id, remote_ref)?;
            }
        }
        Ok(())
    }

    fn unique_configuration_list(&mut self, parent_id: &str, list_id: &str) {
        let project = self.project;
        let Some(node) = project.object(list_id) else {
            self.store.mark_removed(list_id);
            return;
        };
        self.set_to_result(parent_id, list_id, PathKey::Attr("defaultConfigurationName"));
        debug!("uniquify XCBuildConfiguration");
        if let Some(configurations) = node.get_array("buildConfigurations") {
            for configuration in configurations {
                let Some(config_id) = configuration.as_str() else { continue };
                if project.object(config_id).is_some() {
                    self.set_to_result(list_id, config_id, PathKey::Attr("name"));
                } else {
                    self.store.mark_removed(config_id);
                }
            }
        }
    }

    fn unique_target(&mut self, target_id: &str) -> Result<()> {
        debug!("uniquify PBX*Target");
        let project = self.project;
        let Some(node) = project.object(target_id) else {
            return Ok(());
        };
        if let Some(list) = node.get_str("buildConfigurationList") {
            self.unique_configuration_list(target_id, list);
        }
        if let Some(dependencies) = node.get_array("dependencies") {
            debug!("uniquify PBXTargetDependency");
            for dependency in dependencies {
                if let Some(dep_id) = dependency.as_str() {
                    self.unique_target_dependency(target_id, dep_id)?;
                }
            }
        }
        if let Some(phases) = node.get_array("buildPhases") {
            for phase in phases {
                if let Some(phase_id) = phase.as_str() {
                    self.unique_build_phase(target_id, phase_id);
                }
            }
        }
        if let Some(rules) = node.get_array("buildRules") {
            for rule in rules {
                if let Some(rule_id) = rule.as_str() {
                    self.unique_build_rule(target_id, rule_id);
                }
            }
        }
        Ok(())
    }

    fn unique_target_dependency(&mut self, parent_id: &str, dep_id: &str) -> Result<()> {
        let project = self.project;
        let Some(node) = project.object(dep_id) else {
            self.store.mark_removed(dep_id);
            return Ok(());
        };
        let key = match node.get_str("target").filter(|t| !t.is_empty()) {
            Some(target_id) => match self.store.path_of(target_id) {
                Some(path) => PathKey::Text(path.to_string()),
                None => {
                    debug!(
                        "dependency '{}' names unknown target '{}', keyed by name instead",
                        dep_id, target_id
                    );
                    PathKey::Attr("name")
                }
            },
            None => PathKey::Attr("name"),
        };
        self.set_to_result(parent_id, dep_id, key);
        match node.get_str("targetProxy") {
            Some(proxy_id) => self.unique_container_item_proxy(dep_id, proxy_id),
            None => Err(Error::BrokenDependency(dep_id.to_string())),
        }
    }

    fn unique_container_item_proxy(&mut self, parent_id: &str, proxy_id: &str) -> Result<()> {
        debug!("uniquify PBXContainerItemProxy");
        let project = self.project;
        let Some(node) = project.object(proxy_id) else {
            self.store.mark_removed(proxy_id);
            return Ok(());
        };
        let Some(proxy_key) = self.set_to_result(parent_id, proxy_id, PathKey::Join(&["isa", "remoteInfo"]))
        else {
            return Ok(());
        };
        let parent_key = self
            .store
            .new_key_of(parent_id)
            .unwrap_or(parent_id)
            .to_string();
        let not_needed = format!(
            "PBXTargetDependency '{}' and its child PBXContainerItemProxy '{}' are not needed anymore, please remove their sections manually",
            parent_key, proxy_key
        );

        let Some(remote_id) = node.get_str("remoteGlobalIDString") else {
            self.store.warn(not_needed);
            return Ok(());
        };
        if self.store.contains(remote_id) {
            return Ok(());
        }
        let Some(portal_id) = node.get_str("containerPortal") else {
            self.store.warn(not_needed);
            return Ok(());
        };
        if self.store.path_of(portal_id).is_none() {
            self.store.warn(not_needed);
            return Ok(());
        }
        let Some(portal) = project.object(portal_id) else {
            return Ok(());
        };
        // A portal without a path is the project itself: in-project remote
        // ids resolve through the local result map, nothing to do here.
        let Some(relative) = portal.get_str("path").filter(|p| !p.is_empty()) else {
            return Ok(());
        };
        let sibling_path = paths::sibling_project(&project.xcodeproj_path, relative);
        if sibling_path == project.xcodeproj_path {
            return Ok(());
        }
        let Some(info) = node.get_str("remoteInfo") else {
            self.store.warn(not_needed);
            return Ok(());
        };

        let Some(sibling) = self.cache.materialize(&sibling_path)? else {
            self.store.warn(format!(
                "project reference cycle through \"{}\"; '{}' not uniquified",
                sibling_path.display(),
                remote_id
            ));
            self.store.set_remote(remote_id, remote_id.to_string());
            return Ok(());
        };
        match proxy_type(node) {
            Some(1) => {
                let new_key = sibling
                    .target_new_key(info)
                    .unwrap_or_else(|| remote_id.to_string());
                self.store.set_remote(remote_id, new_key);
            }
            Some(2) => {
                let new_key = sibling
                    .product_new_key(info)
                    .unwrap_or_else(|| remote_id.to_string());
                self.store.set_remote(remote_id, new_key);
            }
            _ => {
                self.store.warn(format!(
                    "PBXContainerItemProxy '{}' has unsupported proxyType; not uniquified",
                    remote_id
                ));
                self.store.set_remote(remote_id, remote_id.to_string());
            }
        }
        Ok(())
    }

    fn unique_build_phase(&mut self, parent_id: &str, phase_id: &str) {
        debug!("uniquify PBX*BuildPhase");
        let project = self.project;
        let Some(node) = project.object(phase_id) else {
            self.store.mark_removed(phase_id);
            return;
        };
        let key = match node.kind() {
            Some(Isa::PBXShellScriptBuildPhase) => PathKey::Attr("shellScript"),
            Some(Isa::PBXCopyFilesBuildPhase) => {
                if node.has_text("name") {
                    PathKey::Join(&["name", "dstSubfolderSpec", "dstPath"])
                } else {
                    PathKey::Join(&["dstSubfolderSpec", "dstPath"])
                }
            }
            // Other phase kinds carry no distinguishing attribute
            _ => PathKey::Text(node.isa.clone()),
        };
        self.set_to_result(parent_id, phase_id, key);
        debug!("uniquify PBXBuildFile");
        if let Some(files) = node.get_array("files") {
            for file in files {
                if let Some(file_id) = file.as_str() {
                    self.unique_build_file(phase_id, file_id);
                }
            }
        }
    }

    fn unique_build_file(&mut self, parent_id: &str, file_id: &str) {
        let project = self.project;
        let Some(node) = project.object(file_id) else {
            self.store.mark_removed(file_id);
            return;
        };
        let Some(file_ref) = node.get_str("fileRef").filter(|r| !r.is_empty()) else {
            debug!("PBXBuildFile '{}' has no fileRef, it will be removed", file_id);
            self.store.mark_removed(file_id);
            return;
        };
        match self.store.path_of(file_ref).map(str::to_string) {
            Some(ref_path) => {
                self.set_to_result(parent_id, file_id, PathKey::Text(ref_path));
            }
            None => {
                debug!(
                    "fileRef '{}' of PBXBuildFile '{}' is dangling, both will be removed",
                    file_ref, file_id
                );
                self.store.mark_removed(file_id);
                self.store.mark_removed(file_ref);
            }
        }
    }

    fn unique_build_rule(&mut self, parent_id: &str, rule_id: &str) {
        let project = self.project;
        let Some(node) = project.object(rule_id) else {
            debug!("PBXBuildRule '{}' not found, it will be removed", rule_id);
            self.store.mark_removed(rule_id);
            return;
        };
        let key = if node.get_str("fileType") == Some("pattern.proxy") {
            PathKey::Join(&["fileType", "filePatterns"])
        } else {
            PathKey::Attr("fileType")
        };
        self.set_to_result(parent_id, rule_id, key);
    }
}

/// `proxyType` is written unquoted (an integer), but tolerate a quoted one.
fn proxy_type(node: &crate::objects::PbxObject) -> Option<i64> {
    let value = node.get("proxyType")?;
    value
        .as_integer()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
