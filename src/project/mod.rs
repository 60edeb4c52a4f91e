//! Loading a project file into a flat object store.

pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::objects::PbxObject;
use crate::parser;
use crate::types::Value;

/// A loaded `project.pbxproj`: the flat id → object table plus the paths
/// and display name everything downstream keys off.
///
/// Objects are immutable once loaded; the rewriting stages work on the raw
/// text, not on this tree.
#[derive(Debug)]
pub struct Project {
    /// Absolute path of the `.xcodeproj` directory.
    pub xcodeproj_path: PathBuf,
    /// Absolute path of the `project.pbxproj` file inside it.
    pub pbxproj_path: PathBuf,
    /// Id of the root `PBXProject` object.
    pub root_id: String,
    /// `<display name>.xcodeproj`, the root of every canonical path.
    pub root_name: String,
    objects: IndexMap<String, PbxObject>,
}

impl Project {
    /// Load a project from a `.xcodeproj` directory or a `project.pbxproj`
    /// file. The path may be relative; it is absolutized lexically.
    pub fn open(target: &Path) -> Result<Self> {
        let abs = paths::absolutize(target)?;
        if !abs.exists() {
            return Err(Error::PathNotFound(abs));
        }
        let displayed = abs.as_os_str().to_string_lossy();
        let (xcodeproj_path, pbxproj_path) = if displayed.ends_with("project.pbxproj") {
            let dir = abs.parent().map(Path::to_path_buf).unwrap_or_else(|| abs.clone());
            (dir, abs.clone())
        } else if displayed.ends_with("xcodeproj") {
            let file = abs.join("project.pbxproj");
            (abs.clone(), file)
        } else {
            return Err(Error::PathNotProject(abs));
        };

        debug!("loading {}", pbxproj_path.display());
        let text = fs::read_to_string(&pbxproj_path)?;
        let tree = parser::parse(&text).map_err(|message| Error::LoaderFailure {
            path: pbxproj_path.clone(),
            message,
        })?;
        let (root_id, objects) = lift_objects(&tree, &pbxproj_path)?;
        let root_name = scan_project_name(&text, &pbxproj_path)?;

        Ok(Project {
            xcodeproj_path,
            pbxproj_path,
            root_id,
            root_name,
            objects,
        })
    }

    pub fn object(&self, id: &str) -> Option<&PbxObject> {
        self.objects.get(id)
    }

    /// The root `PBXProject` node. Existence is validated at load time.
    pub fn root_object(&self) -> &PbxObject {
        &self.objects[&self.root_id]
    }

    /// Re-read the raw file; each rewrite stage starts from current disk
    /// content, not from the text parsed at load time.
    pub fn read_text(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.pbxproj_path)?)
    }
}

/// Pull `rootObject` and the `objects` table out of the parsed tree and
/// validate that the root resolves to a `PBXProject`.
fn lift_objects(
    tree: &Value,
    pbxproj_path: &Path,
) -> Result<(String, IndexMap<String, PbxObject>)> {
    let fail = |message: String| Error::LoaderFailure {
        path: pbxproj_path.to_path_buf(),
        message,
    };

    let root_id = tree
        .get("rootObject")
        .and_then(Value::as_str)
        .ok_or_else(|| fail("missing 'rootObject'".to_string()))?
        .to_string();
    let table = tree
        .get("objects")
        .and_then(Value::as_object)
        .ok_or_else(|| fail("missing 'objects' dictionary".to_string()))?;

    let mut objects = IndexMap::with_capacity(table.len());
    for (id, props) in table {
        if let Some(props) = props.as_object() {
            objects.insert(id.clone(), PbxObject::from_props(props.clone()));
        }
    }

    match objects.get(&root_id) {
        Some(root) if root.isa == "PBXProject" => {}
        Some(root) => {
            return Err(fail(format!(
                "root object \"{}\" is not a PBXProject (isa: {})",
                root_id, root.isa
            )))
        }
        None => {
            return Err(fail(format!(
                "root object \"{}\" not found in objects",
                root_id
            )))
        }
    }

    Ok((root_id, objects))
}

/// Find the project's display name in the raw text: the first line carrying
/// a `PBXProject "<name>"` comment names the root, and the canonical root
/// path is `<name>.xcodeproj`.
fn scan_project_name(text: &str, pbxproj_path: &Path) -> Result<String> {
    const MARKER: &str = "PBXProject \"";
    for line in text.lines() {
        if let Some(idx) = line.find(MARKER) {
            let start = idx + MARKER.len();
            if let Some(end) = line.rfind('"') {
                if end >= start {
                    return Ok(format!("{}.xcodeproj", &line[start..end]));
                }
            }
        }
    }
    let pods = pbxproj_path.to_string_lossy().contains("Pods.xcodeproj");
    Err(Error::ProjectNameNotFound {
        path: pbxproj_path.to_path_buf(),
        pods,
    })
}
