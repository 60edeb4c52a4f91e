use std::io;
use std::path::PathBuf;

use thiserror::Error;

const BROKEN_HINT: &str = "\nThe file may be broken (merge conflict markers, truncated content) or stored in a non-text encoding.";
const PODS_HINT: &str = "\nThis looks like a CocoaPods project file converted to XML. Convert it back to the ASCII plist format (e.g. with 'xcproj') and retry.";

/// Everything that can go wrong while normalizing a project file.
///
/// Fatal kinds abort the run before any partial output reaches disk.
/// Non-fatal conditions are accumulated as warnings on the result store
/// instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("path \"{}\" not found", .0.display())]
    PathNotFound(PathBuf),

    #[error("path must be a '.xcodeproj' directory or a 'project.pbxproj' file: \"{}\"", .0.display())]
    PathNotProject(PathBuf),

    /// The text-to-tree conversion failed; `message` carries the parser's
    /// own output verbatim.
    #[error("failed to load \"{}\": {}{}", path.display(), message, BROKEN_HINT)]
    LoaderFailure { path: PathBuf, message: String },

    #[error("cannot find the PBXProject name in \"{}\"{}", path.display(), if *pods { PODS_HINT } else { BROKEN_HINT })]
    ProjectNameNotFound { path: PathBuf, pods: bool },

    #[error("PBXTargetDependency item \"{0}\" is invalid due to lack of \"targetProxy\" attribute")]
    BrokenDependency(String),

    #[error("unexpected line in project file:\n{0}")]
    UnexpectedLine(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
