use std::fmt;
use std::str::FromStr;

/// The object kinds the normalizer derives canonical paths for.
///
/// Every object in a .pbxproj file carries an `isa` tag. Kinds outside this
/// set are treated as opaque leaves during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Isa {
    PBXProject,
    PBXGroup,
    PBXVariantGroup,
    XCVersionGroup,
    PBXFileReference,
    PBXReferenceProxy,
    PBXBuildFile,
    PBXNativeTarget,
    PBXAggregateTarget,
    PBXTargetDependency,
    PBXContainerItemProxy,
    XCConfigurationList,
    XCBuildConfiguration,
    PBXSourcesBuildPhase,
    PBXFrameworksBuildPhase,
    PBXResourcesBuildPhase,
    PBXCopyFilesBuildPhase,
    PBXHeadersBuildPhase,
    PBXShellScriptBuildPhase,
    PBXBuildRule,
}

impl Isa {
    /// Kinds that live in the group/file-reference tree and derive their
    /// local key from `name`, then `path`, then the root-group fallback.
    pub fn is_file_tree(&self) -> bool {
        matches!(
            self,
            Isa::PBXGroup
                | Isa::PBXVariantGroup
                | Isa::XCVersionGroup
                | Isa::PBXFileReference
                | Isa::PBXReferenceProxy
        )
    }

    pub fn is_build_phase(&self) -> bool {
        matches!(
            self,
            Isa::PBXSourcesBuildPhase
                | Isa::PBXFrameworksBuildPhase
                | Isa::PBXResourcesBuildPhase
                | Isa::PBXCopyFilesBuildPhase
                | Isa::PBXHeadersBuildPhase
                | Isa::PBXShellScriptBuildPhase
        )
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Isa::PBXNativeTarget | Isa::PBXAggregateTarget)
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Isa::PBXProject => "PBXProject",
            Isa::PBXGroup => "PBXGroup",
            Isa::PBXVariantGroup => "PBXVariantGroup",
            Isa::XCVersionGroup => "XCVersionGroup",
            Isa::PBXFileReference => "PBXFileReference",
            Isa::PBXReferenceProxy => "PBXReferenceProxy",
            Isa::PBXBuildFile => "PBXBuildFile",
            Isa::PBXNativeTarget => "PBXNativeTarget",
            Isa::PBXAggregateTarget => "PBXAggregateTarget",
            Isa::PBXTargetDependency => "PBXTargetDependency",
            Isa::PBXContainerItemProxy => "PBXContainerItemProxy",
            Isa::XCConfigurationList => "XCConfigurationList",
            Isa::XCBuildConfiguration => "XCBuildConfiguration",
            Isa::PBXSourcesBuildPhase => "PBXSourcesBuildPhase",
            Isa::PBXFrameworksBuildPhase => "PBXFrameworksBuildPhase",
            Isa::PBXResourcesBuildPhase => "PBXResourcesBuildPhase",
            Isa::PBXCopyFilesBuildPhase => "PBXCopyFilesBuildPhase",
            Isa::PBXHeadersBuildPhase => "PBXHeadersBuildPhase",
            Isa::PBXShellScriptBuildPhase => "PBXShellScriptBuildPhase",
            Isa::PBXBuildRule => "PBXBuildRule",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Isa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PBXProject" => Ok(Isa::PBXProject),
            "PBXGroup" => Ok(Isa::PBXGroup),
            "PBXVariantGroup" => Ok(Isa::PBXVariantGroup),
            "XCVersionGroup" => Ok(Isa::XCVersionGroup),
            "PBXFileReference" => Ok(Isa::PBXFileReference),
            "PBXReferenceProxy" => Ok(Isa::PBXReferenceProxy),
            "PBXBuildFile" => Ok(Isa::PBXBuildFile),
            "PBXNativeTarget" => Ok(Isa::PBXNativeTarget),
            "PBXAggregateTarget" => Ok(Isa::PBXAggregateTarget),
            "PBXTargetDependency" => Ok(Isa::PBXTargetDependency),
            "PBXContainerItemProxy" => Ok(Isa::PBXContainerItemProxy),
            "XCConfigurationList" => Ok(Isa::XCConfigurationList),
            "XCBuildConfiguration" => Ok(Isa::XCBuildConfiguration),
            "PBXSourcesBuildPhase" => Ok(Isa::PBXSourcesBuildPhase),
            "PBXFrameworksBuildPhase" => Ok(Isa::PBXFrameworksBuildPhase),
            "PBXResourcesBuildPhase" => Ok(Isa::PBXResourcesBuildPhase),
            "PBXCopyFilesBuildPhase" => Ok(Isa::PBXCopyFilesBuildPhase),
            "PBXHeadersBuildPhase" => Ok(Isa::PBXHeadersBuildPhase),
            "PBXShellScriptBuildPhase" => Ok(Isa::PBXShellScriptBuildPhase),
            "PBXBuildRule" => Ok(Isa::PBXBuildRule),
            _ => Err(format!("Unknown ISA: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let all = [
            Isa::PBXProject,
            Isa::PBXGroup,
            Isa::PBXBuildFile,
            Isa::PBXContainerItemProxy,
            Isa::PBXShellScriptBuildPhase,
            Isa::XCConfigurationList,
        ];
        for isa in &all {
            let parsed: Isa = isa.to_string().parse().unwrap();
            assert_eq!(*isa, parsed);
        }
        assert!("PBXLegacyTarget".parse::<Isa>().is_err());
    }

    #[test]
    fn test_families() {
        assert!(Isa::PBXReferenceProxy.is_file_tree());
        assert!(!Isa::PBXBuildFile.is_file_tree());
        assert!(Isa::PBXHeadersBuildPhase.is_build_phase());
        assert!(Isa::PBXAggregateTarget.is_target());
    }
}
