//! End-to-end runs over real on-disk projects.
//!
//! Fixtures live in `tests/fixtures`; each test copies what it needs into a
//! temporary directory, runs the pipeline, and inspects the rewritten file.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use pbxnorm::rewrite::patterns;
use pbxnorm::unique::md5_hex;
use pbxnorm::{Error, Normalizer};

const DEMO: &str = include_str!("fixtures/demo.pbxproj");
const APP: &str = include_str!("fixtures/app.pbxproj");
const LIB: &str = include_str!("fixtures/lib.pbxproj");

fn write_project(parent: &Path, name: &str, content: &str) -> PathBuf {
    let xcodeproj = parent.join(format!("{}.xcodeproj", name));
    fs::create_dir_all(&xcodeproj).unwrap();
    fs::write(xcodeproj.join("project.pbxproj"), content).unwrap();
    xcodeproj
}

/// Mirror of the walker's derivation rule: returns (new id, canonical path)
/// of a child, given its parent's canonical path.
fn derive(parent_canonical: &str, isa: &str, key: &str) -> (String, String) {
    let path = format!("{}/{}", parent_canonical, key);
    (md5_hex(&path), format!("{}[{}]", isa, path))
}

/// All id tokens of the original text, for closure checks on the output.
fn ids_of(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = text
        .split_inclusive('\n')
        .flat_map(|line| patterns::scan_ids(line))
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// The `children = (...)` block of the object whose line starts with `id`.
fn children_block<'a>(output: &'a str, id: &str) -> &'a str {
    let at = output.find(id).unwrap_or_else(|| panic!("id {} not in output", id));
    let open = output[at..].find("children = (").expect("children array") + at;
    let close = output[open..].find(");").expect("array close") + open;
    &output[open..close]
}

#[test]
fn test_fresh_project_gets_canonical_ids() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    let report = normalizer.uniquify().unwrap();
    assert!(report.changed);
    assert!(report.removed_lines.is_empty());
    assert!(report.warnings.is_empty());

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();

    // No original id survives
    for old in ids_of(DEMO) {
        assert!(!output.contains(&old), "old id {} still present", old);
    }

    // Spot-check ids against a hand-built mirror of the derivation rules
    let root = "Demo.xcodeproj";
    assert!(output.contains(&md5_hex(root)), "root id missing");

    let (main_group_id, main_group) = derive(root, "PBXGroup", "PBXRootGroup");
    assert!(output.contains(&main_group_id), "main group id missing");

    let (_, sources_group) = derive(&main_group, "PBXGroup", "Demo");
    let (app_delegate_id, _) = derive(&sources_group, "PBXFileReference", "AppDelegate.swift");
    assert!(output.contains(&app_delegate_id), "file reference id missing");

    let (target_id, target) = derive(root, "PBXNativeTarget", "Demo/Demo");
    assert!(output.contains(&target_id), "target id missing");

    let (config_list_id, config_list) = derive(&target, "XCConfigurationList", "Release");
    assert!(output.contains(&config_list_id));
    let (debug_config_id, _) = derive(&config_list, "XCBuildConfiguration", "Debug");
    assert!(output.contains(&debug_config_id));

    // Build phases key off their kind (or script / copy destination)
    let (sources_phase_id, sources_phase) = derive(&target, "PBXSourcesBuildPhase", "PBXSourcesBuildPhase");
    assert!(output.contains(&sources_phase_id));
    let (script_phase_id, _) = derive(&target, "PBXShellScriptBuildPhase", "echo done");
    assert!(output.contains(&script_phase_id));
    let (copy_phase_id, _) = derive(&target, "PBXCopyFilesBuildPhase", "Embed Frameworks/10/");
    assert!(output.contains(&copy_phase_id));

    // A build file keys off its file reference's canonical path
    let (_, app_delegate) = derive(&sources_group, "PBXFileReference", "AppDelegate.swift");
    let (build_file_id, _) = derive(&sources_phase, "PBXBuildFile", &app_delegate);
    assert!(output.contains(&build_file_id));
}

#[test]
fn test_sort_orders_arrays_and_sections() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    normalizer.uniquify().unwrap();
    let report = normalizer.sort(false).unwrap();
    assert!(report.changed);
    assert!(report.removed_lines.is_empty());
    assert!(normalizer.is_modified());

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();

    // files arrays are ordered by display name
    let app_delegate = output.find("AppDelegate.swift in Sources */,").unwrap();
    let view_controller = output.find("ViewController.swift in Sources */,").unwrap();
    assert!(app_delegate < view_controller);

    // children arrays are ordered lexicographically (all entries dotted here)
    let children = output.find("AppDelegate.swift */,").unwrap();
    let storyboard = output.find("Main.storyboard */,").unwrap();
    let view = output.find("ViewController.swift */,").unwrap();
    assert!(children < storyboard && storyboard < view);

    // section objects appear in non-decreasing id order
    let section_start = output.find("/* Begin PBXBuildFile section */").unwrap();
    let section_end = output.find("/* End PBXBuildFile section */").unwrap();
    let build_file_ids: Vec<&str> = output[section_start..section_end]
        .lines()
        .filter_map(|line| patterns::section_item(line).map(|item| item.id))
        .collect();
    assert_eq!(build_file_ids.len(), 3);
    let mut sorted = build_file_ids.clone();
    sorted.sort();
    assert_eq!(build_file_ids, sorted);
}

#[test]
fn test_second_run_reports_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut first = Normalizer::open(&xcodeproj).unwrap();
    first.uniquify().unwrap();
    first.sort(false).unwrap();
    assert!(first.is_modified());
    let settled = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();

    let mut second = Normalizer::open(&xcodeproj).unwrap();
    let unique = second.uniquify().unwrap();
    let sort = second.sort(false).unwrap();
    assert!(!unique.changed);
    assert!(!sort.changed);
    assert!(!second.is_modified());
    assert_eq!(
        fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap(),
        settled
    );
    // No pending-output slots left behind
    assert!(!xcodeproj.join("project.pbxproj.ubak").exists());
    assert!(!xcodeproj.join("project.pbxproj.sbak").exists());
}

#[test]
fn test_sort_by_filename_orders_build_file_sections_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    normalizer.uniquify().unwrap();
    normalizer.sort(true).unwrap();

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();
    let section_start = output.find("/* Begin PBXFileReference section */").unwrap();
    let section_end = output.find("/* End PBXFileReference section */").unwrap();
    let section = &output[section_start..section_end];
    let app_delegate = section.find("AppDelegate.swift").unwrap();
    let demo_app = section.find("Demo.app").unwrap();
    let storyboard = section.find("Main.storyboard").unwrap();
    let view_controller = section.find("ViewController.swift").unwrap();
    assert!(app_delegate < demo_app && demo_app < storyboard && storyboard < view_controller);
}

#[test]
fn test_dangling_file_ref_removes_both_lines() {
    let orphan_build_file = "\t\tBF0000000000000000000004 /* Orphan.swift in Sources */ = {isa = PBXBuildFile; fileRef = FR000000000000000000X001 /* Orphan.swift */; };\n";
    let orphan_file_ref = "\t\tFR000000000000000000X001 /* Orphan.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = Orphan.swift; sourceTree = \"<group>\"; };\n";
    let orphan_entry = "\t\t\t\tBF0000000000000000000004 /* Orphan.swift in Sources */,\n";
    let anchor = "\t\t\t\tBF0000000000000000000001 /* AppDelegate.swift in Sources */,\n";

    let content = DEMO
        .replace(
            "/* End PBXBuildFile section */",
            &format!("{}/* End PBXBuildFile section */", orphan_build_file),
        )
        .replace(
            "/* End PBXFileReference section */",
            &format!("{}/* End PBXFileReference section */", orphan_file_ref),
        )
        .replace(anchor, &format!("{}{}", anchor, orphan_entry));
    assert!(content.contains("Orphan.swift"));

    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", &content);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    let report = normalizer.uniquify().unwrap();
    assert_eq!(report.removed_lines.len(), 3);
    assert!(report.removed_lines.iter().all(|line| line.contains("Orphan.swift")));

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();
    assert!(!output.contains("Orphan.swift"));
}

#[test]
fn test_duplicate_children_entry_dropped_and_reported() {
    let line = "\t\t\t\tFR000000000000000000M001 /* Main.storyboard */,\n";
    let content = DEMO.replace(line, &format!("{}{}", line, line));

    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", &content);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    normalizer.uniquify().unwrap();
    let report = normalizer.sort(false).unwrap();
    assert_eq!(report.removed_lines.len(), 1);
    assert!(report.removed_lines[0].contains("Main.storyboard"));

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();
    assert_eq!(output.matches("Main.storyboard */,").count(), 1);
}

#[test]
fn test_cross_project_dependency_takes_sibling_ids() {
    let dir = tempfile::tempdir().unwrap();
    let app_xcodeproj = write_project(&dir.path().join("App"), "App", APP);
    let lib_xcodeproj = write_project(&dir.path().join("Lib"), "Lib", LIB);

    let mut normalizer = Normalizer::open(&app_xcodeproj).unwrap();
    let report = normalizer.uniquify().unwrap();
    assert!(report.changed);

    let output = fs::read_to_string(app_xcodeproj.join("project.pbxproj")).unwrap();

    // proxyType 1: the remote id becomes the sibling walker's target id
    let (lib_target_id, _) = derive("Lib.xcodeproj", "PBXNativeTarget", "Lib/Lib");
    assert!(output.contains(&lib_target_id));
    assert!(!output.contains("AB000000000000000000T001"));

    // proxyType 2: the remote id becomes the sibling's product reference id
    let (_, lib_main_group) = derive("Lib.xcodeproj", "PBXGroup", "PBXRootGroup");
    let (_, lib_products) = derive(&lib_main_group, "PBXGroup", "Products");
    let (lib_product_id, _) = derive(&lib_products, "PBXFileReference", "libLib.a");
    assert!(output.contains(&lib_product_id));
    assert!(!output.contains("AB000000000000000000P001"));

    // The sibling is consulted, never rewritten
    assert_eq!(
        fs::read_to_string(lib_xcodeproj.join("project.pbxproj")).unwrap(),
        LIB
    );
}

#[test]
fn test_product_group_children_stay_in_source_order() {
    let dir = tempfile::tempdir().unwrap();
    let app_xcodeproj = write_project(&dir.path().join("App"), "App", APP);
    write_project(&dir.path().join("Lib"), "Lib", LIB);

    let mut normalizer = Normalizer::open(&app_xcodeproj).unwrap();
    normalizer.uniquify().unwrap();
    normalizer.sort(false).unwrap();

    let output = fs::read_to_string(app_xcodeproj.join("project.pbxproj")).unwrap();

    // The referenced project's product group keeps its significant order
    let (_, app_main_group) = derive("App.xcodeproj", "PBXGroup", "PBXRootGroup");
    let (_, lib_ref) = derive(&app_main_group, "PBXFileReference", "Lib.xcodeproj");
    let (pinned_group_id, _) = derive(&lib_ref, "PBXGroup", "Products");
    let pinned = children_block(&output, &pinned_group_id);
    assert!(pinned.find("zzz.a").unwrap() < pinned.find("libLib.a").unwrap());

    // A sibling group is still sorted: directories first, then dotted names
    let (main_group_id, _) = derive("App.xcodeproj", "PBXGroup", "PBXRootGroup");
    let root_children = children_block(&output, &main_group_id);
    let app = root_children.find("/* App */").unwrap();
    let products = root_children.find("/* Products */").unwrap();
    let lib = root_children.find("/* Lib.xcodeproj */").unwrap();
    assert!(app < products && products < lib);
}

#[test]
fn test_sort_only_run_keeps_original_ids() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    let report = normalizer.sort(false).unwrap();
    assert!(report.changed);
    assert!(normalizer.is_modified());

    let output = fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();
    // Ids untouched, arrays reordered
    assert!(output.contains("BF0000000000000000000001"));
    let app_delegate = output.find("AppDelegate.swift in Sources */,").unwrap();
    let view_controller = output.find("ViewController.swift in Sources */,").unwrap();
    assert!(app_delegate < view_controller);
}

#[test]
fn test_broken_dependency_is_fatal_and_leaves_file_alone() {
    let content = DEMO
        .replace(
            "\t\t\tdependencies = (\n\t\t\t);\n",
            "\t\t\tdependencies = (\n\t\t\t\tDP000000000000000000D001 /* PBXTargetDependency */,\n\t\t\t);\n",
        )
        .replace(
            "/* Begin PBXProject section */",
            "/* Begin PBXTargetDependency section */\n\t\tDP000000000000000000D001 /* PBXTargetDependency */ = {\n\t\t\tisa = PBXTargetDependency;\n\t\t\tname = Demo;\n\t\t};\n/* End PBXTargetDependency section */\n\n/* Begin PBXProject section */",
        );
    assert!(content.contains("DP000000000000000000D001"));

    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", &content);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    let error = normalizer.uniquify().unwrap_err();
    assert!(matches!(error, Error::BrokenDependency(_)));
    assert!(error.to_string().contains("targetProxy"));

    // Fatal errors leak no partial output
    assert_eq!(
        fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap(),
        content
    );
    assert!(!xcodeproj.join("project.pbxproj.ubak").exists());
}

#[test]
fn test_path_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = Normalizer::open(&dir.path().join("Nope.xcodeproj")).unwrap_err();
    assert!(matches!(missing, Error::PathNotFound(_)));

    let stray = dir.path().join("notes.txt");
    fs::write(&stray, "hello").unwrap();
    let not_project = Normalizer::open(&stray).unwrap_err();
    assert!(matches!(not_project, Error::PathNotProject(_)));
}

#[test]
fn test_loader_failure_surfaces_parser_message() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Broken", "{ key = ");

    let error = Normalizer::open(&xcodeproj).unwrap_err();
    match error {
        Error::LoaderFailure { ref message, .. } => assert!(!message.is_empty()),
        other => panic!("expected LoaderFailure, got {:?}", other),
    }
}

#[test]
fn test_missing_project_name_hints_at_pods() {
    let minimal = "// !$*UTF8*$!\n{\n\tarchiveVersion = 1;\n\tclasses = {\n\t};\n\tobjectVersion = 46;\n\tobjects = {\n\t\tAA00 = {\n\t\t\tisa = PBXProject;\n\t\t};\n\t};\n\trootObject = AA00;\n}\n";
    let dir = tempfile::tempdir().unwrap();

    let pods = write_project(dir.path(), "Pods", minimal);
    let error = Normalizer::open(&pods).unwrap_err();
    assert!(matches!(error, Error::ProjectNameNotFound { pods: true, .. }));
    assert!(error.to_string().contains("xcproj"));

    let other = write_project(dir.path(), "Plain", minimal);
    let error = Normalizer::open(&other).unwrap_err();
    assert!(matches!(error, Error::ProjectNameNotFound { pods: false, .. }));
}

#[test]
fn test_debug_dump_written_next_to_project() {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = write_project(dir.path(), "Demo", DEMO);

    let mut normalizer = Normalizer::open(&xcodeproj).unwrap();
    normalizer.uniquify().unwrap();
    let dump = normalizer.dump_debug_result().unwrap();
    assert_eq!(dump, xcodeproj.join("debug_result.json"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&dump).unwrap()).unwrap();
    let entries = json.get("entries").and_then(|v| v.as_object()).unwrap();
    assert!(entries.contains_key("PR000000000000000000J001"));
}
