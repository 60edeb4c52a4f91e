//! Stack-driven structural sorting of the project text.
//!
//! The file's line grammar is regular enough to reorder without a full
//! parse, which is what keeps the round trip byte-faithful: comments,
//! indentation and unrecognized regions are never touched. Two stacked
//! concerns drive the rewrite: the top handler frame consumes the next
//! line, and buffered object frames capture nested output until they close.

use std::collections::HashSet;

use crate::error::{Error, Result};

use super::patterns;

/// Sections whose objects are buffered and re-emitted in sorted order.
const SORTED_SECTIONS: &[&str] = &[
    "PBXGroup",
    "PBXFileReference",
    "PBXBuildFile",
    "PBXContainerItemProxy",
    "PBXReferenceProxy",
    "PBXNativeTarget",
    "PBXTargetDependency",
    "PBXSourcesBuildPhase",
    "PBXFrameworksBuildPhase",
    "PBXResourcesBuildPhase",
    "PBXCopyFilesBuildPhase",
    "PBXShellScriptBuildPhase",
    "XCBuildConfiguration",
    "XCConfigurationList",
    "XCVersionGroup",
    "PBXVariantGroup",
    "PBXProject",
];

/// Sections that switch to the display-name key under `--sort-pbx-by-filename`.
const NAME_KEYED_SECTIONS: &[&str] = &["PBXFileReference", "PBXBuildFile"];

#[derive(Debug)]
pub struct SortOutcome {
    pub output: String,
    /// Exact duplicate array entries that were dropped.
    pub removed_lines: Vec<String>,
}

struct SectionFrame {
    name: String,
    key_by_name: bool,
    /// (sort key, full object text) per contained object.
    items: Vec<(String, String)>,
}

struct ItemFrame {
    key: String,
    indent: String,
    buf: String,
    sort_children: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArrayKind {
    Files,
    Children,
}

struct ArrayEntry {
    key: String,
    /// `children` order directories (no dot in the name) before files.
    dotted: bool,
    line: String,
}

struct ArrayFrame {
    kind: ArrayKind,
    indent: String,
    entries: Vec<ArrayEntry>,
}

enum Frame {
    Section(SectionFrame),
    Item(ItemFrame),
    Array(ArrayFrame),
}

/// Sort `content` and return the rewritten text. `pinned_groups` holds the
/// ids of `projectReferences[*].ProductGroup` groups, whose `children`
/// order is significant to Xcode and must survive untouched.
pub fn sort_content(
    content: &str,
    by_filename: bool,
    pinned_groups: &HashSet<String>,
) -> Result<SortOutcome> {
    let mut sorter = Sorter {
        out: String::with_capacity(content.len()),
        removed: Vec::new(),
        stack: Vec::new(),
        by_filename,
        pinned: pinned_groups,
    };
    for line in content.split_inclusive('\n') {
        sorter.handle(line)?;
    }
    if !sorter.stack.is_empty() {
        return Err(Error::UnexpectedLine(
            "unexpected end of file inside an unterminated section, object, or array".to_string(),
        ));
    }
    Ok(SortOutcome {
        output: sorter.out,
        removed_lines: sorter.removed,
    })
}

struct Sorter<'a> {
    out: String,
    removed: Vec<String>,
    stack: Vec<Frame>,
    by_filename: bool,
    pinned: &'a HashSet<String>,
}

impl Sorter<'_> {
    /// Emit text to the innermost buffered object, or to the output when no
    /// object is being captured.
    fn write(&mut self, text: &str) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Item(item) = frame {
                item.buf.push_str(text);
                return;
            }
        }
        self.out.push_str(text);
    }

    fn handle(&mut self, line: &str) -> Result<()> {
        match self.stack.last() {
            None => self.handle_global(line),
            Some(Frame::Section(_)) => self.handle_section(line),
            Some(Frame::Item(_)) => self.handle_item(line),
            Some(Frame::Array(_)) => self.handle_array(line),
        }
    }

    fn handle_global(&mut self, line: &str) -> Result<()> {
        if let Some(name) = patterns::section_begin(line) {
            let name = name.to_string();
            self.write(line);
            if SORTED_SECTIONS.contains(&name.as_str()) {
                let key_by_name = self.by_filename && NAME_KEYED_SECTIONS.contains(&name.as_str());
                self.stack.push(Frame::Section(SectionFrame {
                    name,
                    key_by_name,
                    items: Vec::new(),
                }));
            }
            return Ok(());
        }
        if self.try_open_array(line) {
            return Ok(());
        }
        self.write(line);
        Ok(())
    }

    fn try_open_array(&mut self, line: &str) -> bool {
        for (keyword, kind) in [("files", ArrayKind::Files), ("children", ArrayKind::Children)] {
            if let Some(indent) = patterns::array_begin(line, keyword) {
                let indent = indent.to_string();
                self.write(line);
                self.stack.push(Frame::Array(ArrayFrame {
                    kind,
                    indent,
                    entries: Vec::new(),
                }));
                return true;
            }
        }
        false
    }

    fn handle_section(&mut self, line: &str) -> Result<()> {
        let (at_end, key_by_name) = match self.stack.last() {
            Some(Frame::Section(section)) => {
                (patterns::section_end(line, &section.name), section.key_by_name)
            }
            _ => unreachable!("handle_section called without a section frame"),
        };

        if at_end {
            let Some(Frame::Section(mut section)) = self.stack.pop() else {
                unreachable!("section frame checked above")
            };
            section.items.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, text) in &section.items {
                self.write(text);
            }
            self.write(line);
            return Ok(());
        }

        if let Some(item) = patterns::section_item(line) {
            let key = if key_by_name {
                item.name.unwrap_or("").to_string()
            } else {
                item.id.to_string()
            };
            if item.oneline {
                match self.stack.last_mut() {
                    Some(Frame::Section(section)) => section.items.push((key, line.to_string())),
                    _ => unreachable!("section frame checked above"),
                }
            } else {
                let sort_children = !self.pinned.contains(item.id);
                self.stack.push(Frame::Item(ItemFrame {
                    key,
                    indent: item.indent.to_string(),
                    buf: line.to_string(),
                    sort_children,
                }));
            }
            return Ok(());
        }

        if patterns::is_blank(line) {
            return Ok(());
        }
        Err(Error::UnexpectedLine(line.to_string()))
    }

    fn handle_item(&mut self, line: &str) -> Result<()> {
        let (closes, sort_children) = match self.stack.last() {
            Some(Frame::Item(item)) => (patterns::closes_item(line, &item.indent), item.sort_children),
            _ => unreachable!("handle_item called without an item frame"),
        };

        if closes {
            // The closing line belongs to the item's own buffer
            self.write(line);
            let Some(Frame::Item(item)) = self.stack.pop() else {
                unreachable!("item frame checked above")
            };
            match self.stack.last_mut() {
                Some(Frame::Section(section)) => section.items.push((item.key, item.buf)),
                _ => unreachable!("item frames only live inside sections"),
            }
            return Ok(());
        }

        if sort_children && self.try_open_array(line) {
            return Ok(());
        }
        self.write(line);
        Ok(())
    }

    fn handle_array(&mut self, line: &str) -> Result<()> {
        let (closes, kind) = match self.stack.last() {
            Some(Frame::Array(array)) => (patterns::closes_array(line, &array.indent), array.kind),
            _ => unreachable!("handle_array called without an array frame"),
        };

        if closes {
            let Some(Frame::Array(mut array)) = self.stack.pop() else {
                unreachable!("array frame checked above")
            };
            match array.kind {
                ArrayKind::Files => array.entries.sort_by(|a, b| a.key.cmp(&b.key)),
                ArrayKind::Children => array
                    .entries
                    .sort_by(|a, b| (a.dotted, &a.key).cmp(&(b.dotted, &b.key))),
            }
            for entry in &array.entries {
                self.write(&entry.line);
            }
            self.write(line);
            return Ok(());
        }

        let name = match kind {
            ArrayKind::Files => patterns::file_entry_name(line),
            ArrayKind::Children => patterns::child_entry_name(line),
        };
        if let Some(name) = name {
            let name = name.to_string();
            let Some(Frame::Array(array)) = self.stack.last_mut() else {
                unreachable!("array frame checked above")
            };
            if array.entries.iter().any(|entry| entry.line == line) {
                self.removed.push(line.to_string());
            } else {
                let dotted = name.contains('.');
                array.entries.push(ArrayEntry {
                    key: name,
                    dotted,
                    line: line.to_string(),
                });
            }
            return Ok(());
        }

        if patterns::is_blank(line) {
            return Ok(());
        }
        Err(Error::UnexpectedLine(line.to_string()))
    }
}
