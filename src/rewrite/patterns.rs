//! Hand-rolled recognizers for the handful of line shapes the rewriters
//! care about. Lines are examined with their terminators still attached, so
//! end-of-line lookaheads see the newline like any other whitespace.

/// 24-char ids use the uppercase alphanumeric alphabet.
fn is_id24_byte(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_uppercase()
}

/// 32-char ids are strictly uppercase hex (our own MD5 output).
fn is_hex_byte(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

fn is_boundary(b: u8) -> bool {
    b == b';' || b.is_ascii_whitespace()
}

fn indent_len(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

pub fn leading_ws(line: &str) -> &str {
    &line[..indent_len(line)]
}

/// Whitespace-only (or empty) line.
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b.is_ascii_whitespace())
}

/// All id tokens on the line: a 24-char `[0-9A-Z]` or 32-char `[0-9A-F]`
/// run, preceded by whitespace and followed by whitespace or `;`. Scans
/// left to right without overlap, trying the short width first.
pub fn scan_ids(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut ids = Vec::new();
    let mut i = 1;
    while i < bytes.len() {
        if !bytes[i - 1].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        match id_width_at(bytes, i) {
            Some(width) => {
                ids.push(&line[i..i + width]);
                i += width;
            }
            None => i += 1,
        }
    }
    ids
}

fn id_width_at(bytes: &[u8], at: usize) -> Option<usize> {
    if at + 24 < bytes.len()
        && bytes[at..at + 24].iter().all(|b| is_id24_byte(*b))
        && is_boundary(bytes[at + 24])
    {
        return Some(24);
    }
    if at + 32 < bytes.len()
        && bytes[at..at + 32].iter().all(|b| is_hex_byte(*b))
        && is_boundary(bytes[at + 32])
    {
        return Some(32);
    }
    None
}

/// `/* Begin <name> section */`: returns the section name.
pub fn section_begin(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches([' ', '\t']).strip_prefix("/*")?;
    let rest = rest.trim_start_matches([' ', '\t']).strip_prefix("Begin ")?;
    let end = rest.rfind(" section")?;
    (end > 0).then_some(&rest[..end])
}

/// `/* End <name> section */` for a specific section name.
pub fn section_end(line: &str, name: &str) -> bool {
    let Some(rest) = line.trim_start_matches([' ', '\t']).strip_prefix("/*") else {
        return false;
    };
    let Some(rest) = rest.trim_start_matches([' ', '\t']).strip_prefix("End ") else {
        return false;
    };
    match rest.strip_prefix(name) {
        Some(rest) => rest.starts_with(" section"),
        None => false,
    }
}

/// `<indent><keyword> = (` with nothing else on the line: returns the
/// indent. Used with keywords `files` and `children`.
pub fn array_begin<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let indent = leading_ws(line);
    let rest = line[indent.len()..].strip_prefix(keyword)?;
    let rest = rest.strip_prefix(" = (")?;
    is_blank(rest).then_some(indent)
}

/// `<indent>);` with exactly the given indent.
pub fn closes_array(line: &str, indent: &str) -> bool {
    line.strip_prefix(indent)
        .and_then(|rest| rest.strip_prefix(");"))
        .is_some_and(is_blank)
}

/// `<indent>};` with exactly the given indent.
pub fn closes_item(line: &str, indent: &str) -> bool {
    line.strip_prefix(indent)
        .and_then(|rest| rest.strip_prefix("};"))
        .is_some_and(is_blank)
}

/// The opening line of a section object:
/// `<indent><id> /* <name> */ = {`, possibly closed with `};` on the same
/// line (a one-line object), possibly without the comment.
#[derive(Debug, PartialEq)]
pub struct ItemStart<'a> {
    pub indent: &'a str,
    pub id: &'a str,
    pub name: Option<&'a str>,
    pub oneline: bool,
}

pub fn section_item(line: &str) -> Option<ItemStart<'_>> {
    let indent = leading_ws(line);
    let rest = &line[indent.len()..];

    let run = rest.bytes().take_while(|b| is_id24_byte(*b)).count();
    let id = &rest[..run];
    let valid = run == 24 || (run == 32 && id.bytes().all(is_hex_byte));
    if !valid {
        return None;
    }
    let rest = &rest[run..];

    let ws = rest.bytes().take_while(|b| b.is_ascii_whitespace()).count();
    if ws == 0 {
        return None;
    }
    let mut rest = &rest[ws..];

    let mut name = None;
    if let Some(after) = rest.strip_prefix("/* ") {
        let end = after.find(" */")?;
        if end == 0 {
            return None;
        }
        name = Some(&after[..end]);
        rest = &after[end + 3..];
    }

    let rest = rest.trim_start_matches([' ', '\t']).strip_prefix('=')?;
    let rest = rest.trim_start_matches([' ', '\t']).strip_prefix('{')?;

    let tail = rest.trim_end_matches(|c: char| c.is_ascii_whitespace());
    let oneline = if tail.is_empty() {
        false
    } else if tail.len() >= 3 && tail.ends_with("};") {
        true
    } else {
        return None;
    };

    Some(ItemStart {
        indent,
        id,
        name,
        oneline,
    })
}

/// Member of a `files` array: name between `<id> /* ` and ` in `.
pub fn file_entry_name(line: &str) -> Option<&str> {
    entry_name(line, " in ")
}

/// Member of a `children` array: name between `<id> /* ` and ` */`.
pub fn child_entry_name(line: &str) -> Option<&str> {
    entry_name(line, " */")
}

fn entry_name<'a>(line: &'a str, terminator: &str) -> Option<&'a str> {
    let bytes = line.as_bytes();
    let mut search = 0;
    while let Some(found) = line[search..].find(" /* ") {
        let at = search + found;
        if at >= 24 && bytes[at - 24..at].iter().all(|b| is_id24_byte(*b)) {
            let rest = &line[at + 4..];
            if let Some(end) = rest.get(1..).and_then(|r| r.find(terminator)) {
                return Some(&rest[..end + 1]);
            }
            search = at + 4;
        } else {
            search = at + 1;
        }
    }
    None
}
