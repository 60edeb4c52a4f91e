/// Process escape sequences in a quoted string (quotes already stripped).
///
/// Handles the escapes the old-style plist dialect allows:
/// standard C escapes, escaped quotes and backslashes, `\Uxxxx` with four
/// hex digits, and octal escapes of one to three digits.
pub fn unescape(input: &str) -> String {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        if bytes[i] != b'\\' || i + 1 >= len {
            let ch = input[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            i += ch.len_utf8();
            continue;
        }

        match bytes[i + 1] {
            b'a' => out.push('\x07'),
            b'b' => out.push('\x08'),
            b'f' => out.push('\x0C'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'v' => out.push('\x0B'),
            b'"' => out.push('"'),
            b'\'' => out.push('\''),
            b'\\' => out.push('\\'),
            b'\n' => out.push('\n'),
            b'U' => {
                let hex = input.get(i + 2..i + 6).unwrap_or("");
                if hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    if let Some(ch) =
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    {
                        out.push(ch);
                    }
                    i += 6;
                    continue;
                }
                // Malformed \U: keep the backslash and rescan
                out.push('\\');
                i += 1;
                continue;
            }
            b'0'..=b'7' => {
                let mut code: u32 = 0;
                let mut j = i + 1;
                while j < len && j < i + 4 && (b'0'..=b'7').contains(&bytes[j]) {
                    code = code * 8 + u32::from(bytes[j] - b'0');
                    j += 1;
                }
                if let Some(ch) = char::from_u32(code) {
                    out.push(ch);
                }
                i = j;
                continue;
            }
            other => {
                // Unknown escape, keep both characters
                out.push('\\');
                out.push(other as char);
            }
        }
        i += 2;
    }

    out
}
