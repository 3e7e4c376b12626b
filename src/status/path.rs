//! Git's C-style path quoting.
//!
//! Listings wrap a path in double quotes when it contains characters git
//! considers unusual (spaces in `status`, control characters, quotes,
//! backslashes, and non-ASCII unless `core.quotePath` is off). Inside the
//! quotes, `\n`-style escapes and `\ooo` octal bytes are used.

use std::borrow::Cow;

/// Decode a path as printed by git. Unquoted paths are returned untouched.
pub fn unquote_path(raw: &str) -> Cow<'_, str> {
    let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return Cow::Borrowed(raw);
    };

    let input = inner.as_bytes();
    let mut bytes = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        i += 1;
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }

        let Some(&escape) = input.get(i) else {
            bytes.push(b'\\');
            break;
        };
        i += 1;

        let decoded = match escape {
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'0'..=b'7' => {
                // up to three octal digits, the first already consumed
                let end = (i + 2).min(input.len());
                let mut value = u32::from(escape - b'0');
                while i < end && matches!(input[i], b'0'..=b'7') {
                    value = value * 8 + u32::from(input[i] - b'0');
                    i += 1;
                }
                (value & 0xff) as u8
            }
            // `\\` and `\"`
            other => other,
        };
        bytes.push(decoded);
    }

    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}
