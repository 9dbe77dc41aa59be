//! Reversible escaping for free-text row fields
//!
//! Control characters, backslashes, double quotes, and non-ASCII characters
//! are rendered as backslash escape sequences so a serialized row stays a
//! single printable ASCII line. [`unescape`] inverts [`escape`] exactly.

/// Escapes a string for embedding in a quoted row field
///
/// `\`, `"`, newline, carriage return, and tab get two-character escapes;
/// every other control or non-ASCII character becomes `\uXXXX`, or
/// `\UXXXXXXXX` for code points beyond the BMP.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (c as u32) >= 0x7f => {
                let cp = c as u32;
                if cp <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", cp));
                } else {
                    out.push_str(&format!("\\U{:08x}", cp));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`], reconstructing the original string
///
/// # Returns
///
/// * `Ok(String)` - The unescaped text
/// * `Err(String)` - Description of the malformed escape sequence
pub fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => out.push(take_code_point(&mut chars, 4)?),
            Some('U') => out.push(take_code_point(&mut chars, 8)?),
            Some(other) => return Err(format!("unknown escape sequence \\{}", other)),
            None => return Err("dangling backslash".to_string()),
        }
    }

    Ok(out)
}

/// Reads `digits` hex digits and converts them to a character
fn take_code_point(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, String> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let c = chars
            .next()
            .ok_or_else(|| "truncated escape sequence".to_string())?;
        let digit = c
            .to_digit(16)
            .ok_or_else(|| format!("invalid hex digit '{}' in escape sequence", c))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| format!("invalid code point U+{:X}", value))
}
