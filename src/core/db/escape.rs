//! Escaping Service Module
//!
//! Converts raw byte sequences into a form safe for textual embedding in
//! a statement. This is the context-free variant with the generic escape
//! rules; it needs no open connection. The connection-aware variant,
//! which honors the session's negotiated character set, lives on the
//! connection handle and goes through the driver.
//!
//! Output is at most `2 * input + 1` bytes (every byte expands to at
//! most two, plus the terminator slot the wire format reserves), and the
//! result buffer is allocated at that bound up front.

/// Escapes raw bytes with the generic rules: NUL, LF, CR, backslash,
/// both quote characters and Ctrl-Z each become a two-byte backslash
/// sequence; everything else passes through untouched.
pub fn escape_bytes(raw: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(raw.len() * 2 + 1);
    for &byte in raw {
        match byte {
            0x00 => escaped.extend_from_slice(b"\\0"),
            b'\n' => escaped.extend_from_slice(b"\\n"),
            b'\r' => escaped.extend_from_slice(b"\\r"),
            b'\\' => escaped.extend_from_slice(b"\\\\"),
            b'\'' => escaped.extend_from_slice(b"\\'"),
            b'"' => escaped.extend_from_slice(b"\\\""),
            0x1a => escaped.extend_from_slice(b"\\Z"),
            _ => escaped.push(byte),
        }
    }
    escaped
}

/// Escapes UTF-8 text with the generic rules.
///
/// Escaping inserts only ASCII and never splits a multi-byte sequence,
/// so valid UTF-8 stays valid.
pub fn escape_string(raw: &str) -> String {
    match String::from_utf8(escape_bytes(raw.as_bytes())) {
        Ok(escaped) => escaped,
        // Unreachable for valid UTF-8 input; degrade instead of panicking.
        Err(err) => String::from_utf8_lossy(&err.into_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_every_special_byte() {
        assert_eq!(escape_bytes(b"\x00"), b"\\0");
        assert_eq!(escape_bytes(b"\n"), b"\\n");
        assert_eq!(escape_bytes(b"\r"), b"\\r");
        assert_eq!(escape_bytes(b"\\"), b"\\\\");
        assert_eq!(escape_bytes(b"'"), b"\\'");
        assert_eq!(escape_bytes(b"\""), b"\\\"");
        assert_eq!(escape_bytes(b"\x1a"), b"\\Z");
    }

    #[test]
    fn test_plain_bytes_pass_through() {
        assert_eq!(escape_bytes(b"SELECT 1"), b"SELECT 1");
        assert_eq!(escape_bytes(b""), b"");
    }

    #[test]
    fn test_mixed_input() {
        assert_eq!(
            escape_string("it's a \"test\"\n"),
            "it\\'s a \\\"test\\\"\\n"
        );
    }

    #[test]
    fn test_output_bound() {
        let worst_case = b"''''\\\\\"\"";
        let escaped = escape_bytes(worst_case);
        assert!(escaped.len() <= worst_case.len() * 2 + 1);
        assert_eq!(escaped.len(), worst_case.len() * 2);
    }

    #[test]
    fn test_non_ascii_utf8_untouched() {
        assert_eq!(escape_string("héllo — wörld"), "héllo — wörld");
    }

    #[test]
    fn test_nul_inside_payload() {
        assert_eq!(escape_bytes(b"a\x00b"), b"a\\0b");
    }
}
