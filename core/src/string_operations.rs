pub fn c_string_to_str(c_string: &[u8]) -> &str {
    let end = c_string
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(c_string.len());
    std::str::from_utf8(&c_string[..end]).unwrap_or("*UNKNOWN*")
}

/// Appends `text` as a fixed-width, NUL-padded field of `len` bytes.
///
/// Longer text is truncated so the field always keeps at least one terminating NUL.
pub fn write_fixed_string(out: &mut Vec<u8>, text: &str, len: usize) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(len.saturating_sub(1));
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (len - n), 0);
}

/// Appends `text` followed by a single NUL (variable-length message bodies).
pub fn write_c_string(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(text.as_bytes());
    out.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_string_to_str() {
        let c_string = b"Hello, World!\0Extra data";
        assert_eq!(c_string_to_str(c_string), "Hello, World!");

        let c_string_no_null = b"Hello, World!";
        assert_eq!(c_string_to_str(c_string_no_null), "Hello, World!");

        let c_string_invalid_utf8 = b"Hello, \xFFWorld!\0";
        assert_eq!(c_string_to_str(c_string_invalid_utf8), "*UNKNOWN*");
    }

    #[test]
    fn fixed_string_pads_and_truncates() {
        let mut out = Vec::new();
        write_fixed_string(&mut out, "abc", 6);
        assert_eq!(out, b"abc\0\0\0");

        let mut out = Vec::new();
        write_fixed_string(&mut out, "abcdefgh", 4);
        assert_eq!(out, b"abc\0");
    }

    #[test]
    fn c_string_is_nul_terminated() {
        let mut out = vec![1u8];
        write_c_string(&mut out, "hi");
        assert_eq!(out, [1, b'h', b'i', 0]);
    }
}
