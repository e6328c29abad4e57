// src/utf8.rs
//! Minimal UTF-8 helpers for rune-level reads.

/// Longest UTF-8 encoding of a single scalar value.
pub(crate) const UTF_MAX: usize = 4;

/// Bytes below this value encode themselves.
pub(crate) const RUNE_SELF: u8 = 0x80;

/// Returns `true` when `bytes` starts with a complete encoding, or with a
/// sequence that can never become valid (which decodes as one invalid byte).
pub(crate) fn full_rune(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(UTF_MAX)];
    match std::str::from_utf8(head) {
        Ok(s) => !s.is_empty(),
        Err(e) => e.valid_up_to() > 0 || e.error_len().is_some(),
    }
}

/// Decodes the first scalar value in `bytes`.
///
/// An invalid or truncated encoding yields `U+FFFD` with width 1.
pub(crate) fn decode_rune(bytes: &[u8]) -> (char, usize) {
    let head = &bytes[..bytes.len().min(UTF_MAX)];
    let valid = match std::str::from_utf8(head) {
        Ok(s) => s,
        // The prefix up to `valid_up_to` is valid UTF-8 by construction.
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default(),
    };
    match valid.chars().next() {
        Some(c) => (c, c.len_utf8()),
        None => (char::REPLACEMENT_CHARACTER, 1),
    }
}
