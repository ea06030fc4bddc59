//! Source buffer: owns a file's bytes and offers the byte-level scans every
//! later pass is built from.
use std::path::Path;

use crate::error::Error;
use crate::types::{ByteRange, NameDef};

/// Byte stored one past the logical end so forward scans can always peek.
const SENTINEL: u8 = 0;

/// Blank written over scrubbed bytes.
const BLANK: u8 = b' ';

/// Paired delimiters understood by [`SourceBuffer::find_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `<` and `>`
    Angle,
    /// `{` and `}`
    Brace,
    /// `(` and `)`
    Round,
    /// `[` and `]`
    Square,
}

impl Bracket {
    /// Opening and closing byte of the pair.
    pub const fn delimiters(self) -> (u8, u8) {
        return match self {
            Self::Angle => (b'<', b'>'),
            Self::Brace => (b'{', b'}'),
            Self::Round => (b'(', b')'),
            Self::Square => (b'[', b']'),
        };
    }
}

/// First byte of an identifier.
pub const fn is_identifier_start(byte: u8) -> bool {
    return byte.is_ascii_alphabetic() || byte == b'_';
}

/// Any byte that may continue an identifier.
pub const fn is_identifier_char(byte: u8) -> bool {
    return byte.is_ascii_alphanumeric() || byte == b'_';
}

/// Anything that cannot be part of an identifier.
pub const fn is_separator(byte: u8) -> bool {
    return !is_identifier_char(byte);
}

/// Blank, tab, newline, carriage return or form feed.
pub const fn is_whitespace(byte: u8) -> bool {
    return byte.is_ascii_whitespace();
}

/// States of the qualified-name reader.
#[derive(Debug, Clone, Copy)]
enum NameState {
    /// Whitespace after a complete identifier; only `::` may follow.
    AfterIdent,
    /// One `:` seen; a second one is needed to continue the name.
    Colon,
    /// Inside an identifier that started at `begin`.
    Ident {
        /// First byte of the identifier.
        begin: usize,
    },
    /// After `::`; an identifier is required.
    Scope,
    /// Leading whitespace before anything was read.
    Start,
}

/// A file's bytes, normalised to end in a newline and followed by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    /// Content, guaranteed final newline, then [`SENTINEL`].
    bytes: Vec<u8>,
    /// Logical length: content plus the guaranteed newline.
    len: usize,
}

impl SourceBuffer {
    /// Logical content, without the sentinel.
    pub fn as_bytes(&self) -> &[u8] {
        return self.bytes.get(..self.len).unwrap_or_default();
    }

    /// Byte at `pos`, or the sentinel at and beyond the logical end.
    pub fn byte(&self, pos: usize) -> u8 {
        if pos >= self.len {
            return SENTINEL;
        }
        return self.bytes.get(pos).copied().unwrap_or(SENTINEL);
    }

    /// Blank every non-newline byte in `range` so later passes ignore it while
    /// line numbering stays intact. Returns how many bytes the range covered.
    pub fn erase(&mut self, range: ByteRange) -> usize {
        let end = range.end.min(self.len);
        let Some(window) = self.bytes.get_mut(range.begin..end) else {
            return 0;
        };
        let count = window.len();
        for byte in window {
            if *byte != b'\n' {
                *byte = BLANK;
            }
        }
        return count;
    }

    /// Find the first opening delimiter at or after `begin` and the closing
    /// delimiter that balances it, scanning no further than `end`.
    pub fn find_pair(&self, begin: usize, end: usize, bracket: Bracket) -> Option<ByteRange> {
        let end = end.min(self.len);
        let (open, close) = bracket.delimiters();
        let start = (begin..end).find(|&i| return self.byte(i) == open)?;

        let mut depth = 0_usize;
        for i in start..end {
            let byte = self.byte(i);
            if byte == open {
                depth = depth.saturating_add(1);
            } else if byte == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(ByteRange::new(start, i.saturating_add(1)));
                }
            }
        }
        return None;
    }

    /// Wrap in-memory content, applying the same normalisation as [`Self::open`].
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        let mut bytes = content.into();
        if bytes.last() != Some(&b'\n') {
            bytes.push(b'\n');
        }
        let len = bytes.len();
        bytes.push(SENTINEL);
        return Self { bytes, len };
    }

    /// Every maximal identifier run in `[begin, end)`, left to right. Runs that
    /// start with a digit are numeric literals and are skipped.
    pub fn identifiers(&self, begin: usize, end: usize) -> Vec<NameDef> {
        let end = end.min(self.len);
        let mut found = Vec::new();
        let mut i = begin;

        while i < end {
            if is_separator(self.byte(i)) {
                i = i.saturating_add(1);
                continue;
            }
            let start = i;
            while i < end && is_identifier_char(self.byte(i)) {
                i = i.saturating_add(1);
            }
            if is_identifier_start(self.byte(start)) {
                found.push(self.name_def(ByteRange::new(start, i)));
            }
        }
        return found;
    }

    /// Whether every byte in `[begin, end)` is whitespace. Empty spans count.
    pub fn is_blank(&self, begin: usize, end: usize) -> bool {
        return self.slice(ByteRange::new(begin, end)).iter().all(|b| return is_whitespace(*b));
    }

    /// Never true for a loaded buffer: it holds at least the final newline.
    pub const fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Logical length, including the guaranteed final newline.
    pub const fn len(&self) -> usize {
        return self.len;
    }

    /// Materialise the text at `range` as a [`NameDef`].
    pub fn name_def(&self, range: ByteRange) -> NameDef {
        return NameDef::new(self.text(range), range);
    }

    /// Load a whole file.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileRead` if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read(path).map_err(|source| {
            return Error::FileRead { path: path.to_path_buf(), source };
        })?;
        return Ok(Self::from_bytes(content));
    }

    /// Read a possibly qualified name, `("::")? ident ("::" ident)*`, with
    /// whitespace allowed around `::`. Returns the segments outermost first;
    /// the last one is the simple name. A dangling `::` rejects the whole
    /// name. On success `pos` is left on the last byte of the last segment.
    pub fn read_complete_name(&self, pos: &mut usize) -> Option<Vec<NameDef>> {
        let mut segments = Vec::new();
        let mut last = *pos;
        let mut state = NameState::Start;
        let mut i = *pos;

        while i < self.len {
            let byte = self.byte(i);
            state = match state {
                NameState::Start if is_identifier_start(byte) => NameState::Ident { begin: i },
                NameState::Start if byte == b':' => NameState::Colon,
                NameState::Start | NameState::AfterIdent if is_whitespace(byte) => state,
                NameState::AfterIdent if byte == b':' => NameState::Colon,
                NameState::Start | NameState::AfterIdent => break,
                NameState::Ident { .. } if is_identifier_char(byte) => state,
                NameState::Ident { begin } => {
                    segments.push(self.name_def(ByteRange::new(begin, i)));
                    last = i.saturating_sub(1);
                    if is_whitespace(byte) {
                        NameState::AfterIdent
                    } else if byte == b':' {
                        NameState::Colon
                    } else {
                        break;
                    }
                },
                // A lone `:` is a base clause or bit-field, not part of the name.
                NameState::Colon if byte == b':' => NameState::Scope,
                NameState::Colon => break,
                NameState::Scope if is_identifier_start(byte) => NameState::Ident { begin: i },
                NameState::Scope if is_whitespace(byte) => state,
                NameState::Scope => return None,
            };
            i = i.saturating_add(1);
        }

        if matches!(state, NameState::Scope) || segments.is_empty() {
            return None;
        }
        *pos = last;
        return Some(segments);
    }

    /// Read one identifier, skipping leading whitespace. On success `pos` is
    /// left on the identifier's last byte.
    pub fn read_name(&self, pos: &mut usize) -> Option<NameDef> {
        let begin = self.skip_whitespace(*pos);
        if !is_identifier_start(self.byte(begin)) {
            return None;
        }
        let mut end = begin;
        while is_identifier_char(self.byte(end)) {
            end = end.saturating_add(1);
        }
        *pos = end.saturating_sub(1);
        return Some(self.name_def(ByteRange::new(begin, end)));
    }

    /// Position of the first non-whitespace byte at or after `pos`.
    pub fn skip_whitespace(&self, pos: usize) -> usize {
        let mut i = pos;
        while i < self.len && is_whitespace(self.byte(i)) {
            i = i.saturating_add(1);
        }
        return i;
    }

    /// Bytes covered by `range`, clamped to the logical length.
    pub fn slice(&self, range: ByteRange) -> &[u8] {
        let end = range.end.min(self.len);
        return self.bytes.get(range.begin..end).unwrap_or_default();
    }

    /// Text covered by `range`; invalid UTF-8 is replaced, not rejected.
    pub fn text(&self, range: ByteRange) -> String {
        return String::from_utf8_lossy(self.slice(range)).into_owned();
    }

    /// Whether the whole token `word` starts at `pos`.
    pub fn token_at(&self, pos: usize, word: &str) -> bool {
        let end = pos.saturating_add(word.len());
        if self.slice(ByteRange::new(pos, end)) != word.as_bytes() {
            return false;
        }
        let before_ok = pos == 0 || is_separator(self.byte(pos.saturating_sub(1)));
        return before_ok && is_separator(self.byte(end));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn names(defs: &[NameDef]) -> Vec<&str> {
        return defs.iter().map(|d| return d.name.as_str()).collect();
    }

    #[test]
    fn open_appends_missing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"int x;").unwrap();

        let buffer = SourceBuffer::open(file.path()).unwrap();
        assert_eq!(buffer.as_bytes(), b"int x;\n");
        assert_eq!(buffer.len(), 7);
        assert_eq!(buffer.byte(7), SENTINEL);
        assert_eq!(buffer.byte(700), SENTINEL);
    }

    #[test]
    fn open_keeps_existing_newline() {
        let buffer = SourceBuffer::from_bytes("a\n");
        assert_eq!(buffer.as_bytes(), b"a\n");
    }

    #[test]
    fn empty_file_becomes_single_newline() {
        let buffer = SourceBuffer::from_bytes("");
        assert_eq!(buffer.as_bytes(), b"\n");
        assert!(!buffer.is_empty());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceBuffer::open(&dir.path().join("absent.cpp"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn erase_preserves_newlines() {
        let mut buffer = SourceBuffer::from_bytes("/* a\nb */x");
        let count = buffer.erase(ByteRange::new(0, 9));
        assert_eq!(count, 9);
        assert_eq!(buffer.as_bytes(), b"    \n    x\n");
    }

    #[test]
    fn erase_clamps_to_length() {
        let mut buffer = SourceBuffer::from_bytes("ab");
        assert_eq!(buffer.erase(ByteRange::new(1, 100)), 2);
        assert_eq!(buffer.as_bytes(), b"a \n");
    }

    #[test]
    fn read_name_skips_whitespace() {
        let buffer = SourceBuffer::from_bytes("#  define FOO 1");
        let mut pos = 1;
        let name = buffer.read_name(&mut pos).unwrap();
        assert_eq!(name.name, "define");
        assert_eq!(name.range, ByteRange::new(3, 9));
        assert_eq!(pos, 8);
    }

    #[test]
    fn read_name_rejects_punctuation() {
        let buffer = SourceBuffer::from_bytes("  (x)");
        let mut pos = 0;
        assert!(buffer.read_name(&mut pos).is_none());
        assert_eq!(pos, 0);
    }

    #[test]
    fn complete_name_splits_scopes() {
        let buffer = SourceBuffer::from_bytes(" outer :: inner::Leaf {");
        let mut pos = 0;
        let segments = buffer.read_complete_name(&mut pos).unwrap();
        assert_eq!(names(&segments), ["outer", "inner", "Leaf"]);
        let leaf = segments.last().unwrap();
        assert_eq!(leaf.range, ByteRange::new(17, 21));
        assert_eq!(pos, 20);
    }

    #[test]
    fn complete_name_accepts_global_qualifier() {
        let buffer = SourceBuffer::from_bytes("::Thing;");
        let mut pos = 0;
        let segments = buffer.read_complete_name(&mut pos).unwrap();
        assert_eq!(names(&segments), ["Thing"]);
    }

    #[test]
    fn complete_name_stops_at_base_clause() {
        let buffer = SourceBuffer::from_bytes(" Derived : public Base {");
        let mut pos = 0;
        let segments = buffer.read_complete_name(&mut pos).unwrap();
        assert_eq!(names(&segments), ["Derived"]);
    }

    #[test]
    fn complete_name_rejects_dangling_scope() {
        let buffer = SourceBuffer::from_bytes(" ns:: {");
        let mut pos = 0;
        assert!(buffer.read_complete_name(&mut pos).is_none());
        assert_eq!(pos, 0);
    }

    #[test]
    fn complete_name_requires_identifier() {
        let buffer = SourceBuffer::from_bytes("  {");
        let mut pos = 0;
        assert!(buffer.read_complete_name(&mut pos).is_none());
    }

    #[test]
    fn find_pair_returns_outer_pair() {
        let buffer = SourceBuffer::from_bytes("{ { } }");
        let pair = buffer.find_pair(0, buffer.len(), Bracket::Brace).unwrap();
        assert_eq!(pair, ByteRange::new(0, 7));
    }

    #[test]
    fn find_pair_respects_end() {
        let buffer = SourceBuffer::from_bytes("x <a> <b>");
        let pair = buffer.find_pair(4, buffer.len(), Bracket::Angle).unwrap();
        assert_eq!(buffer.text(pair), "<b>");
        assert!(buffer.find_pair(0, 4, Bracket::Angle).is_none());
    }

    #[test]
    fn find_pair_unbalanced_fails() {
        let buffer = SourceBuffer::from_bytes("f((x)");
        assert!(buffer.find_pair(0, buffer.len(), Bracket::Round).is_none());
    }

    #[test]
    fn identifiers_skip_numeric_literals() {
        let buffer = SourceBuffer::from_bytes("x1 = 0x1F + _y * 10u;");
        let ids = buffer.identifiers(0, buffer.len());
        assert_eq!(names(&ids), ["x1", "_y"]);
        assert_eq!(ids.first().unwrap().range, ByteRange::new(0, 2));
    }

    #[test]
    fn token_at_requires_boundaries() {
        let buffer = SourceBuffer::from_bytes("enum enumerate xenum");
        assert!(buffer.token_at(0, "enum"));
        assert!(!buffer.token_at(5, "enum"));
        assert!(!buffer.token_at(16, "enum"));
    }
}
