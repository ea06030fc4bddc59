//! Lexical scrubber: comment, string, character and preprocessor passes.
//!
//! Each pass is a small DFA run over the whole buffer by one shared driver.
//! A pass records every span it accepts and blanks it straight away, so the
//! next pass never sees content that is already classified.
use crate::buffer::{is_identifier_char, is_whitespace, Bracket, SourceBuffer};
use crate::types::{ByteRange, NameDef, PreprocessorDef};

/// Directives whose argument names another file.
const INCLUDE_DIRECTIVES: &[&str] = &["import", "include", "include_next"];

/// Directive whose first argument defines a macro name.
const DEFINE_DIRECTIVE: &str = "define";

/// Everything the scrubber recorded, in buffer order per list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scrubbed {
    /// Character literals, quotes included.
    pub characters: Vec<NameDef>,
    /// Line and block comments, delimiters included.
    pub comments: Vec<NameDef>,
    /// Names introduced by `#define`.
    pub defines: Vec<NameDef>,
    /// Include targets: `<...>` contents, or the quoted string span.
    pub includes: Vec<NameDef>,
    /// Every preprocessor line.
    pub preprocessor: Vec<PreprocessorDef>,
    /// String literals, quotes included.
    pub strings: Vec<NameDef>,
}

/// Run all four passes over `buffer` in their fixed order.
pub fn scrub(buffer: &mut SourceBuffer) -> Scrubbed {
    let mut comments = Vec::new();
    drive::<CommentLexer>(buffer, |buffer, range| {
        comments.push(buffer.name_def(range));
        buffer.erase(range);
    });

    let mut strings = Vec::new();
    drive::<StringLexer>(buffer, |buffer, range| {
        strings.push(buffer.name_def(range));
        buffer.erase(range);
    });

    let mut characters = Vec::new();
    drive::<CharacterLexer>(buffer, |buffer, range| {
        characters.push(buffer.name_def(range));
        buffer.erase(range);
    });

    let mut defines = Vec::new();
    let mut includes = Vec::new();
    let mut preprocessor = Vec::new();
    drive::<PreprocessorLexer>(buffer, |buffer, line| {
        let directive = read_directive(buffer, line);
        if INCLUDE_DIRECTIVES.contains(&directive.name.as_str()) {
            includes.extend(include_names(buffer, &directive, line, &strings));
        } else if directive.name == DEFINE_DIRECTIVE {
            let mut pos = directive.range.end;
            if let Some(name) = buffer.read_name(&mut pos).filter(|n| return n.range.end <= line.end) {
                defines.push(name);
            }
        }
        preprocessor.push(PreprocessorDef { directive, line });
        buffer.erase(line);
    });

    return Scrubbed { characters, comments, defines, includes, preprocessor, strings };
}

/// The directive keyword after `#`, or an empty name for a null directive.
fn read_directive(buffer: &SourceBuffer, line: ByteRange) -> NameDef {
    let after_hash = line.begin.saturating_add(1);
    let mut pos = after_hash;
    return match buffer.read_name(&mut pos) {
        Some(name) if name.range.end <= line.end => name,
        _ => NameDef::new("", ByteRange::empty_at(after_hash)),
    };
}

/// Include targets of one include-like directive line.
fn include_names(
    buffer: &SourceBuffer,
    directive: &NameDef,
    line: ByteRange,
    strings: &[NameDef],
) -> Vec<NameDef> {
    let argument = buffer.skip_whitespace(directive.range.end);
    if buffer.byte(argument) == b'<' {
        let Some(pair) = buffer.find_pair(argument, line.end, Bracket::Angle) else {
            return Vec::new();
        };
        let inner = ByteRange::new(pair.begin.saturating_add(1), pair.end.saturating_sub(1));
        return vec![buffer.name_def(inner)];
    }
    let tail = ByteRange::new(directive.range.end, line.end);
    return strings.iter().filter(|s| return tail.encloses(&s.range)).cloned().collect();
}

// ── Driver ──────────────────────────────────────────────────────────

/// What a transition asks the driver to do at the current byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Drop the open span without recording it.
    Abandon,
    /// Record `[begin, here]` inclusive of the current byte.
    Close,
    /// Record `[begin, here)`: the current byte ends the span but is not in it.
    CloseBefore,
    /// The next byte is escaped and must not drive a transition.
    Escape,
    /// Start a span at the current byte.
    Open,
    /// Start a span at the previously processed byte.
    OpenBefore,
    /// Nothing to do.
    Pass,
}

/// One scrubbing DFA. The default value is the initial state.
trait Lexer: Copy + Default {
    /// Transition on `byte`.
    fn step(self, byte: u8) -> (Self, Signal);
}

/// Backslash handling shared by every pass.
#[derive(Debug, Clone, Copy)]
enum Continuation {
    /// A backslash was just seen; the next byte is consumed.
    Backslash,
    /// Backslash then `\r`; a following `\n` belongs to the same continuation.
    CarriageReturn,
    /// No escape pending.
    Clear,
}

/// Run lexer `L` over the whole buffer, handing each accepted span to `accept`.
/// Spans still open at end of input are dropped.
fn drive<L: Lexer>(buffer: &mut SourceBuffer, mut accept: impl FnMut(&mut SourceBuffer, ByteRange)) {
    let mut state = L::default();
    let mut pending = Continuation::Clear;
    let mut begin: Option<usize> = None;
    let mut previous = 0_usize;
    let mut i = 0_usize;

    while i < buffer.len() {
        let byte = buffer.byte(i);
        match pending {
            Continuation::Backslash => {
                pending = if byte == b'\r' { Continuation::CarriageReturn } else { Continuation::Clear };
                i = i.saturating_add(1);
                continue;
            },
            Continuation::CarriageReturn => {
                pending = Continuation::Clear;
                if byte == b'\n' {
                    i = i.saturating_add(1);
                    continue;
                }
            },
            Continuation::Clear => {},
        }

        let (next, signal) = state.step(byte);
        state = next;
        match signal {
            Signal::Abandon => begin = None,
            Signal::Close => {
                if let Some(start) = begin.take() {
                    accept(buffer, ByteRange::new(start, i.saturating_add(1)));
                }
            },
            Signal::CloseBefore => {
                if let Some(start) = begin.take() {
                    accept(buffer, ByteRange::new(start, i));
                }
            },
            Signal::Escape => pending = Continuation::Backslash,
            Signal::Open => begin = Some(i),
            Signal::OpenBefore => begin = Some(previous),
            Signal::Pass => {},
        }
        // `OpenBefore` must see the byte ahead of a continuation, not the backslash.
        if !matches!(signal, Signal::Escape) {
            previous = i;
        }
        i = i.saturating_add(1);
    }
}

// ── Comments ────────────────────────────────────────────────────────

/// Finds `//` and `/* */` comments while stepping over string and
/// character literals it does not record.
#[derive(Debug, Clone, Copy, Default)]
enum CommentLexer {
    /// Inside a character literal.
    Apostrophe,
    /// Inside a block comment.
    Block,
    /// Inside a block comment, just after `*`.
    BlockStar,
    /// Plain code.
    #[default]
    Code,
    /// Inside a line comment.
    Line,
    /// Inside a number, where `'` is a digit separator.
    Number,
    /// Inside a string literal.
    Quoted,
    /// Just after a `/` in code.
    Slash,
}

impl Lexer for CommentLexer {
    fn step(self, byte: u8) -> (Self, Signal) {
        return match (self, byte) {
            (Self::Code, b'/') => (Self::Slash, Signal::Pass),
            (Self::Code, b'"') => (Self::Quoted, Signal::Pass),
            (Self::Code, b'\'') => (Self::Apostrophe, Signal::Pass),
            (Self::Code, b'0'..=b'9') => (Self::Number, Signal::Pass),
            (Self::Code, _) => (Self::Code, Signal::Pass),
            (Self::Number, b'\'') => (Self::Number, Signal::Pass),
            (Self::Number, _) if is_identifier_char(byte) => (Self::Number, Signal::Pass),
            (Self::Slash, b'/') => (Self::Line, Signal::OpenBefore),
            (Self::Slash, b'*') => (Self::Block, Signal::OpenBefore),
            (Self::Slash, b'\\') => (Self::Slash, Signal::Escape),
            (Self::Number | Self::Slash, _) => Self::Code.step(byte),
            (Self::Line, b'\n') => (Self::Code, Signal::CloseBefore),
            (Self::Line, b'\\') => (Self::Line, Signal::Escape),
            (Self::Line, _) => (Self::Line, Signal::Pass),
            (Self::Block | Self::BlockStar, b'*') => (Self::BlockStar, Signal::Pass),
            (Self::BlockStar, b'/') => (Self::Code, Signal::Close),
            (Self::Block | Self::BlockStar, _) => (Self::Block, Signal::Pass),
            (Self::Quoted, b'"') | (Self::Apostrophe, b'\'') => (Self::Code, Signal::Pass),
            (Self::Quoted | Self::Apostrophe, b'\n') => (Self::Code, Signal::Pass),
            (Self::Quoted | Self::Apostrophe, b'\\') => (self, Signal::Escape),
            (Self::Quoted | Self::Apostrophe, _) => (self, Signal::Pass),
        };
    }
}

// ── Strings ─────────────────────────────────────────────────────────

/// Finds double-quoted string literals.
#[derive(Debug, Clone, Copy, Default)]
enum StringLexer {
    /// Inside a character literal, which may contain `"`.
    Apostrophe,
    /// Plain code.
    #[default]
    Code,
    /// Inside a number, where `'` is a digit separator.
    Number,
    /// Inside a string literal.
    Quoted,
}

impl Lexer for StringLexer {
    fn step(self, byte: u8) -> (Self, Signal) {
        return match (self, byte) {
            (Self::Code, b'"') => (Self::Quoted, Signal::Open),
            (Self::Code, b'\'') => (Self::Apostrophe, Signal::Pass),
            (Self::Code, b'0'..=b'9') => (Self::Number, Signal::Pass),
            (Self::Code, _) => (Self::Code, Signal::Pass),
            (Self::Number, b'\'') => (Self::Number, Signal::Pass),
            (Self::Number, _) if is_identifier_char(byte) => (Self::Number, Signal::Pass),
            (Self::Number, _) => Self::Code.step(byte),
            (Self::Quoted, b'"') => (Self::Code, Signal::Close),
            (Self::Quoted, b'\n') => (Self::Code, Signal::Abandon),
            (Self::Apostrophe, b'\'' | b'\n') => (Self::Code, Signal::Pass),
            (Self::Quoted | Self::Apostrophe, b'\\') => (self, Signal::Escape),
            (Self::Quoted | Self::Apostrophe, _) => (self, Signal::Pass),
        };
    }
}

// ── Characters ──────────────────────────────────────────────────────

/// Finds single-quoted character literals.
#[derive(Debug, Clone, Copy, Default)]
enum CharacterLexer {
    /// Plain code.
    #[default]
    Code,
    /// Inside a number, where `'` is a digit separator.
    Number,
    /// Inside a character literal.
    Quoted,
    /// Inside an identifier, so a following `'` opens a prefixed literal.
    Word,
}

impl Lexer for CharacterLexer {
    fn step(self, byte: u8) -> (Self, Signal) {
        return match (self, byte) {
            (Self::Code, b'\'') => (Self::Quoted, Signal::Open),
            (Self::Code, b'0'..=b'9') => (Self::Number, Signal::Pass),
            (Self::Code, _) if is_identifier_char(byte) => (Self::Word, Signal::Pass),
            (Self::Code, _) => (Self::Code, Signal::Pass),
            (Self::Number, b'\'') => (Self::Number, Signal::Pass),
            (Self::Number | Self::Word, _) if is_identifier_char(byte) => (self, Signal::Pass),
            (Self::Number | Self::Word, _) => Self::Code.step(byte),
            (Self::Quoted, b'\'') => (Self::Code, Signal::Close),
            (Self::Quoted, b'\n') => (Self::Code, Signal::Abandon),
            (Self::Quoted, b'\\') => (Self::Quoted, Signal::Escape),
            (Self::Quoted, _) => (Self::Quoted, Signal::Pass),
        };
    }
}

// ── Preprocessor ────────────────────────────────────────────────────

/// Finds logical lines whose first non-blank byte is `#`.
#[derive(Debug, Clone, Copy, Default)]
enum PreprocessorLexer {
    /// Inside a directive line.
    Directive,
    /// Only whitespace so far on this line.
    #[default]
    LineStart,
    /// Inside an ordinary line.
    Other,
}

impl Lexer for PreprocessorLexer {
    fn step(self, byte: u8) -> (Self, Signal) {
        return match (self, byte) {
            (Self::LineStart, b'#') => (Self::Directive, Signal::Open),
            (Self::LineStart, _) if is_whitespace(byte) => (Self::LineStart, Signal::Pass),
            (Self::Directive, b'\n') => (Self::LineStart, Signal::CloseBefore),
            (Self::Other, b'\n') => (Self::LineStart, Signal::Pass),
            (Self::Directive | Self::Other, b'\\') => (self, Signal::Escape),
            (Self::Directive, _) => (Self::Directive, Signal::Pass),
            (Self::LineStart | Self::Other, _) => (Self::Other, Signal::Pass),
        };
    }
}
