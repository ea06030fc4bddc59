//! Structural lexers: enum and class-like definitions, and call-syntax scan.
//!
//! All three run over an already scrubbed buffer, so comments, literals and
//! preprocessor lines can no longer produce false matches.
use crate::buffer::{is_identifier_char, is_identifier_start, is_whitespace, Bracket, SourceBuffer};
use crate::types::{ByteRange, ClassDef, ClassKey, EntityDef, EnumDef, NameDef};

/// Keyword that opens an enumeration.
const ENUM_KEYWORD: &str = "enum";

/// Words that may follow `enum` to make it scoped.
const SCOPED_ENUM_KEYS: &[&str] = &["class", "struct"];

// ── Enums ───────────────────────────────────────────────────────────

/// Where the enum header reader is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    /// A name was read; `:`, `{` or `;` may follow.
    AfterName,
    /// Nothing read yet, or only `class`/`struct`.
    Name,
    /// After `:`; identifiers belong to the underlying type.
    Underlying,
}

/// Where the enum value collector is inside a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueState {
    /// Waiting for the leading identifier of the next item.
    Expect,
    /// Reading an identifier that started at `begin`.
    Name {
        /// First byte of the identifier.
        begin: usize,
    },
    /// Skipping an initialiser; `depth` counts open brackets inside it.
    Skip {
        /// Brackets opened inside the initialiser.
        depth: usize,
    },
}

/// Every `enum` definition or declaration, in buffer order.
pub fn lex_enums(buffer: &SourceBuffer) -> Vec<EnumDef> {
    let mut defs: Vec<EnumDef> = Vec::new();
    let mut resume = 0_usize;

    for token in buffer.identifiers(0, buffer.len()) {
        if token.name != ENUM_KEYWORD || token.range.begin < resume {
            continue;
        }
        let def = lex_enum(buffer, token.range);
        if let Some(body) = def.entity.body {
            resume = body.end;
        }
        defs.push(def);
    }
    return defs;
}

/// Read one enum header starting after the `enum` keyword, then its body.
fn lex_enum(buffer: &SourceBuffer, keyword: ByteRange) -> EnumDef {
    let mut def = EnumDef { entity: EntityDef::anonymous(ENUM_KEYWORD, keyword.end), values: Vec::new() };
    let mut header = Header::Name;
    let mut pos = keyword.end;

    loop {
        pos = buffer.skip_whitespace(pos);
        let byte = buffer.byte(pos);
        let scope_follows = byte == b':' && buffer.byte(pos.saturating_add(1)) == b':';

        match (header, byte) {
            (_, b'{') => {
                let Some(body) = buffer.find_pair(pos, buffer.len(), Bracket::Brace) else {
                    return def;
                };
                def.entity.body = Some(body);
                def.values = enum_values(buffer, body);
                return def;
            },
            (_, b'[') => {
                let Some(attribute) = buffer.find_pair(pos, buffer.len(), Bracket::Square) else {
                    return def;
                };
                pos = attribute.end;
            },
            (Header::Name, _) if is_identifier_start(byte) || scope_follows => {
                if let Some(key) = SCOPED_ENUM_KEYS.iter().find(|k| return buffer.token_at(pos, k)) {
                    pos = pos.saturating_add(key.len());
                    continue;
                }
                let mut last = pos;
                let Some(mut segments) = buffer.read_complete_name(&mut last) else {
                    return def;
                };
                let Some(name) = segments.pop() else {
                    return def;
                };
                def.entity.anonymous = false;
                def.entity.name = name;
                def.entity.scope = segments.into_iter().map(|s| return s.name).collect();
                pos = last.saturating_add(1);
                header = Header::AfterName;
            },
            (Header::Name | Header::AfterName, b':') => {
                pos = pos.saturating_add(1);
                header = Header::Underlying;
            },
            (Header::Underlying, _) if is_identifier_char(byte) || byte == b':' => {
                pos = pos.saturating_add(1);
            },
            // `;` ends a declaration; anything else is an elaborated type use.
            _ => return def,
        }
    }
}

/// Leading identifier of every top-level comma-separated item in `body`.
fn enum_values(buffer: &SourceBuffer, body: ByteRange) -> Vec<NameDef> {
    let mut values = Vec::new();
    let mut state = ValueState::Expect;

    for i in body.begin.saturating_add(1)..body.end {
        let byte = buffer.byte(i);
        state = match state {
            ValueState::Expect if is_identifier_start(byte) => ValueState::Name { begin: i },
            ValueState::Expect => ValueState::Expect,
            ValueState::Name { .. } if is_identifier_char(byte) => state,
            ValueState::Name { begin } => {
                values.push(buffer.name_def(ByteRange::new(begin, i)));
                if byte == b',' { ValueState::Expect } else { ValueState::Skip { depth: 0 } }
            },
            ValueState::Skip { depth: 0 } if byte == b',' => ValueState::Expect,
            ValueState::Skip { depth } => match byte {
                b'(' | b'[' | b'{' => ValueState::Skip { depth: depth.saturating_add(1) },
                b')' | b']' | b'}' => ValueState::Skip { depth: depth.saturating_sub(1) },
                _ => state,
            },
        };
    }
    return values;
}

// ── Classes ─────────────────────────────────────────────────────────

/// Every class, struct, union and namespace definition or named declaration.
///
/// `keywords` are the keyword occurrences already claimed by the cascade, in
/// buffer order; only those spelled like a class key are examined.
pub fn lex_classes(buffer: &SourceBuffer, keywords: &[NameDef]) -> Vec<ClassDef> {
    let mut defs = Vec::new();

    for key in ClassKey::ALL {
        for (index, keyword) in keywords.iter().enumerate() {
            if keyword.name != key.as_str() {
                continue;
            }
            let previous = index.checked_sub(1).and_then(|p| return keywords.get(p));
            if previous.is_some_and(|p| return is_scoped_enum_key(buffer, p, keyword)) {
                continue;
            }
            if let Some(entity) = lex_class(buffer, keyword.range, key) {
                defs.push(ClassDef { entity, key });
            }
        }
    }

    defs.sort_by_key(|d: &ClassDef| return d.entity.name.range.begin);
    return defs;
}

/// Whether `keyword` is the `class`/`struct` of an `enum class` header.
fn is_scoped_enum_key(buffer: &SourceBuffer, previous: &NameDef, keyword: &NameDef) -> bool {
    return previous.name == ENUM_KEYWORD && buffer.is_blank(previous.range.end, keyword.range.begin);
}

/// Read the header that follows one class-key occurrence.
fn lex_class(buffer: &SourceBuffer, keyword: ByteRange, key: ClassKey) -> Option<EntityDef> {
    let terminator = (keyword.end..buffer.len()).find(|&i| return matches!(buffer.byte(i), b';' | b'{'))?;
    let opens_body = buffer.byte(terminator) == b'{';

    let mut pos = keyword.end;
    let mut entity = match buffer.read_complete_name(&mut pos) {
        Some(mut segments) if pos < terminator => {
            let name = segments.pop()?;
            EntityDef {
                anonymous: false,
                body: None,
                name,
                scope: segments.into_iter().map(|s| return s.name).collect(),
            }
        },
        _ if opens_body => EntityDef::anonymous(key.as_str(), keyword.end),
        _ => return None,
    };

    if opens_body {
        entity.body = buffer.find_pair(terminator, buffer.len(), Bracket::Brace);
    }
    return Some(entity);
}

// ── Methods ─────────────────────────────────────────────────────────

/// States of the call-syntax scan.
#[derive(Debug, Clone, Copy)]
enum CallState {
    /// Between identifiers, after whitespace that follows the one at `name`.
    Gap {
        /// The identifier before the gap.
        name: ByteRange,
    },
    /// Outside any identifier.
    Idle,
    /// Inside an identifier that started at `begin`.
    Name {
        /// First byte of the identifier.
        begin: usize,
    },
    /// Inside a numeric literal.
    Number,
}

/// Every `name(` or `name (` occurrence, before keyword filtering.
pub fn lex_methods(buffer: &SourceBuffer) -> Vec<NameDef> {
    let mut calls = Vec::new();
    let mut state = CallState::Idle;

    for i in 0..buffer.len() {
        let byte = buffer.byte(i);
        state = match state {
            CallState::Name { .. } | CallState::Number if is_identifier_char(byte) => state,
            CallState::Name { begin } if byte == b'(' => {
                calls.push(buffer.name_def(ByteRange::new(begin, i)));
                CallState::Idle
            },
            CallState::Name { begin } if is_whitespace(byte) => {
                CallState::Gap { name: ByteRange::new(begin, i) }
            },
            CallState::Gap { name } if byte == b'(' => {
                calls.push(buffer.name_def(name));
                CallState::Idle
            },
            CallState::Gap { .. } if is_whitespace(byte) => state,
            _ if is_identifier_start(byte) => CallState::Name { begin: i },
            _ if is_identifier_char(byte) => CallState::Number,
            _ => CallState::Idle,
        };
    }
    return calls;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords;

    fn names(defs: &[NameDef]) -> Vec<&str> {
        return defs.iter().map(|d| return d.name.as_str()).collect();
    }

    fn keyword_refs(buffer: &SourceBuffer) -> Vec<NameDef> {
        return buffer
            .identifiers(0, buffer.len())
            .into_iter()
            .filter(|d| return keywords::is_keyword(&d.name))
            .collect();
    }

    fn classes(source: &str) -> Vec<ClassDef> {
        let buffer = SourceBuffer::from_bytes(source);
        return lex_classes(&buffer, &keyword_refs(&buffer));
    }

    #[test]
    fn enum_with_values() {
        let buffer = SourceBuffer::from_bytes("enum Color { RED, GREEN, BLUE };");
        let defs = lex_enums(&buffer);
        assert_eq!(defs.len(), 1);
        let def = defs.first().unwrap();
        assert_eq!(def.entity.name.name, "Color");
        assert_eq!(def.entity.name.range, ByteRange::new(5, 10));
        assert!(!def.entity.anonymous);
        assert_eq!(def.entity.body, Some(ByteRange::new(11, 31)));
        assert_eq!(names(&def.values), ["RED", "GREEN", "BLUE"]);
    }

    #[test]
    fn enum_initialisers_are_skipped() {
        let buffer = SourceBuffer::from_bytes("enum E { A = f(B, C), D = 1 << 2, F, };");
        let def = lex_enums(&buffer).pop().unwrap();
        assert_eq!(names(&def.values), ["A", "D", "F"]);
    }

    #[test]
    fn scoped_enum_with_underlying_type() {
        let buffer = SourceBuffer::from_bytes("enum class Mode : unsigned char { Off, On };");
        let def = lex_enums(&buffer).pop().unwrap();
        assert_eq!(def.entity.name.name, "Mode");
        assert_eq!(names(&def.values), ["Off", "On"]);
    }

    #[test]
    fn anonymous_enum_gets_offset_name() {
        let buffer = SourceBuffer::from_bytes("enum { X, Y };");
        let def = lex_enums(&buffer).pop().unwrap();
        assert!(def.entity.anonymous);
        assert_eq!(def.entity.name.name, "<enum@4>");
        assert_eq!(names(&def.values), ["X", "Y"]);
    }

    #[test]
    fn forward_declared_enum_has_no_body() {
        let buffer = SourceBuffer::from_bytes("enum Color;\nenum;");
        let defs = lex_enums(&buffer);
        assert_eq!(defs.len(), 2);
        let named = defs.first().unwrap();
        assert_eq!(named.entity.name.name, "Color");
        assert!(named.entity.body.is_none());
        assert!(defs.get(1).unwrap().entity.anonymous);
    }

    #[test]
    fn elaborated_enum_use_does_not_swallow_code() {
        let buffer = SourceBuffer::from_bytes("void f(enum Color c) { int x; }");
        let def = lex_enums(&buffer).pop().unwrap();
        assert_eq!(def.entity.name.name, "Color");
        assert!(def.entity.body.is_none());
        assert!(def.values.is_empty());
    }

    #[test]
    fn enum_must_be_a_whole_token() {
        let buffer = SourceBuffer::from_bytes("int enumerate(int renum) { return 0; }");
        assert!(lex_enums(&buffer).is_empty());
    }

    #[test]
    fn qualified_enum_name_keeps_scope() {
        let buffer = SourceBuffer::from_bytes("enum outer::Kind : int { K };");
        let def = lex_enums(&buffer).pop().unwrap();
        assert_eq!(def.entity.name.name, "Kind");
        assert_eq!(def.entity.scope, ["outer"]);
    }

    #[test]
    fn class_with_base_clause() {
        let defs = classes("class Derived : public Base { int x; };");
        assert_eq!(defs.len(), 1);
        let def = defs.first().unwrap();
        assert_eq!(def.key, ClassKey::Class);
        assert_eq!(def.entity.name.name, "Derived");
        assert_eq!(def.entity.body, Some(ByteRange::new(28, 38)));
    }

    #[test]
    fn nested_bodies_match_outer_brace() {
        let defs = classes("namespace ns { struct In { }; }");
        let outer = defs.iter().find(|d| return d.key == ClassKey::Namespace).unwrap();
        assert_eq!(outer.entity.body, Some(ByteRange::new(13, 31)));
        let inner = defs.iter().find(|d| return d.key == ClassKey::Struct).unwrap();
        assert_eq!(inner.entity.name.name, "In");
    }

    #[test]
    fn qualified_class_definition() {
        let defs = classes("struct a::b::Leaf { };");
        let def = defs.first().unwrap();
        assert_eq!(def.entity.name.name, "Leaf");
        assert_eq!(def.entity.scope, ["a", "b"]);
        assert_eq!(def.entity.qualified_name(), "a::b::Leaf");
    }

    #[test]
    fn declarations_and_anonymous_bodies() {
        let defs = classes("class Fwd;\nstruct;\nunion { int i; float f; } u;");
        assert_eq!(defs.len(), 2);
        let fwd = defs.first().unwrap();
        assert_eq!(fwd.entity.name.name, "Fwd");
        assert!(fwd.entity.body.is_none());
        let anon = defs.get(1).unwrap();
        assert_eq!(anon.key, ClassKey::Union);
        assert!(anon.entity.anonymous);
        assert_eq!(anon.entity.name.name, "<union@24>");
        assert!(anon.entity.body.is_some());
    }

    #[test]
    fn enum_class_is_not_a_class() {
        let defs = classes("enum class Mode { A };\nenum  struct Kind { B };");
        assert!(defs.is_empty());
    }

    #[test]
    fn method_calls_with_and_without_gap() {
        let buffer = SourceBuffer::from_bytes("x = run(a) + go  (b) + 3(c) + arr[i](d);");
        let calls = lex_methods(&buffer);
        assert_eq!(names(&calls), ["run", "go"]);
        assert_eq!(calls.get(1).unwrap().range, ByteRange::new(13, 15));
    }

    #[test]
    fn method_scan_reports_keywords_for_later_removal() {
        let buffer = SourceBuffer::from_bytes("if (sizeof(x)) f();");
        let calls = lex_methods(&buffer);
        assert_eq!(names(&calls), ["if", "sizeof", "f"]);
    }
}
