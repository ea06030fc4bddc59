//! Resolution cascade: classify identifier occurrences by fixed priority.
//!
//! The worklist starts as every identifier left in the scrubbed buffer. Each
//! filter claims what it recognises and removes it, so a lower filter never
//! sees an occurrence a higher one already took.
use std::collections::HashSet;

use crate::buffer::SourceBuffer;
use crate::keywords;
use crate::structure;
use crate::types::{ClassDef, EnumDef, NameDef};

/// Pending identifier occurrences, in buffer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worklist {
    /// Occurrences no filter has claimed yet.
    pending: Vec<NameDef>,
}

impl Worklist {
    /// Remove and return every pending occurrence matching `filter`, keeping
    /// the relative order of both halves.
    pub fn claim(&mut self, filter: impl FnMut(&NameDef) -> bool) -> Vec<NameDef> {
        let (claimed, kept): (Vec<NameDef>, Vec<NameDef>) =
            std::mem::take(&mut self.pending).into_iter().partition(filter);
        self.pending = kept;
        return claimed;
    }

    /// Give up the unclaimed occurrences.
    pub fn into_pending(self) -> Vec<NameDef> {
        return self.pending;
    }

    /// Whether every occurrence has been claimed.
    pub fn is_empty(&self) -> bool {
        return self.pending.is_empty();
    }

    /// Number of unclaimed occurrences.
    pub fn len(&self) -> usize {
        return self.pending.len();
    }

    /// Start from the given occurrences.
    pub const fn new(pending: Vec<NameDef>) -> Self {
        return Self { pending };
    }

    /// Occurrences still unclaimed.
    pub fn pending(&self) -> &[NameDef] {
        return &self.pending;
    }
}

/// Everything the cascade claimed, one list per category, plus the
/// structural definitions recovered along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Occurrences of class, struct, union and namespace names.
    pub class_refs: Vec<NameDef>,
    /// Class-like definitions and declarations.
    pub classes: Vec<ClassDef>,
    /// Occurrences of enum value names.
    pub constant_refs: Vec<NameDef>,
    /// Occurrences of enum type names.
    pub enum_refs: Vec<NameDef>,
    /// Enum definitions and declarations.
    pub enums: Vec<EnumDef>,
    /// Names used as a scope qualifier but never defined here.
    pub external_scope_refs: Vec<NameDef>,
    /// Names used as a type but never defined here.
    pub external_type_refs: Vec<NameDef>,
    /// Reserved words.
    pub keyword_refs: Vec<NameDef>,
    /// Occurrences of macro names.
    pub macro_refs: Vec<NameDef>,
    /// Identifiers no filter claimed.
    pub unresolved: Vec<NameDef>,
}

/// Classify every identifier left in the scrubbed `buffer`. `macros` holds
/// the names treated as macros: those `#define`d in the file and any
/// configured ones.
pub fn resolve(buffer: &SourceBuffer, macros: &HashSet<String>) -> Resolution {
    let mut work = Worklist::new(buffer.identifiers(0, buffer.len()));
    let mut out = Resolution::default();

    out.macro_refs = work.claim(|d| return macros.contains(&d.name));
    out.keyword_refs = work.claim(|d| return keywords::is_keyword(&d.name));

    out.enums = structure::lex_enums(buffer);
    out.classes = structure::lex_classes(buffer, &out.keyword_refs);

    let class_names: HashSet<&str> = out
        .classes
        .iter()
        .filter(|c| return !c.entity.anonymous)
        .map(|c| return c.entity.name.name.as_str())
        .collect();
    out.class_refs = work.claim(|d| return class_names.contains(d.name.as_str()));

    let enum_names: HashSet<&str> = out
        .enums
        .iter()
        .filter(|e| return !e.entity.anonymous)
        .map(|e| return e.entity.name.name.as_str())
        .collect();
    out.enum_refs = work.claim(|d| return enum_names.contains(d.name.as_str()));

    let constant_names: HashSet<&str> =
        out.enums.iter().flat_map(|e| return e.values.iter()).map(|v| return v.name.as_str()).collect();
    out.constant_refs = work.claim(|d| return constant_names.contains(d.name.as_str()));

    out.external_scope_refs = work.claim(|d| {
        return precedes_scope_operator(buffer, d)
            && !class_names.contains(d.name.as_str())
            && !macros.contains(&d.name);
    });

    out.external_type_refs = claim_external_types(buffer, &mut work, &out.keyword_refs);
    out.unresolved = work.into_pending();
    return out;
}

/// Whether the next non-blank bytes after `def` are `::`.
fn precedes_scope_operator(buffer: &SourceBuffer, def: &NameDef) -> bool {
    let next = buffer.skip_whitespace(def.range.end);
    return buffer.byte(next) == b':' && buffer.byte(next.saturating_add(1)) == b':';
}

/// One token of the merged pending-plus-keyword sequence.
struct Token<'a> {
    /// The occurrence.
    def: &'a NameDef,
    /// Still in the worklist, as opposed to an already claimed keyword.
    pending: bool,
}

/// Pair adjacent tokens separated only by whitespace:
/// `Type name` claims `Type`, and `public Base` / `const Type` claims the
/// second token. Afterwards every other occurrence of a claimed name is
/// folded into the same category.
fn claim_external_types(buffer: &SourceBuffer, work: &mut Worklist, keyword_refs: &[NameDef]) -> Vec<NameDef> {
    let mut tokens: Vec<Token<'_>> = work
        .pending()
        .iter()
        .map(|def| return Token { def, pending: true })
        .chain(keyword_refs.iter().map(|def| return Token { def, pending: false }))
        .collect();
    tokens.sort_by_key(|t| return t.def.range.begin);

    let mut chosen: HashSet<usize> = HashSet::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut i = 0_usize;

    while let (Some(first), Some(second)) = (tokens.get(i), tokens.get(i.saturating_add(1))) {
        if !buffer.is_blank(first.def.range.end, second.def.range.begin) {
            i = i.saturating_add(1);
            continue;
        }
        if first.pending {
            chosen.insert(first.def.range.begin);
            names.insert(first.def.name.clone());
            i = i.saturating_add(1);
            continue;
        }
        let introduces_type =
            keywords::is_base_specifier(&first.def.name) || keywords::is_type_qualifier(&first.def.name);
        if introduces_type && second.pending && !keywords::is_keyword(&second.def.name) {
            chosen.insert(second.def.range.begin);
            names.insert(second.def.name.clone());
            i = i.saturating_add(2);
            continue;
        }
        i = i.saturating_add(1);
    }

    return work.claim(|d| return chosen.contains(&d.range.begin) || names.contains(&d.name));
}
