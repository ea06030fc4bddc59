//! Reference index: the per-file output handed to renderers.
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::buffer::SourceBuffer;
use crate::cascade;
use crate::keywords;
use crate::scrubber;
use crate::structure;
use crate::types::{ByteRange, ClassDef, EnumDef, NameDef, PreprocessorDef};

/// Sorted, pairwise non-overlapping ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RangeSet {
    /// Ascending by `begin`; no two entries overlap.
    ranges: Vec<ByteRange>,
}

impl RangeSet {
    /// Whether exactly `range` is stored.
    pub fn contains(&self, range: ByteRange) -> bool {
        return self.ranges.binary_search(&range).is_ok();
    }

    /// Insert `range` in order. Returns `false`, leaving the set unchanged,
    /// when it overlaps a stored range.
    pub fn insert(&mut self, range: ByteRange) -> bool {
        let at = self.ranges.partition_point(|r| return r.end <= range.begin);
        if self.ranges.get(at).is_some_and(|next| return next.overlaps(&range)) {
            return false;
        }
        self.ranges.insert(at, range);
        return true;
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        return self.ranges.is_empty();
    }

    /// Stored ranges in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ByteRange> + '_ {
        return self.ranges.iter().copied();
    }

    /// Number of stored ranges.
    pub fn len(&self) -> usize {
        return self.ranges.len();
    }
}

/// Name to occurrence ranges, for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceMap {
    /// Ordered by name for stable output.
    entries: BTreeMap<String, RangeSet>,
}

impl ReferenceMap {
    /// Whether `name` has at least one occurrence.
    pub fn contains(&self, name: &str) -> bool {
        return self.entries.contains_key(name);
    }

    /// Occurrences of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&RangeSet> {
        return self.entries.get(name);
    }

    /// Record one occurrence. Returns `false` if it overlaps one already
    /// stored under the same name.
    pub fn insert(&mut self, name: &str, range: ByteRange) -> bool {
        return self.entries.entry(name.to_string()).or_default().insert(range);
    }

    /// True when no name is recorded.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Names with their occurrences, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RangeSet)> {
        return self.entries.iter().map(|(name, set)| return (name.as_str(), set));
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Total number of occurrences across all names.
    pub fn occurrence_count(&self) -> usize {
        return self.entries.values().map(RangeSet::len).sum();
    }

    /// Every occurrence paired with its name, ordered by name then position.
    pub fn occurrences(&self) -> impl Iterator<Item = (&str, ByteRange)> {
        return self.iter().flat_map(|(name, set)| return set.iter().map(move |range| return (name, range)));
    }

    /// Drop every occurrence of `name`.
    pub fn remove(&mut self, name: &str) -> Option<RangeSet> {
        return self.entries.remove(name);
    }
}

impl FromIterator<NameDef> for ReferenceMap {
    fn from_iter<I: IntoIterator<Item = NameDef>>(defs: I) -> Self {
        let mut map = Self::default();
        for def in defs {
            map.insert(&def.name, def.range);
        }
        return map;
    }
}

impl Extend<NameDef> for ReferenceMap {
    fn extend<I: IntoIterator<Item = NameDef>>(&mut self, defs: I) {
        for def in defs {
            self.insert(&def.name, def.range);
        }
    }
}

/// Every classification recorded for one source buffer.
///
/// Built in one go by [`SymbolIndex::build`] and never patched afterwards;
/// reparsing replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolIndex {
    /// Character literals.
    characters: Vec<NameDef>,
    /// Uses of class, struct, union and namespace names.
    class_refs: ReferenceMap,
    /// Class-like definitions and declarations.
    classes: Vec<ClassDef>,
    /// Line and block comments.
    comments: Vec<NameDef>,
    /// Uses of enum value names.
    constant_refs: ReferenceMap,
    /// Uses of enum type names.
    enum_refs: ReferenceMap,
    /// Enum definitions and declarations.
    enums: Vec<EnumDef>,
    /// Scope qualifiers with no local definition.
    external_scope_refs: ReferenceMap,
    /// Types with no local definition.
    external_type_refs: ReferenceMap,
    /// Include targets.
    includes: Vec<NameDef>,
    /// Reserved words.
    keyword_refs: ReferenceMap,
    /// Macro names, at their `#define` and at every use.
    macro_refs: ReferenceMap,
    /// Call-like uses: `name(` and `name (`.
    method_refs: ReferenceMap,
    /// Preprocessor lines.
    preprocessor: Vec<PreprocessorDef>,
    /// The buffer after scrubbing. Not part of the serialised form.
    #[serde(skip)]
    scrubbed: Option<SourceBuffer>,
    /// String literals.
    strings: Vec<NameDef>,
}

impl SymbolIndex {
    /// Classify `source`. The caller's buffer is left untouched; a scrubbed
    /// copy is kept in the index. `known_macros` are treated as macro names
    /// in addition to those `#define`d in the source.
    pub fn build(source: &SourceBuffer, known_macros: &HashSet<String>) -> Self {
        let mut buffer = source.clone();
        let scrubbed = scrubber::scrub(&mut buffer);

        let mut macros = known_macros.clone();
        macros.extend(scrubbed.defines.iter().map(|d| return d.name.clone()));
        let resolution = cascade::resolve(&buffer, &macros);

        let mut method_refs: ReferenceMap = structure::lex_methods(&buffer).into_iter().collect();
        for keyword in keywords::all() {
            method_refs.remove(keyword);
        }

        let mut macro_refs: ReferenceMap = resolution.macro_refs.into_iter().collect();
        macro_refs.extend(scrubbed.defines);

        let index = Self {
            characters: scrubbed.characters,
            class_refs: resolution.class_refs.into_iter().collect(),
            classes: resolution.classes,
            comments: scrubbed.comments,
            constant_refs: resolution.constant_refs.into_iter().collect(),
            enum_refs: resolution.enum_refs.into_iter().collect(),
            enums: resolution.enums,
            external_scope_refs: resolution.external_scope_refs.into_iter().collect(),
            external_type_refs: resolution.external_type_refs.into_iter().collect(),
            includes: scrubbed.includes,
            keyword_refs: resolution.keyword_refs.into_iter().collect(),
            macro_refs,
            method_refs,
            preprocessor: scrubbed.preprocessor,
            scrubbed: Some(buffer),
            strings: scrubbed.strings,
        };

        tracing::debug!(
            bytes = source.len(),
            comments = index.comments.len(),
            classes = index.classes.len(),
            enums = index.enums.len(),
            unresolved = resolution.unresolved.len(),
            "classified buffer"
        );
        return index;
    }

    /// Character literals.
    pub fn characters(&self) -> &[NameDef] {
        return &self.characters;
    }

    /// Uses of class-like names.
    pub const fn class_refs(&self) -> &ReferenceMap {
        return &self.class_refs;
    }

    /// Class-like definitions and declarations.
    pub fn classes(&self) -> &[ClassDef] {
        return &self.classes;
    }

    /// Drop every recorded classification.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Comments.
    pub fn comments(&self) -> &[NameDef] {
        return &self.comments;
    }

    /// Uses of enum value names.
    pub const fn constant_refs(&self) -> &ReferenceMap {
        return &self.constant_refs;
    }

    /// Uses of enum type names.
    pub const fn enum_refs(&self) -> &ReferenceMap {
        return &self.enum_refs;
    }

    /// Enum definitions and declarations.
    pub fn enums(&self) -> &[EnumDef] {
        return &self.enums;
    }

    /// Scope qualifiers not defined locally.
    pub const fn external_scope_refs(&self) -> &ReferenceMap {
        return &self.external_scope_refs;
    }

    /// Types not defined locally.
    pub const fn external_type_refs(&self) -> &ReferenceMap {
        return &self.external_type_refs;
    }

    /// Include targets.
    pub fn includes(&self) -> &[NameDef] {
        return &self.includes;
    }

    /// True until a buffer has been parsed.
    pub const fn is_empty(&self) -> bool {
        return self.scrubbed.is_none();
    }

    /// Reserved words.
    pub const fn keyword_refs(&self) -> &ReferenceMap {
        return &self.keyword_refs;
    }

    /// Macro names.
    pub const fn macro_refs(&self) -> &ReferenceMap {
        return &self.macro_refs;
    }

    /// Call-like uses.
    pub const fn method_refs(&self) -> &ReferenceMap {
        return &self.method_refs;
    }

    /// Rebuild in place, discarding everything from the previous parse.
    pub fn parse(&mut self, source: &SourceBuffer, known_macros: &HashSet<String>) {
        *self = Self::build(source, known_macros);
    }

    /// Preprocessor lines.
    pub fn preprocessor(&self) -> &[PreprocessorDef] {
        return &self.preprocessor;
    }

    /// The scrubbed copy of the parsed buffer.
    pub const fn scrubbed(&self) -> Option<&SourceBuffer> {
        return self.scrubbed.as_ref();
    }

    /// String literals.
    pub fn strings(&self) -> &[NameDef] {
        return &self.strings;
    }

    /// Occurrence count per category, for summaries.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        return vec![
            ("preprocessor", self.preprocessor.len()),
            ("comment", self.comments.len()),
            ("string", self.strings.len()),
            ("character", self.characters.len()),
            ("include", self.includes.len()),
            ("keyword", self.keyword_refs.occurrence_count()),
            ("class", self.class_refs.occurrence_count()),
            ("enum", self.enum_refs.occurrence_count()),
            ("constant", self.constant_refs.occurrence_count()),
            ("macro", self.macro_refs.occurrence_count()),
            ("method", self.method_refs.occurrence_count()),
            ("external-type", self.external_type_refs.occurrence_count()),
            ("external-scope", self.external_scope_refs.occurrence_count()),
        ];
    }
}
