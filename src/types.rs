//! Core domain types: byte ranges and the definitions anchored to them.
use serde::Serialize;

/// Half-open byte interval `[begin, end)` into one buffer snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ByteRange {
    /// First byte covered by the range.
    pub begin: usize,
    /// One past the last byte covered by the range.
    pub end: usize,
}

impl ByteRange {
    /// Whether `pos` lies inside the range.
    pub const fn contains(&self, pos: usize) -> bool {
        return self.begin <= pos && pos < self.end;
    }

    /// An empty range anchored at `pos`.
    pub const fn empty_at(pos: usize) -> Self {
        return Self { begin: pos, end: pos };
    }

    /// Whether this range fully encloses `other`.
    pub const fn encloses(&self, other: &Self) -> bool {
        return self.begin <= other.begin && other.end <= self.end;
    }

    /// True when no byte is covered.
    pub const fn is_empty(&self) -> bool {
        return self.end <= self.begin;
    }

    /// Number of bytes covered.
    pub const fn len(&self) -> usize {
        return self.end.saturating_sub(self.begin);
    }

    /// Create a range, normalising a reversed pair to an empty range at `begin`.
    pub const fn new(begin: usize, end: usize) -> Self {
        if end < begin {
            return Self { begin, end: begin };
        }
        return Self { begin, end };
    }

    /// Two ranges overlap unless one ends at or before the other begins.
    pub const fn overlaps(&self, other: &Self) -> bool {
        return !(self.end <= other.begin || other.end <= self.begin);
    }

    /// The equivalent `std::ops::Range`, for slicing.
    pub const fn to_std(self) -> std::ops::Range<usize> {
        return self.begin..self.end;
    }
}

/// A name bound to the range where it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameDef {
    /// The materialised text of the occurrence.
    pub name: String,
    /// Where the occurrence sits in the buffer.
    pub range: ByteRange,
}

impl NameDef {
    /// Bind `name` to `range`.
    pub fn new(name: impl Into<String>, range: ByteRange) -> Self {
        return Self { name: name.into(), range };
    }
}

/// A preprocessor directive: its keyword (`include`, `define`, ...) and the full
/// logical line, continuation lines included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessorDef {
    /// Directive keyword. Empty name for a null directive (a lone `#`).
    pub directive: NameDef,
    /// From the `#` up to, not including, the terminating newline.
    pub line: ByteRange,
}

/// A named, possibly scope-qualified definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDef {
    /// No name was written; `name` holds an offset-based placeholder.
    pub anonymous: bool,
    /// Brace-enclosed body. Absent for declarations.
    pub body: Option<ByteRange>,
    /// Simple name of the entity.
    pub name: NameDef,
    /// Enclosing scope segments, outermost first (`a::b::C` gives `["a", "b"]`).
    pub scope: Vec<String>,
}

impl EntityDef {
    /// An unnamed entity introduced by `keyword`; the placeholder name embeds the
    /// byte offset so it is stable across runs and never collides with an identifier.
    pub fn anonymous(keyword: &str, offset: usize) -> Self {
        return Self {
            anonymous: true,
            body: None,
            name: NameDef::new(format!("<{keyword}@{offset}>"), ByteRange::empty_at(offset)),
            scope: Vec::new(),
        };
    }

    /// Qualified display name, e.g. `outer::Inner`.
    pub fn qualified_name(&self) -> String {
        if self.scope.is_empty() {
            return self.name.name.clone();
        }
        return format!("{}::{}", self.scope.join("::"), self.name.name);
    }
}

/// An enumeration and the constants declared in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    /// Name, scope and body of the enumeration.
    pub entity: EntityDef,
    /// Enumerators in declaration order.
    pub values: Vec<NameDef>,
}

/// The keyword that introduced a class-like definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKey {
    /// `class`
    Class,
    /// `namespace`
    Namespace,
    /// `struct`
    Struct,
    /// `union`
    Union,
}

impl ClassKey {
    /// Every class-introducing keyword, in lexing order.
    pub const ALL: [Self; 4] = [Self::Class, Self::Namespace, Self::Struct, Self::Union];

    /// Source spelling of the keyword.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Class => "class",
            Self::Namespace => "namespace",
            Self::Struct => "struct",
            Self::Union => "union",
        };
    }
}

/// A class, struct, union or namespace definition or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDef {
    /// Name, scope and body of the definition.
    pub entity: EntityDef,
    /// Which keyword introduced it.
    pub key: ClassKey,
}
