//! Process-wide keyword and specifier sets.
//!
//! Built once on first use (or eagerly through [`warm_up`]) and never
//! mutated afterwards, so parses on different threads share them freely.
use std::collections::HashSet;
use std::sync::LazyLock;

/// Reserved words of C and C++ that are never user identifiers.
const KEYWORD_LIST: &[&str] = &[
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "catch", "char", "char16_t",
    "char32_t", "class", "const", "const_cast", "constexpr", "continue", "decltype", "default",
    "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit", "extern", "false",
    "float", "for", "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace",
    "new", "noexcept", "nullptr", "operator", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true", "try",
    "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "wchar_t", "while",
];

/// Keywords that may precede a base class name in a base clause.
const BASE_SPECIFIERS: &[&str] = &["private", "protected", "public"];

/// Qualifiers after which the next identifier is taken to be a type.
const TYPE_QUALIFIERS: &[&str] = &["const"];

/// The keyword set, materialised once.
static KEYWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| return KEYWORD_LIST.iter().copied().collect());

/// Whether `name` is a reserved word.
pub fn is_keyword(name: &str) -> bool {
    return KEYWORDS.contains(name);
}

/// Whether `name` is `public`, `protected` or `private`.
pub fn is_base_specifier(name: &str) -> bool {
    return BASE_SPECIFIERS.iter().any(|s| return *s == name);
}

/// Whether `name` is a qualifier that introduces a type (`const`).
pub fn is_type_qualifier(name: &str) -> bool {
    return TYPE_QUALIFIERS.iter().any(|s| return *s == name);
}

/// All keywords, for callers that need to strip them from a result set.
pub fn all() -> impl Iterator<Item = &'static str> {
    return KEYWORD_LIST.iter().copied();
}

/// Build the shared sets before any parsing starts.
pub fn warm_up() {
    LazyLock::force(&KEYWORDS);
}
