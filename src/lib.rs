//! Classify every lexical and semantic region of a C/C++ source file and
//! anchor each classification to a byte range, for syntax highlighting.
//!
//! A parse runs in fixed stages over one [`SourceBuffer`]: the
//! [`scrubber`] records and blanks comments, literals and preprocessor
//! lines; the [`structure`] lexers recover enum and class definitions; the
//! [`cascade`] sorts the remaining identifiers into categories. The result
//! is a [`SymbolIndex`], which [`render`] turns into HTML.
//!
//! ```no_run
//! use std::collections::HashSet;
//! use std::path::Path;
//!
//! let source = ccmark::SourceBuffer::open(Path::new("main.cpp"))?;
//! let index = ccmark::SymbolIndex::build(&source, &HashSet::new());
//! for class in index.classes() {
//!     println!("{}", class.entity.qualified_name());
//! }
//! # Ok::<(), ccmark::Error>(())
//! ```

pub mod buffer;
pub mod cascade;
pub mod commands;
pub mod config;
pub mod error;
pub mod hasher;
pub mod index;
pub mod keywords;
pub mod render;
pub mod scanner;
pub mod scrubber;
pub mod structure;
pub mod types;
pub mod watch;
pub mod workspace;

pub use buffer::SourceBuffer;
pub use error::Error;
pub use index::SymbolIndex;
