use super::{Comment, Decl};
use crate::sourcemap::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
    pub pos: Position,
}

/// Top-level parse of one Go (post-preprocessing) source file.
///
/// `comments` is the flat, position-ordered list of every comment in the
/// file — including `DINGO_*` markers — kept independent of `decls` so
/// comment association is always an explicit lookup (by position/window)
/// rather than something the printer infers. This is what the two-AST
/// separation in §4.11 relies on: an *injected* `File` is built fresh, with
/// an empty `comments` list, so it can never acquire one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub comments: Vec<Comment>,
}

impl File {
    pub fn empty(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            imports: Vec::new(),
            decls: Vec::new(),
            comments: Vec::new(),
        }
    }
}
