//! Diagnostics shared by every pipeline stage.
//!
//! A [`CompileError`] is a plain value, not a panic: preprocessors, the
//! parser wrapper and every plugin phase return or accumulate these instead
//! of aborting, so that a single broken construct does not prevent the rest
//! of a file's diagnostics from being collected.

use std::fmt::{self, Display};

use crate::sourcemap::{Position, SourceMap};

/// Diagnostic taxonomy. Kinds, not types: everything downstream renders the
/// same way, but the kind lets callers filter (e.g. exit code selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CompileErrorKind {
    /// Unparseable SL construct, raised by a preprocessor.
    Syntax,
    /// Invalid Go after preprocessing, raised by the parser wrapper.
    Parse,
    /// A match is missing arms for some variant of its scrutinee's type.
    Exhaustiveness,
    /// A `None`/lambda signature could not be inferred from context.
    Inference,
    /// An invalid configuration value.
    Config,
    /// An invariant was violated; this is always a bug in the compiler.
    Internal,
}

impl Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompileErrorKind::Syntax => "syntax error",
            CompileErrorKind::Parse => "parse error",
            CompileErrorKind::Exhaustiveness => "non-exhaustive match",
            CompileErrorKind::Inference => "inference error",
            CompileErrorKind::Config => "config error",
            CompileErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

/// A single diagnostic. `position` is always expressed in preprocessed
/// coordinates; use [`CompileError::render`] to show it against the
/// original `.dingo` source via a [`SourceMap`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub message: String,
    pub position: Position,
    pub hint: Option<String>,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render as `file:line:col: kind: message` (+ optional `hint:` line),
    /// translating `position` back to the original source through `map`.
    pub fn render(&self, file: &str, map: &SourceMap) -> String {
        let original = map.lookup(self.position);
        let mut out = format!(
            "{file}:{}:{}: {}: {}",
            original.line, original.col, self.kind, self.message
        );
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  hint: {hint}"));
        }
        out
    }
}

/// Bound on the number of diagnostics accumulated for a single file, so a
/// pathological input cannot grow the error list without limit.
pub const MAX_ERRORS: usize = 100;

/// Append-only, capped error accumulator shared by the plugin pipeline.
#[derive(Debug, Default, Clone)]
pub struct ErrorAccumulator {
    errors: Vec<CompileError>,
}

impl ErrorAccumulator {
    pub fn push(&mut self, error: CompileError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.errors.len() >= MAX_ERRORS
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_vec(self) -> Vec<CompileError> {
        self.errors
    }

    pub fn as_slice(&self) -> &[CompileError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcemap::Mapping;

    #[test]
    fn saturates_at_max_errors() {
        let mut acc = ErrorAccumulator::default();
        for i in 0..MAX_ERRORS + 10 {
            acc.push(CompileError::new(
                CompileErrorKind::Internal,
                format!("err {i}"),
                Position::new(1, 1),
            ));
        }
        assert_eq!(acc.len(), MAX_ERRORS);
        assert!(acc.is_saturated());
    }

    #[test]
    fn render_uses_source_map() {
        let mut map = SourceMap::default();
        map.push(Mapping {
            preprocessed: Position::new(3, 1),
            original: Position::new(1, 5),
            length: 4,
            name: "error_prop".into(),
        });
        let err = CompileError::new(
            CompileErrorKind::Exhaustiveness,
            "non-exhaustive match, missing cases: None",
            Position::new(3, 1),
        )
        .with_hint("add a wildcard arm: `_ => ...`");

        let rendered = err.render("main.dingo", &map);
        assert_eq!(
            rendered,
            "main.dingo:1:5: non-exhaustive match: non-exhaustive match, missing cases: None\n  hint: add a wildcard arm: `_ => ...`"
        );
    }
}
