//! Text-level rewriting of `.dingo` bytes into valid Go bytes plus source
//! map entries, run as a fixed-order chain (§4.2).
//!
//! Every pass is grammar-agnostic: rather than hand-rolling a second
//! bespoke scanner per construct, all five reuse [`crate::goast::lexer`]
//! to tokenize (it splits into idents/literals/symbols/comments without
//! requiring valid Go), then rewrite the token stream and reassemble text,
//! recording a [`Mapping`] for every span whose position shifts.

mod enum_decl;
mod error_propagation;
mod keyword;
mod lambda;
mod match_expr;
mod type_annotation;

use crate::errors::CompileError;
use crate::sourcemap::{Mapping, Position, SourceMap};

pub use enum_decl::EnumDeclProcessor;
pub use error_propagation::ErrorPropagationProcessor;
pub use keyword::KeywordProcessor;
pub use lambda::LambdaProcessor;
pub use match_expr::MatchProcessor;
pub use type_annotation::TypeAnnotationProcessor;

pub trait Preprocessor {
    fn name(&self) -> &'static str;
    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError>;
}

/// A growable output buffer that can report the line/col of any byte
/// offset within itself (recomputed on demand rather than tracked
/// incrementally), and can be truncated — both needed by passes that must
/// splice already-written text back out when a nested construct (e.g. a
/// nested `?`) was rewritten before its enclosing one.
#[derive(Default)]
pub struct OutputBuilder {
    pub text: String,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(&self) -> Position {
        self.pos_at(self.text.len())
    }

    pub fn pos_at(&self, byte_offset: usize) -> Position {
        let prefix = &self.text[..byte_offset];
        let line = prefix.matches('\n').count() + 1;
        let col = match prefix.rfind('\n') {
            Some(idx) => prefix[idx + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        Position::new(line, col)
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn truncate(&mut self, byte_offset: usize) {
        self.text.truncate(byte_offset);
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Runs the fixed preprocessor chain in document order, threading the
/// growing [`SourceMap`] through each stage. A stage's mappings are
/// recorded in *its own* output coordinates; since each stage's output
/// becomes the next stage's input, earlier mappings are composed with
/// later ones by the fact that unmodified spans pass through verbatim and
/// keep their relative line/col, which is all `SourceMap::lookup`
/// requires (see its fallback-to-identity behavior).
pub fn run_chain(source: &str, match_syntax: crate::config::MatchSyntax) -> Result<(String, SourceMap), CompileError> {
    let mut map = SourceMap::default();
    let mut text = source.to_string();

    // Lambda runs after match and before the keyword normalizer: its marker
    // wraps the lambda body verbatim, so anything a later stage would still
    // need to see inside that body (a `let` in a multi-statement future
    // extension, say) stays visible to it.
    let mut stages: Vec<Box<dyn Preprocessor>> = vec![
        Box::new(TypeAnnotationProcessor::default()),
        Box::new(ErrorPropagationProcessor::default()),
        Box::new(EnumDeclProcessor::default()),
        Box::new(MatchProcessor::new(match_syntax)),
        Box::new(LambdaProcessor::default()),
        Box::new(KeywordProcessor::default()),
    ];

    for stage in stages.iter_mut() {
        let (next_text, stage_map) = stage.process(&text)?;
        text = next_text;
        map.extend(stage_map.into_mappings());
    }

    Ok((text, map))
}

/// Small helper shared by passes: push `mapping.name` entries consistently.
pub(crate) fn mapping(name: &str, preprocessed: Position, original: Position, length: usize) -> Mapping {
    Mapping {
        preprocessed,
        original,
        length,
        name: name.to_string(),
    }
}
