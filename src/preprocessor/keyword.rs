//! Keyword normalizer: the last stage of the chain (§4.2). By this point
//! every construct that needed structural rewriting (types, `?`, `enum`,
//! `match`) has already been lowered, so all that is left is swapping a
//! handful of SL keywords for their Go spellings on a token-for-token
//! basis — `let`/`const` become `var` (Go doesn't distinguish mutability
//! at declaration), `fn` becomes `func`.

use super::{mapping, OutputBuilder, Preprocessor};
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{slice, tokenize_with_chars, TokenKind};
use crate::sourcemap::SourceMap;

#[derive(Default)]
pub struct KeywordProcessor;

/// `(SL spelling, Go spelling)`. `const` keeps Go's own meaning of
/// compile-time constant, so it is intentionally not folded into `var`.
const REWRITES: &[(&str, &str)] = &[("let", "var"), ("fn", "func")];

impl Preprocessor for KeywordProcessor {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax, e.message, e.pos))?;

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut emit_cursor = 0usize;

        for tok in &tokens {
            if matches!(tok.kind, TokenKind::Eof) {
                break;
            }
            if tok.start > emit_cursor {
                out.push_str(&slice(&chars, emit_cursor, tok.start));
            }

            if let TokenKind::Ident(name) = &tok.kind {
                if let Some((_, go_spelling)) = REWRITES.iter().find(|(sl, _)| sl == name) {
                    let rewrite_pos = out.pos();
                    out.push_str(go_spelling);
                    map.push(mapping("keyword", rewrite_pos, tok.pos, tok.end - tok.start));
                    emit_cursor = tok.end;
                    continue;
                }
            }

            out.push_str(&slice(&chars, tok.start, tok.end));
            emit_cursor = tok.end;
        }

        out.push_str(&slice(&chars, emit_cursor, chars.len()));
        Ok((out.text, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_let_to_var() {
        let mut p = KeywordProcessor::default();
        let (out, map) = p.process("let x = 1").unwrap();
        assert_eq!(out, "var x = 1");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn rewrites_fn_to_func() {
        let mut p = KeywordProcessor::default();
        let (out, _) = p.process("fn add(a, b int) int { return a + b }").unwrap();
        assert!(out.starts_with("func add"));
    }

    #[test]
    fn leaves_const_alone() {
        let mut p = KeywordProcessor::default();
        let (out, map) = p.process("const Pi = 3").unwrap();
        assert_eq!(out, "const Pi = 3");
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn does_not_touch_identifiers_containing_keywords() {
        let mut p = KeywordProcessor::default();
        let (out, _) = p.process("letter := 1").unwrap();
        assert_eq!(out, "letter := 1");
    }
}
