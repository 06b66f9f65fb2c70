//! Type-annotation normalizer: first stage of the chain (§4.2 step 1).
//!
//! Does two things, both purely syntactic and both scoped to avoid
//! colliding with Go's own `key: value` composite-literal syntax:
//!
//! 1. `name: Type` → `name Type`, inside parameter lists and directly
//!    after `var`/`let`/`const` — the two places the grammar never means
//!    a composite-literal key.
//! 2. `Ident<Args>` → `Ident[Args]` wherever the `<` touches the
//!    identifier with no intervening whitespace (mirroring the same
//!    adjacency trick Go's own parser uses to disambiguate `[` generics
//!    from index/slice syntax), since Go itself only accepts bracket
//!    generics. `Result<T,E>` becomes `Result[T,E]` before anything
//!    downstream — including the enum processor — ever sees the file.

use super::{mapping, OutputBuilder, Preprocessor};
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{tokenize_with_chars, slice, Token, TokenKind};
use crate::sourcemap::SourceMap;

#[derive(Default)]
pub struct TypeAnnotationProcessor;

impl Preprocessor for TypeAnnotationProcessor {
    fn name(&self) -> &'static str {
        "type_annotation"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source).map_err(|e| {
            CompileError::new(CompileErrorKind::Syntax, e.message, e.pos)
        })?;

        let angle_spans = find_generic_angle_spans(&tokens);
        let colon_spans = find_colon_annotation_spans(&tokens);

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut cursor = 0usize;

        // Merge both rewrite sets by position and replay them over the
        // character stream in order.
        let mut edits: Vec<(usize, usize, String, &'static str)> = Vec::new();
        for &(open, close) in &angle_spans {
            edits.push((open, open + 1, "[".to_string(), "generic_angle"));
            edits.push((close, close + 1, "]".to_string(), "generic_angle"));
        }
        for &colon in &colon_spans {
            edits.push((colon, colon + 1, " ".to_string(), "type_annotation"));
        }
        edits.sort_by_key(|e| e.0);

        for (start, end, replacement, tag) in edits {
            if start < cursor {
                continue; // overlapping edit from a nested case; skip
            }
            out.push_str(&slice(&chars, cursor, start));
            let before = out.pos();
            out.push_str(&replacement);
            map.push(mapping(tag, before, before, end - start));
            cursor = end;
        }
        out.push_str(&slice(&chars, cursor, chars.len()));

        Ok((out.text, map))
    }
}

/// Identify `Ident<...>` spans whose `<` is adjacent to the identifier,
/// returning the char-index of each `<` and its matching `>`.
fn find_generic_angle_spans(tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i + 1 < tokens.len() {
        let ident_adjacent_lt = matches!(&tokens[i].kind, TokenKind::Ident(_))
            && matches!(&tokens[i + 1].kind, TokenKind::Sym("<"))
            && tokens[i].end == tokens[i + 1].start;
        if ident_adjacent_lt {
            if let Some(close_idx) = matching_angle_close(tokens, i + 1) {
                spans.push((tokens[i + 1].start, tokens[close_idx].start));
                i = close_idx + 1;
                continue;
            }
        }
        i += 1;
    }
    spans
}

fn matching_angle_close(tokens: &[Token], open_idx: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (j, tok) in tokens.iter().enumerate().skip(open_idx) {
        match &tok.kind {
            TokenKind::Sym("<") => depth += 1,
            TokenKind::Sym(">") => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            // a `;`, `{`, or EOF before the angle closes means this was
            // never a generic argument list (e.g. a real `<` comparison).
            TokenKind::Sym(";") | TokenKind::Sym("{") | TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

/// Identify `:` spans to collapse into a single space: directly inside a
/// `(...)` parameter list, or directly after `var`/`let`/`const`.
fn find_colon_annotation_spans(tokens: &[Token]) -> Vec<usize> {
    let mut spans = Vec::new();
    let mut paren_depth = 0i32;
    let mut after_decl_keyword = false;

    for (i, tok) in tokens.iter().enumerate() {
        match &tok.kind {
            TokenKind::Sym("(") => paren_depth += 1,
            TokenKind::Sym(")") => paren_depth = (paren_depth - 1).max(0),
            TokenKind::Sym(";") => after_decl_keyword = false,
            TokenKind::Ident(name) if name == "var" || name == "let" || name == "const" => {
                after_decl_keyword = true
            }
            TokenKind::Sym(":") => {
                let preceded_by_ident = i > 0 && matches!(&tokens[i - 1].kind, TokenKind::Ident(_));
                if preceded_by_ident && (paren_depth > 0 || after_decl_keyword) {
                    spans.push(tok.start);
                }
            }
            _ => {}
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_param_colon_annotation() {
        let mut p = TypeAnnotationProcessor::default();
        let (out, _) = p.process("func f(x: int, y: string) {}").unwrap();
        assert_eq!(out, "func f(x  int, y  string) {}");
    }

    #[test]
    fn rewrites_generic_angle_brackets() {
        let mut p = TypeAnnotationProcessor::default();
        let (out, _) = p.process("var x Result<int,error>").unwrap();
        assert_eq!(out, "var x Result[int,error]");
    }

    #[test]
    fn leaves_less_than_comparisons_alone() {
        let mut p = TypeAnnotationProcessor::default();
        let (out, _) = p.process("if a < b { return }").unwrap();
        assert_eq!(out, "if a < b { return }");
    }

    #[test]
    fn leaves_composite_literal_colon_alone() {
        let mut p = TypeAnnotationProcessor::default();
        let (out, _) = p.process("x := Point{x: 1, y: 2}").unwrap();
        assert_eq!(out, "x := Point{x: 1, y: 2}");
    }
}
