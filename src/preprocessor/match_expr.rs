//! Match processor: lowers `match E { P => ARM, ... }` into a Go `switch`
//! skeleton plus `DINGO_MATCH_*`/`DINGO_PATTERN` comment markers (§4.2,
//! "Match processor (Rust variant)"). Only the Rust-style `match`/`=>`
//! surface syntax is implemented here; a `swift`-style variant (selected
//! by `match.syntax`) reuses the same brace-aware arm scanning and only
//! differs in its arm-separator grammar, so it is a thin wrapper over the
//! same core.

use std::collections::HashMap;

use super::{mapping, OutputBuilder, Preprocessor};
use crate::config::MatchSyntax;
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{slice, tokenize_with_chars, Token, TokenKind};
use crate::sourcemap::SourceMap;

pub struct MatchProcessor {
    syntax: MatchSyntax,
}

impl MatchProcessor {
    pub fn new(syntax: MatchSyntax) -> Self {
        Self { syntax }
    }
}

impl Default for MatchProcessor {
    fn default() -> Self {
        Self::new(MatchSyntax::Rust)
    }
}

struct Arm {
    pattern_text: String,
    variant: String,
    binding: Option<String>,
    guard: Option<String>,
    body_text: String,
}

/// Where the result of an assignment-context match (§4.2 point 5) goes:
/// the target name, the type of the `var` declaration emitted ahead of
/// the temp (an explicit declared type if the source gave one, else the
/// conservative `any` guess), and the char offset the original
/// `:=`/`var`/`=` prefix starts at, so `process` can skip re-emitting it.
struct Hoist {
    result_name: String,
    type_text: Option<String>,
    prefix_start: usize,
    prefix_pos: crate::sourcemap::Position,
}

impl Preprocessor for MatchProcessor {
    fn name(&self) -> &'static str {
        "match"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax, e.message, e.pos))?;
        let variant_enum = scan_enum_metadata(&tokens, &chars);

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut emit_cursor = 0usize;
        let mut ti = 0usize;
        let mut counter = 0u32;

        while ti < tokens.len() {
            match &tokens[ti].kind {
                TokenKind::Eof => break,
                TokenKind::Ident(name) if name == "match" => {
                    let match_pos = tokens[ti].pos;
                    let match_start = tokens[ti].start;
                    let hoist = detect_hoist(&tokens, ti);
                    match parse_match(&tokens, ti, &chars, self.syntax) {
                        Some((scrutinee_text, arms, end_idx)) => {
                            let prefix_end = hoist.as_ref().map_or(match_start, |h| h.prefix_start);
                            let span_pos = hoist.as_ref().map_or(match_pos, |h| h.prefix_pos);
                            if prefix_end > emit_cursor {
                                out.push_str(&slice(&chars, emit_cursor, prefix_end));
                            }
                            let render_pos = out.pos();
                            let rendered = render_match(
                                counter,
                                &scrutinee_text,
                                &arms,
                                &variant_enum,
                                hoist.as_ref(),
                            );
                            out.push_str(&rendered);
                            map.push(mapping(
                                "match",
                                render_pos,
                                span_pos,
                                tokens[end_idx].end - prefix_end,
                            ));
                            counter += 1;
                            emit_cursor = tokens[end_idx].end;
                            ti = end_idx + 1;
                        }
                        None => {
                            return Err(CompileError::new(
                                CompileErrorKind::Syntax,
                                "malformed `match` expression",
                                match_pos,
                            ));
                        }
                    }
                }
                _ => ti += 1,
            }
        }

        out.push_str(&slice(&chars, emit_cursor, chars.len()));
        Ok((out.text, map))
    }
}

/// `variant name -> enum name`, recovered by scanning `__dg_enum_meta_*`
/// variables the enum processor already left in the text.
fn scan_enum_metadata(tokens: &[Token], chars: &[char]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (i, tok) in tokens.iter().enumerate() {
        let TokenKind::Ident(name) = &tok.kind else {
            continue;
        };
        let Some(enum_name) = name.strip_prefix(crate::context::type_info::ENUM_META_PREFIX) else {
            continue;
        };
        // scan forward for string literals until the closing `}`
        let mut j = i + 1;
        while j < tokens.len() && !matches!(tokens[j].kind, TokenKind::Sym("{")) {
            j += 1;
        }
        while j < tokens.len() && !matches!(tokens[j].kind, TokenKind::Sym("}")) {
            if let TokenKind::String(_) = &tokens[j].kind {
                let raw = slice(chars, tokens[j].start + 1, tokens[j].end - 1);
                let variant = raw.split('|').next().unwrap_or_default().to_string();
                if !variant.is_empty() {
                    map.insert(variant, enum_name.to_string());
                }
            }
            j += 1;
        }
    }
    map
}

/// Finds the token immediately before `idx`, skipping comments.
fn prev_non_comment(tokens: &[Token], idx: usize) -> Option<usize> {
    let mut k = idx;
    while k > 0 {
        k -= 1;
        if !matches!(tokens[k].kind, TokenKind::Comment(_)) {
            return Some(k);
        }
    }
    None
}

/// Recognizes the token sequence immediately preceding a `match` token
/// as one of the assignment-context forms §4.2 point 5 hoists:
/// `name := match`, `name = match`, `var name = match`, or
/// `var name Type = match`. Anything else (the match used as a call
/// argument, a return value, or a bare statement) is left alone.
fn detect_hoist(tokens: &[Token], match_idx: usize) -> Option<Hoist> {
    let op_idx = prev_non_comment(tokens, match_idx)?;
    let is_define = matches!(tokens[op_idx].kind, TokenKind::Sym(":="));
    let is_assign = matches!(tokens[op_idx].kind, TokenKind::Sym("="));
    if !is_define && !is_assign {
        return None;
    }

    let name_idx = prev_non_comment(tokens, op_idx)?;
    let TokenKind::Ident(name) = &tokens[name_idx].kind else {
        return None;
    };

    if is_define {
        return Some(Hoist {
            result_name: name.clone(),
            type_text: None,
            prefix_start: tokens[name_idx].start,
            prefix_pos: tokens[name_idx].pos,
        });
    }

    // `var name = match ...`
    if let Some(var_idx) = prev_non_comment(tokens, name_idx) {
        if matches!(&tokens[var_idx].kind, TokenKind::Ident(k) if k == "var") {
            return Some(Hoist {
                result_name: name.clone(),
                type_text: None,
                prefix_start: tokens[var_idx].start,
                prefix_pos: tokens[var_idx].pos,
            });
        }
    }

    // `var name Type = match ...` (single-token Type only; a multi-token
    // type falls back to the conservative guess rather than failing).
    if let Some(real_name_idx) = prev_non_comment(tokens, name_idx) {
        if let TokenKind::Ident(real_name) = &tokens[real_name_idx].kind {
            if let Some(var_idx) = prev_non_comment(tokens, real_name_idx) {
                if matches!(&tokens[var_idx].kind, TokenKind::Ident(k) if k == "var") {
                    return Some(Hoist {
                        result_name: real_name.clone(),
                        type_text: Some(name.clone()),
                        prefix_start: tokens[var_idx].start,
                        prefix_pos: tokens[var_idx].pos,
                    });
                }
            }
        }
    }

    // plain reassignment: `name = match ...`
    Some(Hoist {
        result_name: name.clone(),
        type_text: None,
        prefix_start: tokens[name_idx].start,
        prefix_pos: tokens[name_idx].pos,
    })
}

/// Parse `match E { arms }`, returning the scrutinee text, parsed arms,
/// and the index of the closing `}`.
fn parse_match(
    tokens: &[Token],
    match_idx: usize,
    chars: &[char],
    syntax: MatchSyntax,
) -> Option<(String, Vec<Arm>, usize)> {
    let mut i = match_idx + 1;
    let scrutinee_start = tokens.get(i)?.start;
    let mut depth = 0i32;
    while !(depth == 0 && matches!(tokens.get(i)?.kind, TokenKind::Sym("{"))) {
        match &tokens.get(i)?.kind {
            TokenKind::Sym("(") | TokenKind::Sym("[") => depth += 1,
            TokenKind::Sym(")") | TokenKind::Sym("]") => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    let scrutinee_end = tokens.get(i.wrapping_sub(1))?.end.max(scrutinee_start);
    let scrutinee_text = slice(chars, scrutinee_start, scrutinee_end).trim().to_string();

    // `i` is the opening `{` of the arm list.
    i += 1;
    let mut arms = Vec::new();
    loop {
        if matches!(tokens.get(i)?.kind, TokenKind::Sym("}")) {
            break;
        }
        let (mut pattern_text, variant, binding, next_i) = parse_pattern(tokens, i, chars)?;
        i = next_i;

        let mut guard = None;
        if matches!(tokens.get(i)?.kind, TokenKind::Ident(kw) if kw == "if") {
            let (guard_text, next_i) = parse_guard_expr(tokens, i + 1, chars, syntax)?;
            pattern_text = format!("{} if {}", pattern_text, guard_text);
            guard = Some(guard_text);
            i = next_i;
        }

        let arrow_ok = match syntax {
            MatchSyntax::Rust => matches!(tokens.get(i)?.kind, TokenKind::Sym("=>")),
            MatchSyntax::Swift => matches!(tokens.get(i)?.kind, TokenKind::Sym(":")),
        };
        if !arrow_ok {
            return None;
        }
        i += 1;

        let (body_text, next_i) = parse_arm_body(tokens, i, chars)?;
        i = next_i;

        arms.push(Arm {
            pattern_text,
            variant,
            binding,
            guard,
            body_text,
        });

        if matches!(tokens.get(i)?.kind, TokenKind::Sym(",")) {
            i += 1;
        }
    }

    Some((scrutinee_text, arms, i))
}

/// Parses one pattern: `_`, `Ident`, or `Ident(binding)`.
fn parse_pattern(tokens: &[Token], start: usize, chars: &[char]) -> Option<(String, String, Option<String>, usize)> {
    let mut i = start;
    let text_start = tokens.get(i)?.start;
    match &tokens.get(i)?.kind {
        TokenKind::Ident(name) if name == "_" => {
            i += 1;
            Some(("_".to_string(), "_".to_string(), None, i))
        }
        TokenKind::Ident(name) => {
            let variant = name.clone();
            i += 1;
            let mut binding = None;
            if matches!(tokens.get(i)?.kind, TokenKind::Sym("(")) {
                i += 1;
                if let TokenKind::Ident(b) = &tokens.get(i)?.kind {
                    binding = Some(b.clone());
                    i += 1;
                }
                if !matches!(tokens.get(i)?.kind, TokenKind::Sym(")")) {
                    return None;
                }
                i += 1;
            }
            let text_end = tokens.get(i - 1)?.end;
            let text = slice(chars, text_start, text_end);
            Some((text, variant, binding, i))
        }
        _ => None,
    }
}

/// Parses a pattern guard's condition (`if G`, the `G` already past the
/// `if` keyword), scanning up to the arm's arrow token at bracket depth
/// zero. Returns the guard's raw text and the index of the (unconsumed)
/// arrow token, so the caller's existing arrow check runs unchanged.
fn parse_guard_expr(tokens: &[Token], start: usize, chars: &[char], syntax: MatchSyntax) -> Option<(String, usize)> {
    let text_start = tokens.get(start)?.start;
    let mut i = start;
    let mut depth = 0i32;
    loop {
        match &tokens.get(i)?.kind {
            TokenKind::Sym("(") | TokenKind::Sym("[") | TokenKind::Sym("{") => depth += 1,
            TokenKind::Sym(")") | TokenKind::Sym("]") | TokenKind::Sym("}") => depth -= 1,
            TokenKind::Sym("=>") if depth == 0 && matches!(syntax, MatchSyntax::Rust) => break,
            TokenKind::Sym(":") if depth == 0 && matches!(syntax, MatchSyntax::Swift) => break,
            TokenKind::Eof => return None,
            _ => {}
        }
        i += 1;
    }
    let text_end = tokens.get(i.wrapping_sub(1))?.end.max(text_start);
    Some((slice(chars, text_start, text_end).trim().to_string(), i))
}

/// Parses an arm body: a brace block copied verbatim, or an expression up
/// to the next top-level `,`/`}`.
fn parse_arm_body(tokens: &[Token], start: usize, chars: &[char]) -> Option<(String, usize)> {
    let mut i = start;
    if matches!(tokens.get(i)?.kind, TokenKind::Sym("{")) {
        let body_start = tokens.get(i)?.start;
        let mut depth = 0i32;
        loop {
            match &tokens.get(i)?.kind {
                TokenKind::Sym("{") => depth += 1,
                TokenKind::Sym("}") => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let body_end = tokens.get(i - 1)?.end;
        return Some((slice(chars, body_start, body_end), i));
    }

    let body_start = tokens.get(i)?.start;
    let mut depth = 0i32;
    while i < tokens.len() {
        match &tokens[i].kind {
            TokenKind::Sym("(") | TokenKind::Sym("[") | TokenKind::Sym("{") => depth += 1,
            TokenKind::Sym(")") | TokenKind::Sym("]") | TokenKind::Sym("}") if depth == 0 => break,
            TokenKind::Sym(")") | TokenKind::Sym("]") | TokenKind::Sym("}") => depth -= 1,
            TokenKind::Sym(",") if depth == 0 => break,
            _ => {}
        }
        i += 1;
    }
    let body_end = tokens.get(i.saturating_sub(1))?.end.max(body_start);
    Some((slice(chars, body_start, body_end), i))
}

fn tag_for(variant: &str, enum_of: &HashMap<String, String>) -> String {
    match variant {
        "Ok" => "ResultTagOk".to_string(),
        "Err" => "ResultTagErr".to_string(),
        "Some" => "OptionTagSome".to_string(),
        "None" => "OptionTagNone".to_string(),
        "_" => String::new(),
        other => match enum_of.get(other) {
            Some(enum_name) => format!("{}Tag{}", enum_name, other),
            None => format!("/* unresolved variant */ {}", other),
        },
    }
}

fn binding_expr(variant: &str, binding: &str) -> String {
    match variant {
        "Ok" | "Some" => format!("{} := *__match_N.{}_0", binding, variant.to_lowercase()),
        "Err" => format!("{} := __match_N.err_0", binding),
        other => format!("{} := *__match_N.{}_0", binding, other.to_lowercase()),
    }
}

/// Renders the `var <result> <Type>` declaration a hoisted match needs
/// ahead of its temp assignment, or nothing for a statement-context
/// match.
fn render_hoist_decl(hoist: Option<&Hoist>) -> String {
    match hoist {
        Some(h) => format!("var {} {}\n", h.result_name, h.type_text.as_deref().unwrap_or("any")),
        None => String::new(),
    }
}

/// Rewrites an arm body to `result = ARM` for a hoisted match (§4.2 point
/// 5), including the wildcard/default arm. A brace-block body is left
/// untouched: those arms use statement-style control flow (`{ return
/// ... }`) rather than a value the hoisted variable can be assigned from.
fn hoisted_body(body_text: &str, result_name: &str) -> String {
    if body_text.trim_start().starts_with('{') {
        body_text.to_string()
    } else {
        format!("{} = {}", result_name, body_text.trim())
    }
}

fn arm_body(arm: &Arm, hoist: Option<&Hoist>) -> String {
    match hoist {
        Some(h) => hoisted_body(&arm.body_text, &h.result_name),
        None => arm.body_text.clone(),
    }
}

/// Dispatches to the plain `switch`-on-tag rendering, or — when any arm
/// carries a pattern guard — to an `if`/`else if` chain, since Go's
/// `switch` cannot re-test a case whose guard fails (nor can two arms
/// share the same tag as separate `case`s; that's a duplicate-case
/// compile error).
fn render_match(n: u32, scrutinee: &str, arms: &[Arm], enum_of: &HashMap<String, String>, hoist: Option<&Hoist>) -> String {
    if arms.iter().any(|a| a.guard.is_some()) {
        render_guarded_chain(n, scrutinee, arms, enum_of, hoist)
    } else {
        render_switch(n, scrutinee, arms, enum_of, hoist)
    }
}

fn render_switch(n: u32, scrutinee: &str, arms: &[Arm], enum_of: &HashMap<String, String>, hoist: Option<&Hoist>) -> String {
    let temp = format!("__match_{}", n);
    let mut s = String::new();
    s.push_str(&render_hoist_decl(hoist));
    s.push_str(&format!("{} := {}\n", temp, scrutinee));
    s.push_str(&format!("// DINGO_MATCH_START: {}\n", scrutinee));
    s.push_str(&format!("switch {}.tag {{\n", temp));

    for arm in arms {
        if arm.variant == "_" {
            s.push_str("default:\n");
        } else {
            s.push_str(&format!("case {}:\n", tag_for(&arm.variant, enum_of)));
        }
        s.push_str(&format!("// DINGO_PATTERN: {}\n", arm.pattern_text));
        if let Some(binding) = &arm.binding {
            let expr = binding_expr(&arm.variant, binding).replace("__match_N", &temp);
            s.push_str(&expr);
            s.push('\n');
        }
        s.push_str(&arm_body(arm, hoist));
        s.push('\n');
    }

    s.push_str("}\n");
    s.push_str("// DINGO_MATCH_END\n");
    s
}

/// Lowers a match with at least one guarded arm to an `if`/`else if`
/// chain keyed on `<temp>.tag == TAG (&& guard)`, in arm order, with a
/// trailing wildcard arm (if any) as the final bare `else`.
fn render_guarded_chain(n: u32, scrutinee: &str, arms: &[Arm], enum_of: &HashMap<String, String>, hoist: Option<&Hoist>) -> String {
    let temp = format!("__match_{}", n);
    let mut s = String::new();
    s.push_str(&render_hoist_decl(hoist));
    s.push_str(&format!("{} := {}\n", temp, scrutinee));
    s.push_str(&format!("// DINGO_MATCH_START: {}\n", scrutinee));

    for (idx, arm) in arms.iter().enumerate() {
        let is_wildcard = arm.variant == "_";
        if idx == 0 {
            if is_wildcard {
                s.push_str("{\n");
            } else {
                s.push_str(&format!("if {} {{\n", arm_condition(&temp, arm, enum_of)));
            }
        } else if is_wildcard {
            s.push_str("} else {\n");
        } else {
            s.push_str(&format!("}} else if {} {{\n", arm_condition(&temp, arm, enum_of)));
        }
        s.push_str(&format!("// DINGO_PATTERN: {}\n", arm.pattern_text));
        if let Some(binding) = &arm.binding {
            let expr = binding_expr(&arm.variant, binding).replace("__match_N", &temp);
            s.push_str(&expr);
            s.push('\n');
        }
        s.push_str(&arm_body(arm, hoist));
        s.push('\n');
    }

    s.push_str("}\n");
    s.push_str("// DINGO_MATCH_END\n");
    s
}

fn arm_condition(temp: &str, arm: &Arm, enum_of: &HashMap<String, String>) -> String {
    let tag_cmp = format!("{}.tag == {}", temp, tag_for(&arm.variant, enum_of));
    match &arm.guard {
        Some(g) => format!("{} && ({})", tag_cmp, g),
        None => tag_cmp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_exhaustive_result_match() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let (out, map) = p
            .process("y := match r { Ok(v) => v*2, Err(e) => 0 }")
            .unwrap();
        assert!(out.contains("var y any"));
        assert!(out.contains("__match_0 := r"));
        assert!(out.contains("case ResultTagOk:"));
        assert!(out.contains("v := *__match_0.ok_0"));
        assert!(out.contains("y = v*2"));
        assert!(out.contains("case ResultTagErr:"));
        assert!(out.contains("e := __match_0.err_0"));
        assert!(out.contains("y = 0"));
        assert!(!out.contains("y := __match_0"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn hoists_explicit_var_type_for_assignment_context_match() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let (out, _) = p
            .process("var y int = match r { Ok(v) => v*2, Err(e) => 0 }")
            .unwrap();
        assert!(out.contains("var y int"));
        assert!(out.contains("y = v*2"));
        assert!(out.contains("y = 0"));
        assert!(!out.contains("var y int = __match_0"));
    }

    #[test]
    fn does_not_hoist_match_outside_assignment_context() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let (out, _) = p.process("return match r { Ok(v) => v, Err(e) => 0 }").unwrap();
        assert!(!out.contains("var "));
        assert!(out.contains("case ResultTagOk:"));
    }

    #[test]
    fn lowers_wildcard_arm_to_default() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let (out, _) = p.process("match o { Some(v) => use(v), _ => skip() }").unwrap();
        assert!(out.contains("default:"));
        assert!(out.contains("// DINGO_PATTERN: _"));
    }

    #[test]
    fn resolves_user_enum_variant_tags() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let src = "var __dg_enum_meta_Shape = []string{\"Circle|radius:float64\", \"Point\"}\nmatch s { Circle(r) => area(r), Point => 0 }";
        let (out, _) = p.process(src).unwrap();
        assert!(out.contains("case ShapeTagCircle:"));
        assert!(out.contains("r := *__match_0.circle_0"));
        assert!(out.contains("case ShapeTagPoint:"));
    }

    #[test]
    fn parses_guarded_arm_into_if_else_chain() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let src = "match r { Ok(v) if v > 0 => pos(v), Ok(v) => nonpos(v), Err(e) => fail(e) }";
        let (out, _) = p.process(src).unwrap();
        assert!(out.contains("if __match_0.tag == ResultTagOk && (v > 0) {"));
        assert!(out.contains("} else if __match_0.tag == ResultTagOk {"));
        assert!(out.contains("} else if __match_0.tag == ResultTagErr {"));
        assert!(out.contains("// DINGO_PATTERN: Ok(v) if v > 0"));
        assert!(!out.contains("switch"));
    }

    #[test]
    fn guarded_match_hoists_into_assignment_too() {
        let mut p = MatchProcessor::new(MatchSyntax::Rust);
        let src = "y := match r { Ok(v) if v > 0 => v, _ => 0 }";
        let (out, _) = p.process(src).unwrap();
        assert!(out.contains("var y any"));
        assert!(out.contains("y = v"));
        assert!(out.contains("} else {\n// DINGO_PATTERN: _\ny = 0"));
    }
}
