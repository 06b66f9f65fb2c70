//! Top-level pipeline: preprocess → parse → build context → run the plugin
//! pipeline → print. The one entry point every front end (the `dingoc`
//! binary, integration tests) calls instead of wiring the stages by hand.

use crate::config::Config;
use crate::context::Context;
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast;
use crate::plugins;
use crate::preprocessor;
use crate::sourcemap::SourceMapDocument;

/// Everything a caller needs out of one compile: the emitted Go source, the
/// source map document (§6.4), and any diagnostics the plugin pipeline
/// accumulated (a non-empty list here does not necessarily mean `go_source`
/// is unusable — exhaustiveness/inference errors are reported per-site, not
/// fatal to the rest of the file).
pub struct CompileOutput {
    pub go_source: String,
    pub sourcemap: SourceMapDocument,
    pub errors: Vec<CompileError>,
    /// `errors`, pre-rendered as `file:line:col: kind: message` against the
    /// original source, for front ends that just want to print diagnostics.
    pub rendered_errors: Vec<String>,
}

/// Runs the full pipeline over one file's source text. `file_name` is only
/// used for the source map document's `file` field and has no bearing on
/// compilation itself.
pub fn compile_source(file_name: &str, source: &str, config: &Config) -> Result<CompileOutput, CompileError> {
    let (preprocessed, mut map) = preprocessor::run_chain(source, config.match_config.syntax)?;

    let file = goast::parse(&preprocessed).map_err(|e| {
        CompileError::new(CompileErrorKind::Parse, e.message, map.lookup(e.pos))
    })?;

    let mut ctx = Context::new(file);
    let injected = plugins::run_pipeline(&mut ctx);

    let go_source = goast::print_file(&ctx.file, &injected);
    let errors = ctx.errors.into_vec();
    let rendered_errors = errors.iter().map(|e| e.render(file_name, &map)).collect();
    let sourcemap = SourceMapDocument::from_source_map(file_name, source, &mut map);

    Ok(CompileOutput {
        go_source,
        sourcemap,
        errors,
        rendered_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_plain_go_unchanged_in_shape() {
        let config = Config::default();
        let out = compile_source("main.dingo", "package main\n\nfunc main() {}\n", &config).unwrap();
        assert!(out.go_source.contains("package main"));
        assert!(out.go_source.contains("func main()"));
        assert!(out.errors.is_empty());
    }

    #[test]
    fn compiles_error_propagation_and_result_injection() {
        let config = Config::default();
        let src = "package main\n\nfunc g() Result[int, error] {\n\treturn Ok(1)\n}\n\nfunc f() Result[int, error] {\n\tx := g()?\n\treturn Ok(x)\n}\n";
        let out = compile_source("main.dingo", src, &config).unwrap();
        assert!(out.go_source.contains("type Result_int_error struct"));
        assert!(out.go_source.contains("if err != nil"));
        assert!(out.errors.is_empty());
    }

    #[test]
    fn reports_parse_error_at_original_position() {
        let config = Config::default();
        let result = compile_source("main.dingo", "package main\n\nfunc f( {\n", &config);
        assert!(result.is_err());
    }
}
