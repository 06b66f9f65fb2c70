//! `dingoc`: compiles a `.dingo` source file to plain Go.

mod cli;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use cli::{Cli, Commands, SourcemapEmit};
use dingo::config::Config;
use dingo::driver::compile_source;
use log::error;

fn main() -> ExitCode {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).expect("failed to initialize logger");

    match args.command {
        Commands::Compile(compile_args) => {
            let config = match build_config(&compile_args) {
                Ok(c) => c,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            let source = match fs::read_to_string(&compile_args.file) {
                Ok(s) => s,
                Err(e) => {
                    error!("failed to read {}: {e}", compile_args.file.display());
                    return ExitCode::FAILURE;
                }
            };

            let file_name = compile_args.file.to_string_lossy().into_owned();
            let output = match compile_source(&file_name, &source, &config) {
                Ok(o) => o,
                Err(e) => {
                    error!("{}", e.render(&file_name, &dingo::sourcemap::SourceMap::default()));
                    return ExitCode::FAILURE;
                }
            };

            for rendered in &output.rendered_errors {
                error!("{rendered}");
            }

            let out_path = compile_args.output.clone().unwrap_or_else(|| with_go_extension(&compile_args.file));
            if let Err(e) = fs::write(&out_path, &output.go_source) {
                error!("failed to write {}: {e}", out_path.display());
                return ExitCode::FAILURE;
            }

            if let Err(e) = emit_sourcemap(&compile_args.emit_sourcemap, &out_path, &output) {
                error!("failed to write source map: {e}");
                return ExitCode::FAILURE;
            }

            if output.errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn build_config(args: &cli::CompileArgs) -> Result<Config, dingo::errors::CompileError> {
    let mut overrides = String::new();
    if let Some(syntax) = &args.match_syntax {
        overrides.push_str(&format!("[match]\nsyntax = \"{syntax}\"\n"));
    }
    if let Some(inference) = &args.none_inference {
        overrides.push_str(&format!("[features]\nnone_type_inference = \"{inference}\"\n"));
    }
    let user_file = dirs_config_path();
    Config::load(
        user_file.as_deref(),
        args.config.as_deref(),
        if overrides.is_empty() { None } else { Some(overrides.as_str()) },
    )
}

fn dirs_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".dingo.toml"))
}

fn with_go_extension(path: &std::path::Path) -> PathBuf {
    path.with_extension("go")
}

fn emit_sourcemap(mode: &SourcemapEmit, go_path: &std::path::Path, output: &dingo::driver::CompileOutput) -> std::io::Result<()> {
    match mode {
        SourcemapEmit::Off => Ok(()),
        SourcemapEmit::External => {
            let map_path = go_path.with_extension("go.map");
            let json = serde_json::to_string_pretty(&output.sourcemap).expect("source map is always serializable");
            fs::write(map_path, json)
        }
        SourcemapEmit::Inline => {
            let json = serde_json::to_string(&output.sourcemap).expect("source map is always serializable");
            let encoded = base64_encode(json.as_bytes());
            let comment = format!("\n//# dingoSourceMappingURL=data:application/json;base64,{encoded}\n");
            let mut contents = output.go_source.clone();
            contents.push_str(&comment);
            fs::write(go_path, contents)
        }
    }
}

/// Minimal base64 encoder for the inline source-map data URL; avoids pulling
/// in a dedicated `base64` dependency for one call site.
fn base64_encode(data: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((data.len() + 2) / 3 * 4);
    for chunk in data.chunks(3) {
        let b0 = chunk[0];
        let b1 = *chunk.get(1).unwrap_or(&0);
        let b2 = *chunk.get(2).unwrap_or(&0);
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize] as char);
        out.push(if chunk.len() > 1 { ALPHABET[(((b1 & 0x0f) << 2) | (b2 >> 6)) as usize] as char } else { '=' });
        out.push(if chunk.len() > 2 { ALPHABET[(b2 & 0x3f) as usize] as char } else { '=' });
    }
    out
}
