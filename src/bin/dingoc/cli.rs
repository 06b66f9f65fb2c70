//! CLI argument parsing for `dingoc`.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a `.dingo` source file to plain Go.
    Compile(CompileArgs),
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum SourcemapEmit {
    Inline,
    #[default]
    External,
    Off,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// The path to the `.dingo` source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// The path to the output `.go` file (defaults to the input path with a
    /// `.go` extension).
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,

    /// Project-level configuration file (`dingo.toml`), merged over the
    /// user-level one and under any `--feature`/`--match-syntax` overrides.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Override `match.syntax` (`rust` or `swift`).
    #[arg(long = "match-syntax")]
    pub match_syntax: Option<String>,

    /// Override `features.none_type_inference` (`explicit` or `context`).
    #[arg(long = "none-inference")]
    pub none_inference: Option<String>,

    /// How to emit the source map alongside the compiled output.
    #[arg(long = "emit-sourcemap", value_enum, default_value_t = SourcemapEmit::default())]
    pub emit_sourcemap: SourcemapEmit,
}
