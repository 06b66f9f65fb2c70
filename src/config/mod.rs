//! Compiler configuration.
//!
//! Recognized keys per the spec's §4.1 table. Layering (defaults → user file
//! → project file → CLI overrides) is expressed with `figment`, the same
//! provider-based merge library the rest of the corpus reaches for when a
//! config surface grows past a flat key-value file.

use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::errors::{CompileError, CompileErrorKind};
use crate::sourcemap::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSyntax {
    Rust,
    Swift,
}

impl Default for MatchSyntax {
    fn default() -> Self {
        MatchSyntax::Rust
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoneInference {
    Explicit,
    Context,
}

impl Default for NoneInference {
    fn default() -> Self {
        NoneInference::Context
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPropagationSyntax {
    Question,
}

impl Default for ErrorPropagationSyntax {
    fn default() -> Self {
        ErrorPropagationSyntax::Question
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LambdaSyntax {
    Rust,
}

impl Default for LambdaSyntax {
    fn default() -> Self {
        LambdaSyntax::Rust
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcemapFormat {
    Inline,
    External,
}

impl Default for SourcemapFormat {
    fn default() -> Self {
        SourcemapFormat::External
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MatchConfig {
    pub syntax: MatchSyntax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    pub none_type_inference: NoneInference,
    pub error_propagation_syntax: ErrorPropagationSyntax,
    pub lambda_syntax: LambdaSyntax,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            none_type_inference: NoneInference::default(),
            error_propagation_syntax: ErrorPropagationSyntax::default(),
            lambda_syntax: LambdaSyntax::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcemapsConfig {
    pub enabled: bool,
    pub format: SourcemapFormat,
}

impl Default for SourcemapsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: SourcemapFormat::default(),
        }
    }
}

/// Fully-resolved, immutable compiler configuration. Default-complete: every
/// field has a built-in default, so `Config::default()` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
    pub features: FeaturesConfig,
    pub sourcemaps: SourcemapsConfig,
}

impl Config {
    /// Merge built-in defaults, an optional user-level file, an optional
    /// project-level file and CLI overrides, lowest to highest precedence.
    /// `cli_overrides` is itself a (possibly partial) TOML document, built
    /// by the CLI front end from `--feature`-style flags.
    pub fn load(
        user_file: Option<&Path>,
        project_file: Option<&Path>,
        cli_overrides: Option<&str>,
    ) -> Result<Config, CompileError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = user_file {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        if let Some(path) = project_file {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        if let Some(overrides) = cli_overrides {
            figment = figment.merge(Toml::string(overrides));
        }

        let config: Config = figment.extract().map_err(|err| {
            CompileError::new(
                CompileErrorKind::Config,
                format!("failed to load configuration: {err}"),
                Position::new(1, 1),
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject unknown/invalid values. `figment`/`serde` already reject
    /// values outside the recognized enum domains during `extract`, so this
    /// only needs to check cross-field invariants, kept here so future keys
    /// with such invariants have a natural home.
    pub fn validate(&self) -> Result<(), CompileError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = Config::default();
        assert_eq!(config.match_config.syntax, MatchSyntax::Rust);
        assert_eq!(
            config.features.none_type_inference,
            NoneInference::Context
        );
        assert_eq!(
            config.features.error_propagation_syntax,
            ErrorPropagationSyntax::Question
        );
        assert_eq!(config.features.lambda_syntax, LambdaSyntax::Rust);
        assert!(config.sourcemaps.enabled);
        assert_eq!(config.sourcemaps.format, SourcemapFormat::External);
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let config = Config::load(None, None, Some("[match]\nsyntax = \"swift\"\n")).unwrap();
        assert_eq!(config.match_config.syntax, MatchSyntax::Swift);
    }

    #[test]
    fn rejects_unknown_enum_value() {
        let result = Config::load(None, None, Some("[match]\nsyntax = \"pascal\"\n"));
        assert!(result.is_err());
    }
}
