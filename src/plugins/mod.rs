//! The Discovery → Transform → Inject plugin pipeline (§5).
//!
//! All plugins complete Discovery before any Transform runs, and all
//! Transform complete before any Inject runs; within a phase, plugins run
//! in a fixed declaration order. That order is expressed once, here, as
//! the literal list passed to [`run_pipeline`] — each phase loop walks the
//! same `Vec` of trait objects, so declaration order and phase order can
//! never drift apart.

mod error_propagation;
mod lambda;
mod none_inference;
mod pattern_match;
mod result_option;
mod user_enum;
mod walk;

pub use error_propagation::ErrorPropagationPlugin;
pub use lambda::LambdaPlugin;
pub use none_inference::NoneInferencePlugin;
pub use pattern_match::PatternMatchPlugin;
pub use result_option::ResultOptionPlugin;
pub use user_enum::UserEnumPlugin;

use crate::context::Context;
use crate::goast::ast::Decl;

/// One pipeline stage. A plugin that has nothing to do in a phase simply
/// keeps that method's default no-op.
pub trait Plugin {
    fn name(&self) -> &'static str;

    fn discover(&mut self, _ctx: &mut Context) {}

    fn transform(&mut self, _ctx: &mut Context) {}

    fn inject(&mut self, _ctx: &mut Context) -> Vec<Decl> {
        Vec::new()
    }
}

/// Runs every plugin's Discovery phase, then every plugin's Transform
/// phase, then every plugin's Inject phase, in the fixed order
/// (Result/Option → Pattern-Match → None-Context → Error-Propagation →
/// Lambda → User-Enum), and returns the combined injected-declarations
/// list (the second, position-free AST of §4.11).
///
/// Halts before running a plugin once `ctx.errors` is saturated, so a
/// broken file accumulates at most `MAX_ERRORS` diagnostics instead of
/// running every remaining phase over an input already known to be
/// unsalvageable.
pub fn run_pipeline(ctx: &mut Context) -> Vec<Decl> {
    let mut plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(ResultOptionPlugin::default()),
        Box::new(PatternMatchPlugin::default()),
        Box::new(NoneInferencePlugin::default()),
        Box::new(ErrorPropagationPlugin::default()),
        Box::new(LambdaPlugin::default()),
        Box::new(UserEnumPlugin::default()),
    ];

    for plugin in plugins.iter_mut() {
        if ctx.errors.is_saturated() {
            log::debug!("error accumulator saturated, halting before discovery completes");
            return Vec::new();
        }
        log::debug!("plugin discovery: {}", plugin.name());
        plugin.discover(ctx);
    }
    for plugin in plugins.iter_mut() {
        if ctx.errors.is_saturated() {
            log::debug!("error accumulator saturated, halting before transform completes");
            return Vec::new();
        }
        log::debug!("plugin transform: {}", plugin.name());
        plugin.transform(ctx);
    }
    let mut injected = Vec::new();
    for plugin in plugins.iter_mut() {
        if ctx.errors.is_saturated() {
            log::debug!("error accumulator saturated, halting before inject completes");
            return injected;
        }
        log::debug!("plugin inject: {}", plugin.name());
        injected.extend(plugin.inject(ctx));
    }
    injected
}
