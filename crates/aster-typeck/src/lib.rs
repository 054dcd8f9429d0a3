//! Aster typechecker: type, effect, capability, PII, and async-scheduling
//! checks over Core IR.
//!
//! The checker never throws on well-formed IR; every user-facing problem
//! becomes a diagnostic in the shared builder. Configuration (effect
//! prefixes, capability manifest, enforcement switches) arrives as plain
//! data in [`Options`] -- the environment is the driver's business.
//!
//! # Architecture
//!
//! - [`scope`]: hierarchical symbol table with capture/shadow tracking
//! - [`aliases`]: type-alias expansion with cycle detection
//! - [`unify`]: structural unification with named-variable substitution
//! - [`generics`]: declared-vs-used discipline for type/effect parameters
//! - [`builtins`]: signatures of the standard effectful modules
//! - [`effects`]: prefix-based and transitive effect inference
//! - [`caps`]: allow/deny capability enforcement
//! - [`asyncck`]: control-flow-sensitive Start/Wait analysis
//! - `check`: the driver walking declarations and bodies

pub mod aliases;
pub mod asyncck;
pub mod builtins;
pub mod caps;
mod check;
pub mod effects;
pub mod generics;
pub mod scope;
pub mod unify;

use std::sync::Arc;

use aster_common::config::{CapabilityManifest, EffectConfig};
use aster_common::diag::Diagnostics;
use aster_ir::ir;

/// Checker configuration, assembled by the driver.
#[derive(Clone)]
pub struct Options {
    pub effect_config: Arc<EffectConfig>,
    pub capabilities: Option<Arc<CapabilityManifest>>,
    pub enforce_capabilities: bool,
    /// Log resolved binding types at debug level.
    pub debug_types: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            effect_config: Arc::new(EffectConfig::default()),
            capabilities: None,
            enforce_capabilities: true,
            debug_types: false,
        }
    }
}

/// Check a module, appending every finding to `diags`.
pub fn check_module(module: &ir::Module, options: &Options, diags: &mut Diagnostics) {
    check::run(module, options, diags);
}
