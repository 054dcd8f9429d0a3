//! Effect inference and declaration conformance.
//!
//! A function's required effect set is `declared ∪ inferred`. Inferred
//! effects come from direct calls classified by the effect-prefix
//! configuration (or known builtin signatures), and transitively from
//! calls to user-defined functions whose own required set is nonempty.
//! The transitive closure is a fixpoint over the in-module call graph.
//!
//! Declared strictly below inferred is an error (`EFFECT_NOT_DECLARED`);
//! declared strictly above is informational (`EFFECT_OVER_DECLARED`).
//! Effect variables are row placeholders and take no part in the set
//! comparison.

use std::collections::BTreeSet;

use aster_common::config::EffectConfig;
use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use rustc_hash::FxHashMap;

use crate::check::{CallSite, FuncSig};

/// Required (declared ∪ inferred) concrete effects per function, computed
/// to fixpoint. Also emits the conformance diagnostics.
pub(crate) fn analyze(
    funcs: &FxHashMap<String, FuncSig>,
    sites: &[CallSite],
    config: &EffectConfig,
    diags: &mut Diagnostics,
) -> FxHashMap<String, BTreeSet<Effect>> {
    // Direct contributions and user-call edges per function.
    let mut direct: FxHashMap<String, BTreeSet<Effect>> = FxHashMap::default();
    let mut edges: FxHashMap<String, BTreeSet<String>> = FxHashMap::default();
    for name in funcs.keys() {
        direct.insert(name.clone(), BTreeSet::new());
        edges.insert(name.clone(), BTreeSet::new());
    }
    for site in sites {
        let Some(direct_set) = direct.get_mut(&site.caller) else {
            continue;
        };
        direct_set.extend(classify_direct(site, config));
        if site.is_user_func && funcs.contains_key(&site.callee) {
            edges
                .get_mut(&site.caller)
                .expect("caller registered above")
                .insert(site.callee.clone());
        }
    }

    let declared: FxHashMap<String, BTreeSet<Effect>> = funcs
        .iter()
        .map(|(name, sig)| (name.clone(), concrete(&sig.declared_effects)))
        .collect();

    // Fixpoint: inferred = direct ∪ required of every user callee.
    let mut inferred = direct.clone();
    loop {
        let mut changed = false;
        for (name, callees) in &edges {
            let mut addition = BTreeSet::new();
            for callee in callees {
                addition.extend(declared[callee].iter().cloned());
                addition.extend(inferred[callee].iter().cloned());
            }
            let set = inferred.get_mut(name).expect("all functions seeded");
            let before = set.len();
            set.extend(addition);
            changed |= set.len() != before;
        }
        if !changed {
            break;
        }
    }

    // Conformance per function.
    let mut required = FxHashMap::default();
    for (name, sig) in funcs {
        let declared_set = &declared[name];
        let inferred_set = &inferred[name];
        let span = sig.span;

        let missing: Vec<&Effect> = inferred_set.difference(declared_set).collect();
        if !missing.is_empty() {
            diags.emit(
                "E301",
                span,
                &[("name", name.clone()), ("effects", join(&missing))],
            );
        }
        let over: Vec<&Effect> = declared_set.difference(inferred_set).collect();
        if !over.is_empty() {
            diags.emit(
                "W031",
                span,
                &[("name", name.clone()), ("effects", join(&over))],
            );
        }

        let mut all = declared_set.clone();
        all.extend(inferred_set.iter().cloned());
        required.insert(name.clone(), all);
    }
    required
}

/// The effects one call site contributes on its own (no transitivity):
/// the resolved callee signature's effects plus the prefix classification.
pub(crate) fn classify_direct(site: &CallSite, config: &EffectConfig) -> BTreeSet<Effect> {
    let mut effects = concrete(&site.effects_hint);
    if !site.is_user_func {
        if let Some(effect) = config.classify(&site.callee) {
            effects.insert(effect);
        }
    }
    effects
}

/// The full effect set exercised by one call site, transitive closure
/// included.
pub(crate) fn site_effects(
    site: &CallSite,
    required: &FxHashMap<String, BTreeSet<Effect>>,
    config: &EffectConfig,
) -> BTreeSet<Effect> {
    let mut effects = classify_direct(site, config);
    if site.is_user_func {
        if let Some(callee_required) = required.get(&site.callee) {
            effects.extend(callee_required.iter().cloned());
        }
    }
    effects
}

fn concrete(effects: &[Effect]) -> BTreeSet<Effect> {
    effects.iter().filter(|e| !e.is_var()).cloned().collect()
}

fn join(effects: &[&Effect]) -> String {
    effects
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(" and ")
}
