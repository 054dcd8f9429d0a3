//! Capability enforcement.
//!
//! When a manifest is supplied, every call site with a nonempty effect set
//! is checked: the fully qualified callee must match no deny pattern and
//! at least one allow pattern for every capability its effects imply.
//! Qualified names are interned and verdicts cached, since the same
//! callee/capability pair recurs across a module.

use std::collections::BTreeSet;

use aster_common::config::{CapVerdict, CapabilityManifest, EffectConfig};
use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use aster_common::intern::Name;
use rustc_hash::FxHashMap;

use crate::check::CallSite;
use crate::effects;

pub(crate) fn enforce(
    sites: &[CallSite],
    required: &FxHashMap<String, BTreeSet<Effect>>,
    config: &EffectConfig,
    manifest: &CapabilityManifest,
    module_name: &str,
    diags: &mut Diagnostics,
) {
    let mut verdicts: FxHashMap<(Name, Effect), CapVerdict> = FxHashMap::default();
    for site in sites {
        let effect_set = effects::site_effects(site, required, config);
        if effect_set.is_empty() {
            continue;
        }
        let qualified = if site.is_user_func {
            format!("{module_name}.{}", site.callee)
        } else {
            site.callee.clone()
        };
        let name = Name::intern(&qualified);
        for effect in effect_set {
            let verdict = *verdicts
                .entry((name, effect.clone()))
                .or_insert_with(|| manifest.permits(&effect.capability(), name.as_str()));
            let code = match verdict {
                CapVerdict::Allowed => continue,
                CapVerdict::Denied => "E351",
                CapVerdict::NotAllowed => "E352",
            };
            diags.emit(
                code,
                site.span,
                &[
                    ("name", qualified.clone()),
                    ("capability", effect.capability()),
                ],
            );
        }
    }
}
