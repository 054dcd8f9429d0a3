//! Declared-versus-used discipline for type and effect parameters.
//!
//! For each function: type variables used in the signature but not
//! declared are errors; declared but unused ones are warnings (never
//! upgraded). Unknown short uppercase names that look like type variables
//! get their own error distinct from a plain unknown type. The same
//! scheme applies to effect variables.

use aster_common::diag::Diagnostics;
use aster_common::effect::Effect;
use aster_common::span::Span;
use aster_ir::ir;
use rustc_hash::FxHashSet;

/// Check one function signature's generics discipline.
///
/// `known_types` holds every resolvable type name (scalars, containers,
/// user declarations, aliases) for the var-like heuristic.
pub fn check_func(func: &ir::Func, known_types: &FxHashSet<String>, diags: &mut Diagnostics) {
    let span = func.span.unwrap_or(Span::DUMMY);
    let declared: FxHashSet<&str> = func.type_params.iter().map(String::as_str).collect();

    let mut used = Vec::new();
    let mut named = Vec::new();
    for field in &func.params {
        collect_type_vars(&field.ty, &mut used, &mut named);
    }
    collect_type_vars(&func.ret, &mut used, &mut named);

    let mut seen = FxHashSet::default();
    for name in &used {
        if !declared.contains(name.as_str()) && seen.insert(name.clone()) {
            diags.emit("E203", span, &[("name", name.clone())]);
        }
    }
    let used_set: FxHashSet<&str> = used.iter().map(String::as_str).collect();
    for param in &func.type_params {
        if !used_set.contains(param.as_str()) {
            diags.emit("W021", span, &[("name", param.clone())]);
        }
    }

    // Unknown names that look like type variables (short, uppercase) get
    // the var-like error; resolution of longer unknown names is the scope
    // checker's job.
    let mut seen_named = FxHashSet::default();
    for name in &named {
        if looks_like_type_var(name)
            && !declared.contains(name.as_str())
            && !known_types.contains(name)
            && seen_named.insert(name.clone())
        {
            diags.emit("E204", span, &[("name", name.clone())]);
        }
    }

    check_effect_params(func, span, diags);
}

fn check_effect_params(func: &ir::Func, span: Span, diags: &mut Diagnostics) {
    let declared: FxHashSet<&str> = func.effect_params.iter().map(String::as_str).collect();

    let mut used = Vec::new();
    collect_effect_vars_in_effects(&func.declared_effects, &mut used);
    for field in &func.params {
        collect_effect_vars_in_type(&field.ty, &mut used);
    }
    collect_effect_vars_in_type(&func.ret, &mut used);

    let mut seen = FxHashSet::default();
    for name in &used {
        if !declared.contains(name.as_str()) && seen.insert(name.clone()) {
            diags.emit("E302", span, &[("name", name.clone())]);
        }
    }
    let used_set: FxHashSet<&str> = used.iter().map(String::as_str).collect();
    for param in &func.effect_params {
        if !used_set.contains(param.as_str()) {
            diags.emit("W032", span, &[("name", param.clone())]);
        }
    }
}

/// A short uppercase name reads as a type variable: `T`, `U`, `T1`, `TK`.
fn looks_like_type_var(name: &str) -> bool {
    name.len() <= 2 && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Collect `TypeVar` uses and plain `TypeName`s from a signature type.
fn collect_type_vars(ty: &ir::Type, vars: &mut Vec<String>, names: &mut Vec<String>) {
    match ty {
        ir::Type::TypeVar { name } => vars.push(name.clone()),
        ir::Type::TypeName { name } => names.push(name.clone()),
        ir::Type::TypeApp { args, .. } => {
            for arg in args {
                collect_type_vars(arg, vars, names);
            }
        }
        ir::Type::FuncType { params, ret, .. } => {
            for param in params {
                collect_type_vars(param, vars, names);
            }
            collect_type_vars(ret, vars, names);
        }
        ir::Type::List { item }
        | ir::Type::Option { item }
        | ir::Type::Maybe { item }
        | ir::Type::Pii { item } => collect_type_vars(item, vars, names),
        ir::Type::Map { key, value } => {
            collect_type_vars(key, vars, names);
            collect_type_vars(value, vars, names);
        }
        ir::Type::Result { ok, err } => {
            collect_type_vars(ok, vars, names);
            collect_type_vars(err, vars, names);
        }
        ir::Type::Error => {}
    }
}

fn collect_effect_vars_in_effects(effects: &[Effect], out: &mut Vec<String>) {
    for effect in effects {
        if let Effect::Var(name) = effect {
            out.push(name.clone());
        }
    }
}

fn collect_effect_vars_in_type(ty: &ir::Type, out: &mut Vec<String>) {
    match ty {
        ir::Type::FuncType {
            params,
            ret,
            declared_effects,
        } => {
            collect_effect_vars_in_effects(declared_effects, out);
            for param in params {
                collect_effect_vars_in_type(param, out);
            }
            collect_effect_vars_in_type(ret, out);
        }
        ir::Type::TypeApp { args, .. } => {
            for arg in args {
                collect_effect_vars_in_type(arg, out);
            }
        }
        ir::Type::List { item }
        | ir::Type::Option { item }
        | ir::Type::Maybe { item }
        | ir::Type::Pii { item } => collect_effect_vars_in_type(item, out),
        ir::Type::Map { key, value } => {
            collect_effect_vars_in_type(key, out);
            collect_effect_vars_in_type(value, out);
        }
        ir::Type::Result { ok, err } => {
            collect_effect_vars_in_type(ok, out);
            collect_effect_vars_in_type(err, out);
        }
        ir::Type::TypeName { .. } | ir::Type::TypeVar { .. } | ir::Type::Error => {}
    }
}
