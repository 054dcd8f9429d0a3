//! Structural unification over Core IR types.
//!
//! Unification binds the *named* type variables of the signature being
//! checked (a call's `bindable` set holds the callee's type parameters);
//! everything else is rigid. Bindings go into a [`Subst`]; binding a
//! variable that already holds a different concrete type is the
//! inconsistency error behind `TYPEVAR_INCONSISTENT`. Every binding runs
//! an occurs check so no infinite type can be recorded.
//!
//! `Type::Error` placeholders unify with anything: they mark subtrees that
//! already produced a diagnostic, and cascading would only add noise.

use aster_ir::ir;
use rustc_hash::{FxHashMap, FxHashSet};

/// Accumulated type-variable bindings for one conformance check.
#[derive(Debug, Default, Clone)]
pub struct Subst {
    bindings: FxHashMap<String, ir::Type>,
}

impl Subst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ir::Type> {
        self.bindings.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    Mismatch {
        expected: ir::Type,
        found: ir::Type,
    },
    Inconsistent {
        name: String,
        previous: ir::Type,
        actual: ir::Type,
    },
    Arity {
        expected: usize,
        found: usize,
    },
    Occurs {
        name: String,
        ty: ir::Type,
    },
}

/// Unify two types, binding variables from `bindable` into `subst`.
pub fn unify(
    expected: &ir::Type,
    found: &ir::Type,
    subst: &mut Subst,
    bindable: &FxHashSet<String>,
) -> Result<(), UnifyError> {
    use ir::Type::*;
    match (expected, found) {
        (Error, _) | (_, Error) => Ok(()),

        (TypeVar { name: a }, TypeVar { name: b })
            if a == b && !bindable.contains(a) =>
        {
            Ok(())
        }

        (TypeVar { name }, other) | (other, TypeVar { name }) if bindable.contains(name) => {
            bind(name, other, subst)
        }

        (TypeVar { name: a }, TypeVar { name: b }) => {
            if a == b {
                Ok(())
            } else {
                Err(UnifyError::Mismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                })
            }
        }

        (TypeName { name: a }, TypeName { name: b }) => {
            if a == b {
                Ok(())
            } else {
                Err(UnifyError::Mismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                })
            }
        }

        (TypeApp { base: b1, args: a1 }, TypeApp { base: b2, args: a2 }) => {
            if b1 != b2 {
                return Err(UnifyError::Mismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
            if a1.len() != a2.len() {
                return Err(UnifyError::Arity {
                    expected: a1.len(),
                    found: a2.len(),
                });
            }
            for (x, y) in a1.iter().zip(a2) {
                unify(x, y, subst, bindable)?;
            }
            Ok(())
        }

        (
            FuncType {
                params: p1, ret: r1, ..
            },
            FuncType {
                params: p2, ret: r2, ..
            },
        ) => {
            if p1.len() != p2.len() {
                return Err(UnifyError::Arity {
                    expected: p1.len(),
                    found: p2.len(),
                });
            }
            for (x, y) in p1.iter().zip(p2) {
                unify(x, y, subst, bindable)?;
            }
            unify(r1, r2, subst, bindable)
        }

        (List { item: a }, List { item: b })
        | (Option { item: a }, Option { item: b })
        | (Maybe { item: a }, Maybe { item: b })
        | (Pii { item: a }, Pii { item: b }) => unify(a, b, subst, bindable),

        (
            Map {
                key: k1,
                value: v1,
            },
            Map {
                key: k2,
                value: v2,
            },
        ) => {
            unify(k1, k2, subst, bindable)?;
            unify(v1, v2, subst, bindable)
        }

        (Result { ok: o1, err: e1 }, Result { ok: o2, err: e2 }) => {
            unify(o1, o2, subst, bindable)?;
            unify(e1, e2, subst, bindable)
        }

        _ => Err(UnifyError::Mismatch {
            expected: expected.clone(),
            found: found.clone(),
        }),
    }
}

fn bind(name: &str, ty: &ir::Type, subst: &mut Subst) -> Result<(), UnifyError> {
    // A variable trivially unifies with itself.
    if matches!(ty, ir::Type::TypeVar { name: other } if other == name) {
        return Ok(());
    }
    if let Some(previous) = subst.bindings.get(name).cloned() {
        // Re-binding: the existing binding must agree. Structural equality
        // is the test; a conflict is the classic TYPEVAR_INCONSISTENT.
        let mut probe = subst.clone();
        let empty = FxHashSet::default();
        return match unify(&previous, ty, &mut probe, &empty) {
            Ok(()) => Ok(()),
            Err(_) => Err(UnifyError::Inconsistent {
                name: name.to_string(),
                previous,
                actual: ty.clone(),
            }),
        };
    }
    if occurs(name, ty) {
        return Err(UnifyError::Occurs {
            name: name.to_string(),
            ty: ty.clone(),
        });
    }
    subst.bindings.insert(name.to_string(), ty.clone());
    Ok(())
}

/// Whether the variable occurs anywhere inside the type.
pub fn occurs(name: &str, ty: &ir::Type) -> bool {
    use ir::Type::*;
    match ty {
        TypeVar { name: other } => other == name,
        TypeName { .. } | Error => false,
        TypeApp { args, .. } => args.iter().any(|a| occurs(name, a)),
        FuncType { params, ret, .. } => {
            params.iter().any(|p| occurs(name, p)) || occurs(name, ret)
        }
        List { item } | Option { item } | Maybe { item } | Pii { item } => occurs(name, item),
        Map { key, value } => occurs(name, key) || occurs(name, value),
        Result { ok, err } => occurs(name, ok) || occurs(name, err),
    }
}

/// Replace bound variables by their bindings.
pub fn apply(ty: &ir::Type, subst: &Subst) -> ir::Type {
    use ir::Type::*;
    match ty {
        TypeVar { name } => match subst.bindings.get(name) {
            Some(bound) => apply(bound, subst),
            None => ty.clone(),
        },
        TypeName { .. } | Error => ty.clone(),
        TypeApp { base, args } => TypeApp {
            base: base.clone(),
            args: args.iter().map(|a| apply(a, subst)).collect(),
        },
        FuncType {
            params,
            ret,
            declared_effects,
        } => FuncType {
            params: params.iter().map(|p| apply(p, subst)).collect(),
            ret: Box::new(apply(ret, subst)),
            declared_effects: declared_effects.clone(),
        },
        List { item } => List {
            item: Box::new(apply(item, subst)),
        },
        Option { item } => Option {
            item: Box::new(apply(item, subst)),
        },
        Maybe { item } => Maybe {
            item: Box::new(apply(item, subst)),
        },
        Pii { item } => Pii {
            item: Box::new(apply(item, subst)),
        },
        Map { key, value } => Map {
            key: Box::new(apply(key, subst)),
            value: Box::new(apply(value, subst)),
        },
        Result { ok, err } => Result {
            ok: Box::new(apply(ok, subst)),
            err: Box::new(apply(err, subst)),
        },
    }
}
