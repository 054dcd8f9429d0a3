//! Type-alias expansion with cycle detection.
//!
//! Aliases expand recursively through container types. Expansion keeps a
//! stack of the alias names currently being expanded; revisiting one is a
//! cycle, reported once per alias, and the original `TypeName` is returned
//! so downstream checks can continue. Resolved expansions are cached.

use aster_common::diag::Diagnostics;
use aster_common::span::Span;
use aster_ir::ir;
use rustc_hash::{FxHashMap, FxHashSet};

pub struct AliasMap {
    targets: FxHashMap<String, ir::Type>,
    spans: FxHashMap<String, Span>,
    resolved: FxHashMap<String, ir::Type>,
    reported: FxHashSet<String>,
}

impl AliasMap {
    pub fn new() -> Self {
        AliasMap {
            targets: FxHashMap::default(),
            spans: FxHashMap::default(),
            resolved: FxHashMap::default(),
            reported: FxHashSet::default(),
        }
    }

    pub fn insert(&mut self, name: String, target: ir::Type, span: Span) {
        self.spans.insert(name.clone(), span);
        self.targets.insert(name, target);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Fully expand aliases in a type.
    pub fn expand(&mut self, ty: &ir::Type, diags: &mut Diagnostics) -> ir::Type {
        let mut stack = Vec::new();
        self.expand_inner(ty, &mut stack, diags)
    }

    fn expand_inner(
        &mut self,
        ty: &ir::Type,
        stack: &mut Vec<String>,
        diags: &mut Diagnostics,
    ) -> ir::Type {
        match ty {
            ir::Type::TypeName { name } if self.targets.contains_key(name) => {
                if let Some(cached) = self.resolved.get(name) {
                    return cached.clone();
                }
                if stack.iter().any(|n| n == name) {
                    if self.reported.insert(name.clone()) {
                        let span = self.spans.get(name).copied().unwrap_or(Span::DUMMY);
                        diags.emit("E207", span, &[("name", name.clone())]);
                    }
                    return ty.clone();
                }
                stack.push(name.clone());
                let target = self.targets[name].clone();
                let expanded = self.expand_inner(&target, stack, diags);
                stack.pop();
                // Only cache clean expansions; cycles must keep reporting
                // their original name.
                if !self.reported.contains(name) {
                    self.resolved.insert(name.clone(), expanded.clone());
                }
                expanded
            }
            ir::Type::TypeName { .. } | ir::Type::TypeVar { .. } | ir::Type::Error => ty.clone(),
            ir::Type::TypeApp { base, args } => ir::Type::TypeApp {
                base: base.clone(),
                args: args
                    .iter()
                    .map(|a| self.expand_inner(a, stack, diags))
                    .collect(),
            },
            ir::Type::FuncType {
                params,
                ret,
                declared_effects,
            } => ir::Type::FuncType {
                params: params
                    .iter()
                    .map(|p| self.expand_inner(p, stack, diags))
                    .collect(),
                ret: Box::new(self.expand_inner(ret, stack, diags)),
                declared_effects: declared_effects.clone(),
            },
            ir::Type::List { item } => ir::Type::List {
                item: Box::new(self.expand_inner(item, stack, diags)),
            },
            ir::Type::Map { key, value } => ir::Type::Map {
                key: Box::new(self.expand_inner(key, stack, diags)),
                value: Box::new(self.expand_inner(value, stack, diags)),
            },
            ir::Type::Option { item } => ir::Type::Option {
                item: Box::new(self.expand_inner(item, stack, diags)),
            },
            ir::Type::Maybe { item } => ir::Type::Maybe {
                item: Box::new(self.expand_inner(item, stack, diags)),
            },
            ir::Type::Result { ok, err } => ir::Type::Result {
                ok: Box::new(self.expand_inner(ok, stack, diags)),
                err: Box::new(self.expand_inner(err, stack, diags)),
            },
            ir::Type::Pii { item } => ir::Type::Pii {
                item: Box::new(self.expand_inner(item, stack, diags)),
            },
        }
    }
}

impl Default for AliasMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_expansion() {
        let mut aliases = AliasMap::new();
        aliases.insert("UserId".into(), ir::Type::name("Text"), Span::DUMMY);
        let mut diags = Diagnostics::new();
        let expanded = aliases.expand(&ir::Type::name("UserId"), &mut diags);
        assert_eq!(expanded, ir::Type::name("Text"));
        assert!(diags.is_empty());
    }

    #[test]
    fn chained_expansion_through_containers() {
        let mut aliases = AliasMap::new();
        aliases.insert("UserId".into(), ir::Type::name("Text"), Span::DUMMY);
        aliases.insert(
            "Ids".into(),
            ir::Type::List {
                item: Box::new(ir::Type::name("UserId")),
            },
            Span::DUMMY,
        );
        let mut diags = Diagnostics::new();
        let expanded = aliases.expand(&ir::Type::name("Ids"), &mut diags);
        assert_eq!(
            expanded,
            ir::Type::List {
                item: Box::new(ir::Type::name("Text")),
            }
        );
    }

    #[test]
    fn cycle_reports_once_and_returns_original() {
        let mut aliases = AliasMap::new();
        aliases.insert("A".into(), ir::Type::name("B"), Span::DUMMY);
        aliases.insert("B".into(), ir::Type::name("A"), Span::DUMMY);
        let mut diags = Diagnostics::new();
        let expanded = aliases.expand(&ir::Type::name("A"), &mut diags);
        // The cycle entry point comes back unexpanded.
        assert_eq!(expanded, ir::Type::name("A"));
        let entries = diags.finish();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E207");
    }

    #[test]
    fn non_alias_names_pass_through() {
        let mut aliases = AliasMap::new();
        let mut diags = Diagnostics::new();
        let ty = ir::Type::name("Int");
        assert_eq!(aliases.expand(&ty, &mut diags), ty);
    }
}
