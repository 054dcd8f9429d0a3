//! Hierarchical symbol table.
//!
//! Scopes form an arena-indexed tree (no owning back-pointers): each scope
//! holds its parent's index and a name map. Lookup walks outward. Defining
//! a name twice in one scope is a hard error surfaced by the caller;
//! shadowing across scopes is legal and recorded for warnings. Lookups
//! that cross a lambda boundary mark the symbol as captured.

use aster_common::span::Span;
use aster_ir::ir;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Lambda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Func,
    Data,
    Enum,
    TypeAlias,
    Param,
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: ir::Type,
    pub kind: SymbolKind,
    pub mutable: bool,
    pub span: Span,
    pub captured: bool,
    /// Scope of the definition this one shadows, if any.
    pub shadowed_from: Option<ScopeId>,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, ty: ir::Type, kind: SymbolKind, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            mutable: false,
            span,
            captured: false,
            shadowed_from: None,
        }
    }
}

struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, SymbolInfo>,
}

/// The scope arena. Index 0 is always the module scope.
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                parent: None,
                symbols: FxHashMap::default(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            symbols: FxHashMap::default(),
        });
        id
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id.0].kind
    }

    /// Define a symbol in `scope`.
    ///
    /// Returns `Err` with the existing symbol's span on duplicate
    /// definition in the same scope. On success, records where the new
    /// symbol shadows an outer definition, and reports that scope back so
    /// the caller can warn.
    pub fn define(&mut self, scope: ScopeId, mut symbol: SymbolInfo) -> Result<Option<ScopeId>, Span> {
        if let Some(existing) = self.scopes[scope.0].symbols.get(&symbol.name) {
            return Err(existing.span);
        }
        let shadowed = self.scopes[scope.0]
            .parent
            .and_then(|parent| self.lookup(parent, &symbol.name).map(|(id, _)| id));
        symbol.shadowed_from = shadowed;
        self.scopes[scope.0]
            .symbols
            .insert(symbol.name.clone(), symbol);
        Ok(shadowed)
    }

    /// Look a name up from `scope` outward.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &SymbolInfo)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.scopes[id.0].symbols.get(name) {
                return Some((id, symbol));
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    /// Look a name up and mark it captured if the lookup crossed a lambda
    /// boundary on the way out.
    pub fn lookup_and_capture(&mut self, scope: ScopeId, name: &str) -> Option<SymbolInfo> {
        let (found_in, _) = self.lookup(scope, name)?;
        if self.crosses_lambda(scope, found_in) {
            if let Some(symbol) = self.scopes[found_in.0].symbols.get_mut(name) {
                symbol.captured = true;
            }
        }
        self.scopes[found_in.0].symbols.get(name).cloned()
    }

    /// Whether walking from `inner` up to (but not including) `outer`
    /// passes through a lambda scope.
    fn crosses_lambda(&self, inner: ScopeId, outer: ScopeId) -> bool {
        let mut current = Some(inner);
        while let Some(id) = current {
            if id == outer {
                return false;
            }
            if self.scopes[id.0].kind == ScopeKind::Lambda {
                return true;
            }
            current = self.scopes[id.0].parent;
        }
        false
    }

    pub fn symbol(&self, scope: ScopeId, name: &str) -> Option<&SymbolInfo> {
        self.scopes[scope.0].symbols.get(name)
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> SymbolInfo {
        SymbolInfo::new(name, ir::Type::name("Int"), SymbolKind::Var, Span::DUMMY)
    }

    #[test]
    fn lookup_walks_outward() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, sym("x")).unwrap();
        let inner = tree.push(root, ScopeKind::Block);
        assert!(tree.lookup(inner, "x").is_some());
        assert!(tree.lookup(inner, "y").is_none());
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, sym("x")).unwrap();
        assert!(tree.define(root, sym("x")).is_err());
    }

    #[test]
    fn shadowing_across_scopes_is_recorded() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, sym("x")).unwrap();
        let inner = tree.push(root, ScopeKind::Block);
        let shadowed = tree.define(inner, sym("x")).unwrap();
        assert_eq!(shadowed, Some(root));
        // The inner definition wins on lookup.
        let (found_in, _) = tree.lookup(inner, "x").unwrap();
        assert_eq!(found_in, inner);
    }

    #[test]
    fn lambda_lookup_marks_capture() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let func = tree.push(root, ScopeKind::Function);
        tree.define(func, sym("n")).unwrap();
        let lambda = tree.push(func, ScopeKind::Lambda);

        tree.lookup_and_capture(lambda, "n").unwrap();
        assert!(tree.symbol(func, "n").unwrap().captured);
    }

    #[test]
    fn same_scope_lookup_does_not_capture() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let func = tree.push(root, ScopeKind::Function);
        tree.define(func, sym("n")).unwrap();
        tree.lookup_and_capture(func, "n").unwrap();
        assert!(!tree.symbol(func, "n").unwrap().captured);
    }
}
