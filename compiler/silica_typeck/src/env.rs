//! Lexical scope stack for identifier resolution.

use crate::VarTarget;
use rustc_hash::FxHashMap;
use silica_ir::{Name, StorageQualifier};
use silica_types::Type;

/// One resolved variable binding.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Binding {
    pub ty: Type,
    pub target: VarTarget,
    /// `StorageQualifier::None` for locals and parameters.
    pub storage: StorageQualifier,
}

/// Stack of lexical scopes, innermost last. Lookup walks innermost to
/// outermost; declaration shadows outer scopes but conflicts within one.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    stack: Vec<FxHashMap<Name, Binding>>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes { stack: vec![FxHashMap::default()] }
    }

    pub fn push(&mut self) {
        self.stack.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "popped the global scope");
        self.stack.pop();
    }

    /// Declare in the innermost scope. Returns `false` if the name is
    /// already declared there.
    pub fn declare(&mut self, name: Name, binding: Binding) -> bool {
        let scope = self
            .stack
            .last_mut()
            .unwrap_or_else(|| unreachable!("scope stack is never empty"));
        if scope.contains_key(&name) {
            return false;
        }
        scope.insert(name, binding);
        true
    }

    /// Look up a name, innermost scope first.
    pub fn lookup(&self, name: Name) -> Option<Binding> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_ir::DeclId;

    fn binding(ty: Type) -> Binding {
        // DeclId values are irrelevant to scoping behavior.
        Binding {
            ty,
            target: VarTarget::Param { function: dummy_decl(), index: 0 },
            storage: StorageQualifier::None,
        }
    }

    fn dummy_decl() -> DeclId {
        use silica_ir::{Ast, Decl, DeclKind, GlobalDecl, LayoutQualifiers, Span};
        let mut ast = Ast::new();
        ast.alloc_decl(Decl {
            kind: DeclKind::Global(GlobalDecl {
                ty: Type::INT,
                name: Name::EMPTY,
                storage: StorageQualifier::None,
                layout: LayoutQualifiers::default(),
                init: None,
            }),
            span: Span::DUMMY,
        })
    }

    #[test]
    fn inner_scopes_shadow_outer() {
        let interner = silica_ir::StringInterner::new();
        let x = interner.intern("x");

        let mut scopes = Scopes::new();
        assert!(scopes.declare(x, binding(Type::INT)));
        scopes.push();
        assert!(scopes.declare(x, binding(Type::FLOAT)));
        assert_eq!(scopes.lookup(x).expect("bound").ty, Type::FLOAT);
        scopes.pop();
        assert_eq!(scopes.lookup(x).expect("bound").ty, Type::INT);
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let interner = silica_ir::StringInterner::new();
        let x = interner.intern("x");

        let mut scopes = Scopes::new();
        assert!(scopes.declare(x, binding(Type::INT)));
        assert!(!scopes.declare(x, binding(Type::INT)));
    }

    #[test]
    fn unknown_name_is_none() {
        let interner = silica_ir::StringInterner::new();
        let scopes = Scopes::new();
        assert!(scopes.lookup(interner.intern("missing")).is_none());
    }
}
