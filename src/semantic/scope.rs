use super::PrimitiveType;
use crate::arena::{BumpaloArena, BumpaloVec};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// A variable binding. Once defined, a symbol never changes.
#[derive(Debug, PartialEq)]
pub struct Symbol<'a> {
    name: &'a str,
    r#type: PrimitiveType,
}

impl<'a> Symbol<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn r#type(&self) -> PrimitiveType {
        self.r#type
    }
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.r#type)
    }
}

/// A lexical scope.
///
/// Scopes are allocated in the arena and form a tree. A child scope is
/// registered under its name so that later passes can re-enter the very
/// same scope object instead of building a new one.
pub struct Scope<'a> {
    name: &'a str,
    return_type: PrimitiveType,
    enclosing: Option<&'a Scope<'a>>,
    symbols: RefCell<HashMap<&'a str, &'a Symbol<'a>>>,
    children: RefCell<BumpaloVec<'a, &'a Scope<'a>>>,
}

impl<'a> Scope<'a> {
    pub fn global(arena: &'a BumpaloArena) -> &'a Scope<'a> {
        Self::alloc(arena, "$global", PrimitiveType::Void, None)
    }

    fn alloc(
        arena: &'a BumpaloArena,
        name: &str,
        return_type: PrimitiveType,
        enclosing: Option<&'a Scope<'a>>,
    ) -> &'a Scope<'a> {
        arena.alloc(Scope {
            name: arena.alloc_str(name),
            return_type,
            enclosing,
            symbols: RefCell::new(HashMap::new()),
            children: RefCell::new(BumpaloVec::new_in(arena)),
        })
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn return_type(&self) -> PrimitiveType {
        self.return_type
    }

    pub fn enclosing_scope(&self) -> Option<&'a Scope<'a>> {
        self.enclosing
    }

    pub fn create_child_scope(
        &'a self,
        arena: &'a BumpaloArena,
        name: &str,
        return_type: PrimitiveType,
    ) -> &'a Scope<'a> {
        let child = Self::alloc(arena, name, return_type, Some(self));

        self.children.borrow_mut().push(child);
        child
    }

    pub fn child_scope_named(&self, name: &str) -> Option<&'a Scope<'a>> {
        self.children
            .borrow()
            .iter()
            .find(|child| child.name == name)
            .copied()
    }

    pub fn resolve(&self, name: &str) -> Option<&'a Symbol<'a>> {
        if let Some(symbol) = self.resolve_locally(name) {
            return Some(symbol);
        }

        if let Some(enclosing) = self.enclosing {
            return enclosing.resolve(name);
        }

        None
    }

    pub fn resolve_locally(&self, name: &str) -> Option<&'a Symbol<'a>> {
        self.symbols.borrow().get(name).copied()
    }

    /// Returns the nearest scope, starting from this one, that defines `name`.
    pub fn defining_scope(&'a self, name: &str) -> Option<&'a Scope<'a>> {
        if self.resolve_locally(name).is_some() {
            return Some(self);
        }

        self.enclosing.and_then(|enclosing| enclosing.defining_scope(name))
    }

    /// Defines `name` in this scope. Callers check `resolve_locally` first;
    /// an existing binding is kept and returned.
    pub fn define(
        &self,
        arena: &'a BumpaloArena,
        name: &str,
        r#type: PrimitiveType,
    ) -> &'a Symbol<'a> {
        if let Some(existing) = self.resolve_locally(name) {
            return existing;
        }

        let name: &'a str = arena.alloc_str(name);
        let symbol = &*arena.alloc(Symbol { name, r#type });

        self.symbols.borrow_mut().insert(name, symbol);
        symbol
    }

    /// The scope names from the outermost scope to this one, joined with `_`.
    /// The global scope and `$` sigils are left out, so `$main` is `main`.
    pub fn qualified_name(&self) -> String {
        let mut names = vec![];
        let mut scope = Some(self);

        while let Some(s) = scope {
            if s.enclosing.is_some() {
                names.push(s.name.trim_start_matches('$'));
            }
            scope = s.enclosing;
        }

        names.reverse();
        names.join("_")
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children = self
            .children
            .borrow()
            .iter()
            .map(|child| child.name)
            .collect::<Vec<_>>();

        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .field("enclosing", &self.enclosing.map(|s| s.name))
            .field("symbols", &*self.symbols.borrow())
            .field("children", &children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_through_enclosing_scopes() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);
        global.define(&arena, "x", PrimitiveType::Int);

        let main = global.create_child_scope(&arena, "$main", PrimitiveType::Void);
        main.define(&arena, "y", PrimitiveType::Bool);

        assert_eq!(main.resolve("x").map(|s| s.r#type()), Some(PrimitiveType::Int));
        assert!(main.resolve_locally("x").is_none());
        assert!(global.resolve("y").is_none());
        assert!(main.resolve("z").is_none());
    }

    #[test]
    fn shadowing() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);
        global.define(&arena, "x", PrimitiveType::Int);

        let main = global.create_child_scope(&arena, "$main", PrimitiveType::Void);
        main.define(&arena, "x", PrimitiveType::String);

        assert_eq!(main.resolve("x").map(|s| s.r#type()), Some(PrimitiveType::String));
        assert!(std::ptr::eq(main.defining_scope("x").unwrap(), main));
        assert_eq!(global.resolve("x").map(|s| s.r#type()), Some(PrimitiveType::Int));
    }

    #[test]
    fn define_keeps_original_binding() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);

        global.define(&arena, "x", PrimitiveType::Int);
        let symbol = global.define(&arena, "x", PrimitiveType::Bool);

        assert_eq!(symbol.r#type(), PrimitiveType::Int);
    }

    #[test]
    fn child_scope_named_returns_same_scope() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);
        let main = global.create_child_scope(&arena, "$main", PrimitiveType::Void);

        let found = global.child_scope_named("$main").unwrap();

        assert!(std::ptr::eq(found, main));
        assert!(global.child_scope_named("$other").is_none());
        assert_eq!(found.enclosing_scope().map(|s| s.name()), Some("$global"));
    }

    #[test]
    fn qualified_name() {
        let arena = BumpaloArena::new();
        let global = Scope::global(&arena);
        let main = global.create_child_scope(&arena, "$main", PrimitiveType::Void);
        let inner = main.create_child_scope(&arena, "loop", PrimitiveType::Void);

        assert_eq!(global.qualified_name(), "");
        assert_eq!(main.qualified_name(), "main");
        assert_eq!(inner.qualified_name(), "main_loop");
    }
}
