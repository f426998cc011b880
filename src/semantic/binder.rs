use super::{Category, ErrorLog, PrimitiveType, Scope, MAIN_SCOPE};
use crate::arena::BumpaloArena;
use crate::syntax::{
    ExecutableBlock, FunctionCall, FunctionDefinition, NodePath, ReturnStatement, Visitor,
};
use log::debug;

/// Builds the scope tree and rejects the constructs this compiler does not
/// support.
#[derive(Debug)]
pub(super) struct ScopeBinder<'a, 'e> {
    arena: &'a BumpaloArena,
    scope: &'a Scope<'a>,
    errors: &'e mut ErrorLog,
}

impl<'a, 'e> ScopeBinder<'a, 'e> {
    pub fn new(arena: &'a BumpaloArena, scope: &'a Scope<'a>, errors: &'e mut ErrorLog) -> Self {
        Self {
            arena,
            scope,
            errors,
        }
    }
}

impl<'a, 'e> Visitor<'a> for ScopeBinder<'a, 'e> {
    fn enter_executable_block(&mut self, _path: &mut NodePath, _block: &'a ExecutableBlock) {
        self.scope = self
            .scope
            .create_child_scope(self.arena, MAIN_SCOPE, PrimitiveType::Void);
        debug!("[binder] enter scope {}", self.scope.name());
    }

    fn exit_executable_block(&mut self, _path: &mut NodePath, _block: &'a ExecutableBlock) {
        debug!("[binder] exit scope {}", self.scope.name());
        if let Some(enclosing) = self.scope.enclosing_scope() {
            self.scope = enclosing;
        }
    }

    fn enter_function_definition(&mut self, path: &mut NodePath, def: &'a FunctionDefinition) {
        debug!("[binder] reject function definition `{}`", def.name);
        self.errors.add(
            path.id(),
            Category::UnsupportedLanguageFeature,
            "this implementation does not support function definitions",
        );
        path.skip();
    }

    fn enter_function_call(&mut self, path: &mut NodePath, call: &'a FunctionCall) {
        debug!("[binder] reject function call `{}`", call.name);
        self.errors.add(
            path.id(),
            Category::UnsupportedLanguageFeature,
            "this implementation does not support function calls",
        );
    }

    fn enter_return(&mut self, path: &mut NodePath, _stmt: &'a ReturnStatement) {
        self.errors.add(
            path.id(),
            Category::UnsupportedLanguageFeature,
            "this implementation does not support return statements",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{traverse, Ast};

    #[test]
    fn creates_main_scope() {
        let arena = BumpaloArena::new();
        let mut ast = Ast::new();
        let program = ast.main_program(vec![], vec![]);

        let global = Scope::global(&arena);
        let mut errors = ErrorLog::new();
        let mut binder = ScopeBinder::new(&arena, global, &mut errors);
        traverse(&mut binder, &ast, program);

        assert!(std::ptr::eq(binder.scope, global));
        assert!(global.child_scope_named(MAIN_SCOPE).is_some());
        assert!(!errors.has_errors());
    }

    #[test]
    fn rejects_calls_and_returns() {
        let arena = BumpaloArena::new();
        let mut ast = Ast::new();
        let one = ast.int_literal(1);
        let call = ast.function_call("f", vec![one]);
        let print = ast.print(call);
        let ret = ast.return_statement(None);
        let program = ast.main_program(vec![], vec![print, ret]);

        let global = Scope::global(&arena);
        let mut errors = ErrorLog::new();
        traverse(&mut ScopeBinder::new(&arena, global, &mut errors), &ast, program);

        assert_eq!(
            errors.categories(),
            vec![
                Category::UnsupportedLanguageFeature,
                Category::UnsupportedLanguageFeature
            ]
        );
        assert_eq!(errors.iter().map(|d| d.node).collect::<Vec<_>>(), vec![call, ret]);
    }
}
