use super::{Category, ErrorLog, PrimitiveType, Scope, TypeMap, MAIN_SCOPE};
use crate::arena::BumpaloArena;
use crate::syntax::{
    AddSub, AddSubOperator, Assignment, Ast, BoolLiteral, Compare, ExecutableBlock, FunctionCall,
    FunctionDefinition, IfStatement, IntLiteral, MulDiv, NodeId, NodePath, Parenthesized,
    PrintStatement, StringLiteral, UnaryOp, UnaryOperator, VariableDeclaration, VariableRef,
    Visitor, WhileStatement,
};
use log::debug;

/// Computes the type of every expression and checks the typing constraints
/// of statements.
///
/// Types are computed in `exit_*` hooks, so the children of a node are
/// always typed before the node itself.
#[derive(Debug)]
pub(super) struct TypeInferencer<'a, 'e> {
    arena: &'a BumpaloArena,
    ast: &'a Ast,
    scope: &'a Scope<'a>,
    types: &'e mut TypeMap,
    errors: &'e mut ErrorLog,
}

impl<'a, 'e> TypeInferencer<'a, 'e> {
    pub fn new(
        arena: &'a BumpaloArena,
        ast: &'a Ast,
        scope: &'a Scope<'a>,
        types: &'e mut TypeMap,
        errors: &'e mut ErrorLog,
    ) -> Self {
        Self {
            arena,
            ast,
            scope,
            types,
            errors,
        }
    }

    fn type_of(&self, id: NodeId) -> PrimitiveType {
        self.types.get(id).unwrap_or(PrimitiveType::Error)
    }

    fn assign_type(&mut self, path: &NodePath, ty: PrimitiveType) {
        debug!(
            "[inference] {} {} : {}",
            self.ast.node(path.id()).kind_name(),
            path.id(),
            ty
        );
        self.types.insert(path.id(), ty);
    }

    fn log_invalid_assign(&mut self, path: &NodePath, name: &str, value: NodeId) {
        let declared = self
            .scope
            .resolve(name)
            .map_or(PrimitiveType::Error, |symbol| symbol.r#type());
        let message = format!(
            "Can't assign {} expression to variable {} of type {}",
            self.type_of(value),
            name,
            declared
        );

        self.errors
            .add(path.id(), Category::AssignToWrongType, message);
    }

    fn check_boolean_condition(&mut self, path: &NodePath, kind: &str, condition: NodeId) {
        let ty = self.type_of(condition);

        if ty != PrimitiveType::Bool {
            self.errors.add(
                path.id(),
                Category::ConditionNotBool,
                format!(
                    "{} condition {} has type {} not Bool",
                    kind,
                    self.ast.code(condition),
                    ty
                ),
            );
        }
    }

    fn binary_on_ints(
        &mut self,
        path: &NodePath,
        operator: &str,
        lhs: NodeId,
        rhs: NodeId,
        result_type: PrimitiveType,
    ) {
        let lhs = self.type_of(lhs);
        let rhs = self.type_of(rhs);

        if lhs == PrimitiveType::Int && rhs == PrimitiveType::Int {
            self.assign_type(path, result_type);
        } else {
            self.assign_type(path, PrimitiveType::Error);
            self.errors.add(
                path.id(),
                Category::InvalidBinaryOp,
                format!("Can't apply {} to {} and {}", operator, lhs, rhs),
            );
        }
    }
}

impl<'a, 'e> Visitor<'a> for TypeInferencer<'a, 'e> {
    // --- Program structure

    fn enter_executable_block(&mut self, _path: &mut NodePath, _block: &'a ExecutableBlock) {
        self.scope = self
            .scope
            .child_scope_named(MAIN_SCOPE)
            .unwrap_or_else(|| panic!("scope `{}` must be created by the binder", MAIN_SCOPE));
    }

    fn exit_executable_block(&mut self, _path: &mut NodePath, _block: &'a ExecutableBlock) {
        if let Some(enclosing) = self.scope.enclosing_scope() {
            self.scope = enclosing;
        }
    }

    // Already rejected by the binder.
    fn enter_function_definition(&mut self, path: &mut NodePath, _def: &'a FunctionDefinition) {
        path.skip();
    }

    // --- Variable declarations

    fn exit_variable_declaration(
        &mut self,
        path: &mut NodePath,
        declaration: &'a VariableDeclaration,
    ) {
        let name = declaration.name.as_str();

        if let Some(existing) = self.scope.resolve_locally(name) {
            self.errors.add(
                path.id(),
                Category::DuplicateName,
                format!(
                    "Can't redeclare {}; already declared as {}",
                    name,
                    existing.r#type()
                ),
            );
            return;
        }

        let declared = PrimitiveType::from(declaration.type_name);
        self.scope.define(self.arena, name, declared);
        debug!("[inference] define {} : {} in {}", name, declared, self.scope.name());

        if let Some(init) = declaration.init {
            if self.type_of(init) != declared {
                self.log_invalid_assign(path, name, init);
            }
        }
    }

    // --- Statements

    fn exit_assignment(&mut self, path: &mut NodePath, stmt: &'a Assignment) {
        let name = stmt.name.as_str();

        match self.scope.resolve(name) {
            Some(symbol) => {
                if symbol.r#type() != self.type_of(stmt.value) {
                    self.log_invalid_assign(path, name, stmt.value);
                }
            }
            None => {
                self.errors.add(
                    path.id(),
                    Category::UndefinedName,
                    format!("Assignment target {} not declared", name),
                );
            }
        }
    }

    fn exit_if_statement(&mut self, path: &mut NodePath, stmt: &'a IfStatement) {
        self.check_boolean_condition(path, "If", stmt.condition);
    }

    fn exit_while_statement(&mut self, path: &mut NodePath, stmt: &'a WhileStatement) {
        self.check_boolean_condition(path, "While", stmt.condition);
    }

    fn exit_print_statement(&mut self, path: &mut NodePath, stmt: &'a PrintStatement) {
        if self.type_of(stmt.value).is_error() {
            self.errors.add(
                path.id(),
                Category::UnprintableExpression,
                format!(
                    "Can't print expression {} as it has type Error",
                    self.ast.code(stmt.value)
                ),
            );
        }
    }

    // --- Expressions

    fn exit_int_literal(&mut self, path: &mut NodePath, _expr: &'a IntLiteral) {
        self.assign_type(path, PrimitiveType::Int);
    }

    fn exit_bool_literal(&mut self, path: &mut NodePath, _expr: &'a BoolLiteral) {
        self.assign_type(path, PrimitiveType::Bool);
    }

    fn exit_string_literal(&mut self, path: &mut NodePath, _expr: &'a StringLiteral) {
        self.assign_type(path, PrimitiveType::String);
    }

    fn exit_unary_op(&mut self, path: &mut NodePath, expr: &'a UnaryOp) {
        let operand = self.type_of(expr.operand);

        match (expr.operator, operand) {
            (UnaryOperator::Minus, PrimitiveType::Int) => {
                self.assign_type(path, PrimitiveType::Int);
            }
            (UnaryOperator::Not, PrimitiveType::Bool) => {
                self.assign_type(path, PrimitiveType::Bool);
            }
            (operator, operand) => {
                self.assign_type(path, PrimitiveType::Error);
                self.errors.add(
                    path.id(),
                    Category::InvalidNegation,
                    format!("Can't apply {} to {}", operator.as_str(), operand),
                );
            }
        }
    }

    fn exit_parenthesized(&mut self, path: &mut NodePath, expr: &'a Parenthesized) {
        let ty = self.type_of(expr.expression);
        self.assign_type(path, ty);
    }

    fn exit_mul_div(&mut self, path: &mut NodePath, expr: &'a MulDiv) {
        self.binary_on_ints(
            path,
            expr.operator.as_str(),
            expr.lhs,
            expr.rhs,
            PrimitiveType::Int,
        );
    }

    fn exit_add_sub(&mut self, path: &mut NodePath, expr: &'a AddSub) {
        if expr.operator == AddSubOperator::Add
            && self.type_of(expr.lhs) == PrimitiveType::String
            && self.type_of(expr.rhs) == PrimitiveType::String
        {
            self.assign_type(path, PrimitiveType::String);
        } else {
            self.binary_on_ints(
                path,
                expr.operator.as_str(),
                expr.lhs,
                expr.rhs,
                PrimitiveType::Int,
            );
        }
    }

    fn exit_compare(&mut self, path: &mut NodePath, expr: &'a Compare) {
        self.binary_on_ints(
            path,
            expr.operator.as_str(),
            expr.lhs,
            expr.rhs,
            PrimitiveType::Bool,
        );
    }

    fn exit_variable_ref(&mut self, path: &mut NodePath, expr: &'a VariableRef) {
        match self.scope.resolve(&expr.name) {
            Some(symbol) => self.assign_type(path, symbol.r#type()),
            None => {
                self.assign_type(path, PrimitiveType::Error);
                self.errors.add(
                    path.id(),
                    Category::UndefinedName,
                    format!("Variable {} is not declared", expr.name),
                );
            }
        }
    }

    // The call itself was reported by the binder.
    fn exit_function_call(&mut self, path: &mut NodePath, _expr: &'a FunctionCall) {
        self.assign_type(path, PrimitiveType::Error);
    }
}
