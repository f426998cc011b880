use super::allocator::{StorageAllocator, StorageCell};
use super::pool::StringPool;
use super::templates::{ConcatLabels, Templates, PRINT_INT, PRINT_STRING};
use crate::semantic::{PrimitiveType, Scope, TypeMap, MAIN_SCOPE};
use crate::syntax::{
    AddSub, AddSubOperator, Assignment, BoolLiteral, Compare, CompareOperator,
    ExecutableBlock, FunctionDefinition, IfStatement, IntLiteral, MulDiv, MulDivOperator, NodeId,
    NodePath, Parenthesized, PrintStatement, Program, StatementBlock, StringLiteral, UnaryOp,
    UnaryOperator, VariableBlock, VariableDeclaration, VariableRef, Visitor, WhileStatement,
};
use crate::util::naming::LabelNaming;
use log::{debug, warn};
use std::collections::HashMap;

/// The code fragment of every node, keyed by node id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CodeMap {
    fragments: HashMap<NodeId, String>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, code: String) {
        if self.fragments.contains_key(&id) {
            warn!("[codegen] node {} already has code, ignoring new fragment", id);
            return;
        }
        self.fragments.insert(id, code);
    }

    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.fragments.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// The generated program.
#[derive(Debug)]
pub struct Assembly {
    pub text: String,
    pub code: CodeMap,
    pub strings: StringPool,
    pub cells: Vec<StorageCell>,
}

/// Emits a code fragment for every node, bottom-up: the fragment of a node
/// is built in its `exit_*` hook from the fragments of its children.
pub struct CodeGenerator<'a, 't> {
    types: &'t TypeMap,
    scope: &'a Scope<'a>,
    templates: &'t dyn Templates,
    code: CodeMap,
    strings: StringPool,
    storage: StorageAllocator,
    labels: LabelNaming,
}

impl<'a, 't> CodeGenerator<'a, 't> {
    pub fn new(
        types: &'t TypeMap,
        global_scope: &'a Scope<'a>,
        templates: &'t dyn Templates,
    ) -> Self {
        Self {
            types,
            scope: global_scope,
            templates,
            code: CodeMap::new(),
            strings: StringPool::new(),
            storage: StorageAllocator::new(),
            labels: LabelNaming::new(),
        }
    }

    pub fn finish(self, root: NodeId) -> Assembly {
        let text = self.code.get(root).unwrap_or_default().to_string();

        Assembly {
            text,
            code: self.code,
            strings: self.strings,
            cells: self.storage.into_cells(),
        }
    }

    fn emit(&mut self, path: &NodePath, code: String) {
        debug!("[codegen] {}: {} line(s)", path.id(), code.lines().count());
        self.code.insert(path.id(), code);
    }

    fn fragment(&self, id: NodeId) -> &str {
        self.code
            .get(id)
            .unwrap_or_else(|| panic!("no code generated for node {}", id))
    }

    fn join(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|id| self.fragment(*id))
            .filter(|code| !code.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn type_of(&self, id: NodeId) -> PrimitiveType {
        self.types
            .get(id)
            .unwrap_or_else(|| panic!("expression {} has no type", id))
    }

    fn cell_for(&mut self, name: &str) -> String {
        let scope = self
            .scope
            .defining_scope(name)
            .unwrap_or_else(|| panic!("variable `{}` is not defined", name));

        self.storage.allocate(scope, name).to_string()
    }
}

impl<'a, 't> Visitor<'a> for CodeGenerator<'a, 't> {
    // --- Program structure

    fn exit_program(&mut self, path: &mut NodePath, program: &'a Program) {
        let templates = self.templates;
        let variables = self
            .storage
            .cells()
            .iter()
            .map(|cell| templates.variable_cell(&cell.label))
            .collect::<Vec<_>>()
            .join("\n");
        let strings = self
            .strings
            .iter()
            .map(|s| templates.string_literal(&s.label, &s.value))
            .collect::<Vec<_>>()
            .join("\n");
        let code = templates.program(&variables, &strings, self.fragment(program.main));

        self.emit(path, code);
    }

    fn enter_executable_block(&mut self, _path: &mut NodePath, _block: &'a ExecutableBlock) {
        self.scope = self
            .scope
            .child_scope_named(MAIN_SCOPE)
            .unwrap_or_else(|| panic!("scope `{}` must be created by the binder", MAIN_SCOPE));
    }

    fn exit_executable_block(&mut self, path: &mut NodePath, block: &'a ExecutableBlock) {
        let ids = block
            .variables
            .iter()
            .copied()
            .chain(Some(block.statements))
            .collect::<Vec<_>>();
        let code = self.join(&ids);

        self.emit(path, code);
        if let Some(enclosing) = self.scope.enclosing_scope() {
            self.scope = enclosing;
        }
    }

    fn enter_function_definition(&mut self, path: &mut NodePath, _def: &'a FunctionDefinition) {
        path.skip();
    }

    fn exit_variable_block(&mut self, path: &mut NodePath, block: &'a VariableBlock) {
        let code = self.join(&block.declarations);
        self.emit(path, code);
    }

    // Cells start zeroed, so only an initializer needs code.
    fn exit_variable_declaration(
        &mut self,
        path: &mut NodePath,
        declaration: &'a VariableDeclaration,
    ) {
        let cell = self.cell_for(&declaration.name);
        let code = match declaration.init {
            Some(init) => self.templates.store_variable(self.fragment(init), &cell),
            None => String::new(),
        };

        self.emit(path, code);
    }

    fn exit_statement_block(&mut self, path: &mut NodePath, block: &'a StatementBlock) {
        let code = self.join(&block.statements);
        self.emit(path, code);
    }

    // --- Statements

    fn exit_assignment(&mut self, path: &mut NodePath, stmt: &'a Assignment) {
        let cell = self.cell_for(&stmt.name);
        let code = self
            .templates
            .store_variable(self.fragment(stmt.value), &cell);

        self.emit(path, code);
    }

    fn exit_if_statement(&mut self, path: &mut NodePath, stmt: &'a IfStatement) {
        let code = match stmt.else_block {
            None => {
                let endif_label = self.labels.next("endif");

                self.templates.if_(
                    self.fragment(stmt.condition),
                    self.fragment(stmt.then_block),
                    &endif_label,
                )
            }
            Some(else_block) => {
                let else_label = self.labels.next("else");
                let endif_label = self.labels.next("endif");

                self.templates.if_else(
                    self.fragment(stmt.condition),
                    self.fragment(stmt.then_block),
                    self.fragment(else_block),
                    &else_label,
                    &endif_label,
                )
            }
        };

        self.emit(path, code);
    }

    fn exit_while_statement(&mut self, path: &mut NodePath, stmt: &'a WhileStatement) {
        let start_label = self.labels.next("loop_start");
        let end_label = self.labels.next("loop_end");
        let code = self.templates.while_(
            self.fragment(stmt.condition),
            self.fragment(stmt.body),
            &start_label,
            &end_label,
        );

        self.emit(path, code);
    }

    // Bool is encoded as 0/1 but printed as `false`/`true`, so it can't
    // share the Int path.
    fn exit_print_statement(&mut self, path: &mut NodePath, stmt: &'a PrintStatement) {
        let operand = self.fragment(stmt.value);
        let code = match self.type_of(stmt.value) {
            PrimitiveType::Bool => self.templates.print_bool(operand),
            PrimitiveType::Int => self.templates.print_int_or_string(operand, PRINT_INT),
            PrimitiveType::String => self.templates.print_int_or_string(operand, PRINT_STRING),
            ty => panic!("can't print an expression of type {}", ty),
        };

        self.emit(path, code);
    }

    // --- Expressions

    fn exit_int_literal(&mut self, path: &mut NodePath, expr: &'a IntLiteral) {
        let code = self.templates.load_immediate(expr.value);
        self.emit(path, code);
    }

    fn exit_bool_literal(&mut self, path: &mut NodePath, expr: &'a BoolLiteral) {
        let code = self.templates.load_immediate(if expr.value { 1 } else { 0 });
        self.emit(path, code);
    }

    fn exit_string_literal(&mut self, path: &mut NodePath, expr: &'a StringLiteral) {
        let label = self.labels.next("string");
        let code = self.templates.load_address(&label);

        self.strings.push(label, expr.value.as_str());
        self.emit(path, code);
    }

    fn exit_parenthesized(&mut self, path: &mut NodePath, expr: &'a Parenthesized) {
        let code = self.fragment(expr.expression).to_string();
        self.emit(path, code);
    }

    fn exit_unary_op(&mut self, path: &mut NodePath, expr: &'a UnaryOp) {
        let operand = self.fragment(expr.operand);
        let code = match expr.operator {
            UnaryOperator::Minus => self.templates.unary_minus(operand),
            UnaryOperator::Not => self.templates.logical_not(operand),
        };

        self.emit(path, code);
    }

    fn exit_mul_div(&mut self, path: &mut NodePath, expr: &'a MulDiv) {
        let operator = match expr.operator {
            MulDivOperator::Mul => "mul",
            MulDivOperator::Div => "div",
        };
        let code = self.templates.binary(
            operator,
            self.fragment(expr.lhs),
            self.fragment(expr.rhs),
        );

        self.emit(path, code);
    }

    fn exit_add_sub(&mut self, path: &mut NodePath, expr: &'a AddSub) {
        let code = if self.type_of(path.id()) == PrimitiveType::String {
            let labels = ConcatLabels {
                measure_left: self.labels.next("concat_measure_left"),
                measure_right: self.labels.next("concat_measure_right"),
                allocate: self.labels.next("concat_allocate"),
                copy_left: self.labels.next("concat_copy_left"),
                copy_right: self.labels.next("concat_copy_right"),
            };

            self.templates.concat_strings(
                self.fragment(expr.lhs),
                self.fragment(expr.rhs),
                &labels,
            )
        } else {
            let operator = match expr.operator {
                AddSubOperator::Add => "add",
                AddSubOperator::Sub => "sub",
            };

            self.templates.binary(
                operator,
                self.fragment(expr.lhs),
                self.fragment(expr.rhs),
            )
        };

        self.emit(path, code);
    }

    fn exit_compare(&mut self, path: &mut NodePath, expr: &'a Compare) {
        let operator = match expr.operator {
            CompareOperator::Lt => "slt",
            CompareOperator::Le => "sle",
            CompareOperator::Eq => "seq",
            CompareOperator::Ne => "sne",
            CompareOperator::Gt => "sgt",
            CompareOperator::Ge => "sge",
        };
        let code = self.templates.binary(
            operator,
            self.fragment(expr.lhs),
            self.fragment(expr.rhs),
        );

        self.emit(path, code);
    }

    fn exit_variable_ref(&mut self, path: &mut NodePath, expr: &'a VariableRef) {
        let cell = self.cell_for(&expr.name);
        let code = self.templates.load_variable(&cell);

        self.emit(path, code);
    }
}

impl std::fmt::Debug for CodeGenerator<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("scope", &self.scope.name())
            .field("code", &self.code.len())
            .field("strings", &self.strings)
            .field("storage", &self.storage)
            .field("labels", &self.labels)
            .finish()
    }
}
