use super::tree::*;

/// The position of the node being visited.
#[derive(Debug)]
pub struct NodePath {
    id: NodeId,
    skipped: bool,
}

impl NodePath {
    pub fn new(id: NodeId) -> Self {
        Self { id, skipped: false }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// skips traversing the children and `exit` of the current path.
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }
}

#[allow(unused_variables)]
pub trait Visitor<'a> {
    // Program structure
    fn enter_program(&mut self, path: &mut NodePath, program: &'a Program) {}
    fn exit_program(&mut self, path: &mut NodePath, program: &'a Program) {}

    fn enter_executable_block(&mut self, path: &mut NodePath, block: &'a ExecutableBlock) {}
    fn exit_executable_block(&mut self, path: &mut NodePath, block: &'a ExecutableBlock) {}

    fn enter_variable_block(&mut self, path: &mut NodePath, block: &'a VariableBlock) {}
    fn exit_variable_block(&mut self, path: &mut NodePath, block: &'a VariableBlock) {}

    fn enter_variable_declaration(
        &mut self,
        path: &mut NodePath,
        declaration: &'a VariableDeclaration,
    ) {
    }
    fn exit_variable_declaration(
        &mut self,
        path: &mut NodePath,
        declaration: &'a VariableDeclaration,
    ) {
    }

    fn enter_statement_block(&mut self, path: &mut NodePath, block: &'a StatementBlock) {}
    fn exit_statement_block(&mut self, path: &mut NodePath, block: &'a StatementBlock) {}

    // Statements
    fn enter_assignment(&mut self, path: &mut NodePath, stmt: &'a Assignment) {}
    fn exit_assignment(&mut self, path: &mut NodePath, stmt: &'a Assignment) {}

    fn enter_if_statement(&mut self, path: &mut NodePath, stmt: &'a IfStatement) {}
    fn exit_if_statement(&mut self, path: &mut NodePath, stmt: &'a IfStatement) {}

    fn enter_while_statement(&mut self, path: &mut NodePath, stmt: &'a WhileStatement) {}
    fn exit_while_statement(&mut self, path: &mut NodePath, stmt: &'a WhileStatement) {}

    fn enter_print_statement(&mut self, path: &mut NodePath, stmt: &'a PrintStatement) {}
    fn exit_print_statement(&mut self, path: &mut NodePath, stmt: &'a PrintStatement) {}

    fn enter_function_definition(&mut self, path: &mut NodePath, def: &'a FunctionDefinition) {}
    fn exit_function_definition(&mut self, path: &mut NodePath, def: &'a FunctionDefinition) {}

    fn enter_return(&mut self, path: &mut NodePath, stmt: &'a ReturnStatement) {}
    fn exit_return(&mut self, path: &mut NodePath, stmt: &'a ReturnStatement) {}

    // Expressions
    fn enter_expression(&mut self, path: &mut NodePath, expr: &'a Node) {}
    fn exit_expression(&mut self, path: &mut NodePath, expr: &'a Node) {}

    fn enter_function_call(&mut self, path: &mut NodePath, expr: &'a FunctionCall) {}
    fn exit_function_call(&mut self, path: &mut NodePath, expr: &'a FunctionCall) {}

    fn enter_int_literal(&mut self, path: &mut NodePath, expr: &'a IntLiteral) {}
    fn exit_int_literal(&mut self, path: &mut NodePath, expr: &'a IntLiteral) {}

    fn enter_bool_literal(&mut self, path: &mut NodePath, expr: &'a BoolLiteral) {}
    fn exit_bool_literal(&mut self, path: &mut NodePath, expr: &'a BoolLiteral) {}

    fn enter_string_literal(&mut self, path: &mut NodePath, expr: &'a StringLiteral) {}
    fn exit_string_literal(&mut self, path: &mut NodePath, expr: &'a StringLiteral) {}

    fn enter_parenthesized(&mut self, path: &mut NodePath, expr: &'a Parenthesized) {}
    fn exit_parenthesized(&mut self, path: &mut NodePath, expr: &'a Parenthesized) {}

    fn enter_unary_op(&mut self, path: &mut NodePath, expr: &'a UnaryOp) {}
    fn exit_unary_op(&mut self, path: &mut NodePath, expr: &'a UnaryOp) {}

    fn enter_mul_div(&mut self, path: &mut NodePath, expr: &'a MulDiv) {}
    fn exit_mul_div(&mut self, path: &mut NodePath, expr: &'a MulDiv) {}

    fn enter_add_sub(&mut self, path: &mut NodePath, expr: &'a AddSub) {}
    fn exit_add_sub(&mut self, path: &mut NodePath, expr: &'a AddSub) {}

    fn enter_compare(&mut self, path: &mut NodePath, expr: &'a Compare) {}
    fn exit_compare(&mut self, path: &mut NodePath, expr: &'a Compare) {}

    fn enter_variable_ref(&mut self, path: &mut NodePath, expr: &'a VariableRef) {}
    fn exit_variable_ref(&mut self, path: &mut NodePath, expr: &'a VariableRef) {}
}

/// Walks the subtree at `id` depth-first. `enter_*` hooks run before the
/// children, `exit_*` hooks after them.
///
/// The walk recurses once per tree level, so the nesting depth of the AST
/// is bounded by the thread's stack size. Trees nested a few thousand
/// levels deep can overflow the default test thread stack.
pub fn traverse<'a>(visitor: &mut dyn Visitor<'a>, ast: &'a Ast, id: NodeId) {
    let node = ast.node(id);
    let mut path = NodePath::new(id);

    dispatch_enter(visitor, &mut path, node);

    if !path.skipped {
        for child in node.children() {
            traverse(visitor, ast, child);
        }
    }
    if !path.skipped {
        dispatch_exit(visitor, &mut path, node);
    }
}

fn dispatch_enter<'a>(visitor: &mut dyn Visitor<'a>, path: &mut NodePath, node: &'a Node) {
    if node.is_expression() {
        visitor.enter_expression(path, node);

        if path.skipped {
            return;
        }
    }

    match node {
        Node::Program(node) => visitor.enter_program(path, node),
        Node::ExecutableBlock(node) => visitor.enter_executable_block(path, node),
        Node::VariableBlock(node) => visitor.enter_variable_block(path, node),
        Node::VariableDeclaration(node) => visitor.enter_variable_declaration(path, node),
        Node::StatementBlock(node) => visitor.enter_statement_block(path, node),
        Node::Assignment(node) => visitor.enter_assignment(path, node),
        Node::IfStatement(node) => visitor.enter_if_statement(path, node),
        Node::WhileStatement(node) => visitor.enter_while_statement(path, node),
        Node::PrintStatement(node) => visitor.enter_print_statement(path, node),
        Node::FunctionDefinition(node) => visitor.enter_function_definition(path, node),
        Node::FunctionCall(node) => visitor.enter_function_call(path, node),
        Node::Return(node) => visitor.enter_return(path, node),
        Node::IntLiteral(node) => visitor.enter_int_literal(path, node),
        Node::BoolLiteral(node) => visitor.enter_bool_literal(path, node),
        Node::StringLiteral(node) => visitor.enter_string_literal(path, node),
        Node::Parenthesized(node) => visitor.enter_parenthesized(path, node),
        Node::UnaryOp(node) => visitor.enter_unary_op(path, node),
        Node::MulDiv(node) => visitor.enter_mul_div(path, node),
        Node::AddSub(node) => visitor.enter_add_sub(path, node),
        Node::Compare(node) => visitor.enter_compare(path, node),
        Node::VariableRef(node) => visitor.enter_variable_ref(path, node),
    }
}

fn dispatch_exit<'a>(visitor: &mut dyn Visitor<'a>, path: &mut NodePath, node: &'a Node) {
    match node {
        Node::Program(node) => visitor.exit_program(path, node),
        Node::ExecutableBlock(node) => visitor.exit_executable_block(path, node),
        Node::VariableBlock(node) => visitor.exit_variable_block(path, node),
        Node::VariableDeclaration(node) => visitor.exit_variable_declaration(path, node),
        Node::StatementBlock(node) => visitor.exit_statement_block(path, node),
        Node::Assignment(node) => visitor.exit_assignment(path, node),
        Node::IfStatement(node) => visitor.exit_if_statement(path, node),
        Node::WhileStatement(node) => visitor.exit_while_statement(path, node),
        Node::PrintStatement(node) => visitor.exit_print_statement(path, node),
        Node::FunctionDefinition(node) => visitor.exit_function_definition(path, node),
        Node::FunctionCall(node) => visitor.exit_function_call(path, node),
        Node::Return(node) => visitor.exit_return(path, node),
        Node::IntLiteral(node) => visitor.exit_int_literal(path, node),
        Node::BoolLiteral(node) => visitor.exit_bool_literal(path, node),
        Node::StringLiteral(node) => visitor.exit_string_literal(path, node),
        Node::Parenthesized(node) => visitor.exit_parenthesized(path, node),
        Node::UnaryOp(node) => visitor.exit_unary_op(path, node),
        Node::MulDiv(node) => visitor.exit_mul_div(path, node),
        Node::AddSub(node) => visitor.exit_add_sub(path, node),
        Node::Compare(node) => visitor.exit_compare(path, node),
        Node::VariableRef(node) => visitor.exit_variable_ref(path, node),
    }

    if node.is_expression() {
        visitor.exit_expression(path, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct NodeCounter {
        number_of_expressions: i32,
        events: Vec<String>,
    }

    impl<'a> Visitor<'a> for NodeCounter {
        fn enter_expression(&mut self, _path: &mut NodePath, _expr: &'a Node) {
            self.number_of_expressions += 1;
        }

        fn enter_print_statement(&mut self, _path: &mut NodePath, _stmt: &'a PrintStatement) {
            self.events.push("enter print".to_string());
        }

        fn exit_print_statement(&mut self, _path: &mut NodePath, _stmt: &'a PrintStatement) {
            self.events.push("exit print".to_string());
        }

        fn exit_int_literal(&mut self, _path: &mut NodePath, expr: &'a IntLiteral) {
            self.events.push(format!("int {}", expr.value));
        }

        fn enter_function_definition(
            &mut self,
            path: &mut NodePath,
            _def: &'a FunctionDefinition,
        ) {
            path.skip();
        }
    }

    #[test]
    fn enter_and_exit_order() {
        let mut ast = Ast::new();
        let one = ast.int_literal(1);
        let two = ast.int_literal(2);
        let sum = ast.add_sub(AddSubOperator::Add, one, two);
        let print = ast.print(sum);
        let program = ast.main_program(vec![], vec![print]);

        let mut visitor = NodeCounter::default();
        traverse(&mut visitor, &ast, program);

        assert_eq!(visitor.number_of_expressions, 3);
        assert_eq!(
            visitor.events,
            vec!["enter print", "int 1", "int 2", "exit print"]
        );
    }

    #[test]
    fn skip_children() {
        let mut ast = Ast::new();
        let value = ast.int_literal(7);
        let print = ast.print(value);
        let statements = ast.statement_block(vec![print]);
        let body = ast.executable_block(None, statements);
        let function = ast.function_definition("f", vec![], None, body);
        let main_statements = ast.statement_block(vec![]);
        let main = ast.executable_block(None, main_statements);
        let program = ast.program(vec![function], main);

        let mut visitor = NodeCounter::default();
        traverse(&mut visitor, &ast, program);

        assert_eq!(visitor.number_of_expressions, 0);
        assert!(visitor.events.is_empty());
    }
}
