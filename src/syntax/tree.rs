//! Grammar
//! -------
//!
//! ```ignore
//! Program             := FunctionDefinition* ExecutableBlock
//! FunctionDefinition  := "func" Id "(" (Parameter ",")* Parameter? ")" (":" Type)? ExecutableBlock
//! Parameter           := Id ":" Type
//! ExecutableBlock     := VariableBlock? StatementBlock
//! VariableBlock       := VariableDeclaration*
//! VariableDeclaration := "var" Id ":" Type ("=" Expression)?
//! StatementBlock      := Statement*
//! Statement           := Assignment | IfStatement | WhileStatement | PrintStatement
//!                      | FunctionCall | Return
//! Assignment          := Id "=" Expression
//! IfStatement         := "if" Expression "{" StatementBlock "}" ("else" "{" StatementBlock "}")?
//! WhileStatement      := "while" Expression "{" StatementBlock "}"
//! PrintStatement      := "print" Expression
//! Return              := "return" Expression?
//! Expression          := IntLiteral | BoolLiteral | StringLiteral | Parenthesized | UnaryOp
//!                      | MulDiv | AddSub | Compare | VariableRef | FunctionCall
//! Parenthesized       := "(" Expression ")"
//! UnaryOp             := ("-" | "!") Expression
//! MulDiv              := Expression ("*" | "/") Expression
//! AddSub              := Expression ("+" | "-") Expression
//! Compare             := Expression ("<" | "<=" | "==" | "!=" | ">" | ">=") Expression
//! FunctionCall        := Id "(" (Expression ",")* Expression? ")"
//! VariableRef         := Id
//! Type                := "Int" | "Bool" | "String"
//! ```
//!
//! Nodes are stored in a flat arena and refer to each other by [`NodeId`].
//! A node is always pushed after its children, so every child id is
//! smaller than the id of its parent.
use super::AstError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type name written in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    Int,
    Bool,
    String,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "Int"),
            TypeName::Bool => write!(f, "Bool"),
            TypeName::String => write!(f, "String"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MulDivOperator {
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddSubOperator {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOperator {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "!",
        }
    }
}

impl MulDivOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            MulDivOperator::Mul => "*",
            MulDivOperator::Div => "/",
        }
    }
}

impl AddSubOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AddSubOperator::Add => "+",
            AddSubOperator::Sub => "-",
        }
    }
}

impl CompareOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOperator::Lt => "<",
            CompareOperator::Le => "<=",
            CompareOperator::Eq => "==",
            CompareOperator::Ne => "!=",
            CompareOperator::Gt => ">",
            CompareOperator::Ge => ">=",
        }
    }
}

// --- Program structure

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<NodeId>,
    pub main: NodeId,
}

/// The single executable block of a program: `$main`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableBlock {
    pub variables: Option<NodeId>,
    pub statements: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBlock {
    pub declarations: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub type_name: TypeName,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementBlock {
    pub statements: Vec<NodeId>,
}

// --- Statements

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: NodeId,
    pub then_block: NodeId,
    pub else_block: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStatement {
    pub value: NodeId,
}

// --- Unsupported constructs

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub value: Option<NodeId>,
}

// --- Expressions

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntLiteral {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolLiteral {
    pub value: bool,
}

/// A string literal. `value` is the text between the quotes exactly as
/// written in the source, escape sequences included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parenthesized {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub operator: UnaryOperator,
    pub operand: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulDiv {
    pub operator: MulDivOperator,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSub {
    pub operator: AddSubOperator,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compare {
    pub operator: CompareOperator,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Program(Program),
    ExecutableBlock(ExecutableBlock),
    VariableBlock(VariableBlock),
    VariableDeclaration(VariableDeclaration),
    StatementBlock(StatementBlock),
    Assignment(Assignment),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    PrintStatement(PrintStatement),
    FunctionDefinition(FunctionDefinition),
    FunctionCall(FunctionCall),
    Return(ReturnStatement),
    IntLiteral(IntLiteral),
    BoolLiteral(BoolLiteral),
    StringLiteral(StringLiteral),
    Parenthesized(Parenthesized),
    UnaryOp(UnaryOp),
    MulDiv(MulDiv),
    AddSub(AddSub),
    Compare(Compare),
    VariableRef(VariableRef),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Program(_) => "Program",
            Node::ExecutableBlock(_) => "ExecutableBlock",
            Node::VariableBlock(_) => "VariableBlock",
            Node::VariableDeclaration(_) => "VariableDeclaration",
            Node::StatementBlock(_) => "StatementBlock",
            Node::Assignment(_) => "Assignment",
            Node::IfStatement(_) => "IfStatement",
            Node::WhileStatement(_) => "WhileStatement",
            Node::PrintStatement(_) => "PrintStatement",
            Node::FunctionDefinition(_) => "FunctionDefinition",
            Node::FunctionCall(_) => "FunctionCall",
            Node::Return(_) => "Return",
            Node::IntLiteral(_) => "IntLiteral",
            Node::BoolLiteral(_) => "BoolLiteral",
            Node::StringLiteral(_) => "StringLiteral",
            Node::Parenthesized(_) => "Parenthesized",
            Node::UnaryOp(_) => "UnaryOp",
            Node::MulDiv(_) => "MulDiv",
            Node::AddSub(_) => "AddSub",
            Node::Compare(_) => "Compare",
            Node::VariableRef(_) => "VariableRef",
        }
    }

    /// Returns `true` if this node computes a value and therefore gets an
    /// entry in the type map.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::IntLiteral(_)
                | Node::BoolLiteral(_)
                | Node::StringLiteral(_)
                | Node::Parenthesized(_)
                | Node::UnaryOp(_)
                | Node::MulDiv(_)
                | Node::AddSub(_)
                | Node::Compare(_)
                | Node::VariableRef(_)
                | Node::FunctionCall(_)
        )
    }

    /// A program is always the root, and an executable block opens a scope
    /// only as the main block of a program or the body of a function.
    fn accepts_child(&self, id: NodeId, child: &Node) -> bool {
        match child {
            Node::Program(_) => false,
            Node::ExecutableBlock(_) => match self {
                Node::Program(node) => node.main == id,
                Node::FunctionDefinition(node) => node.body == id,
                _ => false,
            },
            _ => true,
        }
    }

    /// Child nodes in traversal order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Program(node) => {
                let mut children = node.functions.clone();
                children.push(node.main);
                children
            }
            Node::ExecutableBlock(node) => {
                node.variables.iter().copied().chain(Some(node.statements)).collect()
            }
            Node::VariableBlock(node) => node.declarations.clone(),
            Node::VariableDeclaration(node) => node.init.iter().copied().collect(),
            Node::StatementBlock(node) => node.statements.clone(),
            Node::Assignment(node) => vec![node.value],
            Node::IfStatement(node) => vec![node.condition, node.then_block]
                .into_iter()
                .chain(node.else_block)
                .collect(),
            Node::WhileStatement(node) => vec![node.condition, node.body],
            Node::PrintStatement(node) => vec![node.value],
            Node::FunctionDefinition(node) => vec![node.body],
            Node::FunctionCall(node) => node.arguments.clone(),
            Node::Return(node) => node.value.iter().copied().collect(),
            Node::IntLiteral(_)
            | Node::BoolLiteral(_)
            | Node::StringLiteral(_)
            | Node::VariableRef(_) => vec![],
            Node::Parenthesized(node) => vec![node.expression],
            Node::UnaryOp(node) => vec![node.operand],
            Node::MulDiv(node) => vec![node.lhs, node.rhs],
            Node::AddSub(node) => vec![node.lhs, node.rhs],
            Node::Compare(node) => vec![node.lhs, node.rhs],
        }
    }
}

/// An arena of AST nodes indexed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`.
    ///
    /// Panics if `id` was not produced by this arena. Run [`Ast::validate`]
    /// on trees that were not built through the builder methods.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);

        if let Node::Program(_) = node {
            self.root = Some(id);
        }
        self.nodes.push(node);
        id
    }

    /// Checks the structural invariants the passes rely on and returns the
    /// root program node.
    pub fn validate(&self) -> Result<NodeId, AstError> {
        let mut seen = HashSet::new();

        for (id, node) in self.iter() {
            for child in node.children() {
                if child.index() >= self.nodes.len() {
                    return Err(AstError::DanglingChild { parent: id, child });
                }
                if child >= id {
                    return Err(AstError::ForwardReference { parent: id, child });
                }
                if !seen.insert(child) {
                    return Err(AstError::SharedNode { node: child });
                }
                if !node.accepts_child(child, &self.nodes[child.index()]) {
                    return Err(AstError::MisplacedNode {
                        parent: id,
                        child,
                        kind: self.nodes[child.index()].kind_name(),
                    });
                }
            }
        }

        let root = self.root.ok_or(AstError::MissingRoot)?;

        match self.get(root) {
            Some(Node::Program(_)) => Ok(root),
            Some(node) => Err(AstError::RootNotProgram {
                kind: node.kind_name(),
            }),
            None => Err(AstError::MissingRoot),
        }
    }

    // --- builders

    pub fn program(&mut self, functions: Vec<NodeId>, main: NodeId) -> NodeId {
        self.push(Node::Program(Program { functions, main }))
    }

    pub fn executable_block(&mut self, variables: Option<NodeId>, statements: NodeId) -> NodeId {
        self.push(Node::ExecutableBlock(ExecutableBlock {
            variables,
            statements,
        }))
    }

    pub fn variable_block(&mut self, declarations: Vec<NodeId>) -> NodeId {
        self.push(Node::VariableBlock(VariableBlock { declarations }))
    }

    pub fn variable_declaration<S: Into<String>>(
        &mut self,
        name: S,
        type_name: TypeName,
        init: Option<NodeId>,
    ) -> NodeId {
        self.push(Node::VariableDeclaration(VariableDeclaration {
            name: name.into(),
            type_name,
            init,
        }))
    }

    pub fn statement_block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.push(Node::StatementBlock(StatementBlock { statements }))
    }

    pub fn assignment<S: Into<String>>(&mut self, name: S, value: NodeId) -> NodeId {
        self.push(Node::Assignment(Assignment {
            name: name.into(),
            value,
        }))
    }

    pub fn if_statement(
        &mut self,
        condition: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    ) -> NodeId {
        self.push(Node::IfStatement(IfStatement {
            condition,
            then_block,
            else_block,
        }))
    }

    pub fn while_statement(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.push(Node::WhileStatement(WhileStatement { condition, body }))
    }

    pub fn print(&mut self, value: NodeId) -> NodeId {
        self.push(Node::PrintStatement(PrintStatement { value }))
    }

    pub fn function_definition<S: Into<String>>(
        &mut self,
        name: S,
        parameters: Vec<Parameter>,
        return_type: Option<TypeName>,
        body: NodeId,
    ) -> NodeId {
        self.push(Node::FunctionDefinition(FunctionDefinition {
            name: name.into(),
            parameters,
            return_type,
            body,
        }))
    }

    pub fn function_call<S: Into<String>>(&mut self, name: S, arguments: Vec<NodeId>) -> NodeId {
        self.push(Node::FunctionCall(FunctionCall {
            name: name.into(),
            arguments,
        }))
    }

    pub fn return_statement(&mut self, value: Option<NodeId>) -> NodeId {
        self.push(Node::Return(ReturnStatement { value }))
    }

    pub fn int_literal(&mut self, value: i32) -> NodeId {
        self.push(Node::IntLiteral(IntLiteral { value }))
    }

    pub fn bool_literal(&mut self, value: bool) -> NodeId {
        self.push(Node::BoolLiteral(BoolLiteral { value }))
    }

    pub fn string_literal<S: Into<String>>(&mut self, value: S) -> NodeId {
        self.push(Node::StringLiteral(StringLiteral {
            value: value.into(),
        }))
    }

    pub fn parenthesized(&mut self, expression: NodeId) -> NodeId {
        self.push(Node::Parenthesized(Parenthesized { expression }))
    }

    pub fn unary(&mut self, operator: UnaryOperator, operand: NodeId) -> NodeId {
        self.push(Node::UnaryOp(UnaryOp { operator, operand }))
    }

    pub fn mul_div(&mut self, operator: MulDivOperator, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(Node::MulDiv(MulDiv { operator, lhs, rhs }))
    }

    pub fn add_sub(&mut self, operator: AddSubOperator, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(Node::AddSub(AddSub { operator, lhs, rhs }))
    }

    pub fn compare(&mut self, operator: CompareOperator, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(Node::Compare(Compare { operator, lhs, rhs }))
    }

    pub fn variable<S: Into<String>>(&mut self, name: S) -> NodeId {
        self.push(Node::VariableRef(VariableRef { name: name.into() }))
    }

    /// Wraps `statements` into a `$main` block and a program without
    /// function definitions.
    pub fn main_program(&mut self, declarations: Vec<NodeId>, statements: Vec<NodeId>) -> NodeId {
        let variables = if declarations.is_empty() {
            None
        } else {
            Some(self.variable_block(declarations))
        };
        let statements = self.statement_block(statements);
        let main = self.executable_block(variables, statements);

        self.program(vec![], main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn children_are_pushed_first() {
        let mut ast = Ast::new();
        let one = ast.int_literal(1);
        let two = ast.int_literal(2);
        let sum = ast.add_sub(AddSubOperator::Add, one, two);

        assert!(one < sum && two < sum);
        assert_eq!(ast.node(sum).children(), vec![one, two]);
    }

    #[test]
    fn validate_builder_program() {
        let mut ast = Ast::new();
        let value = ast.int_literal(42);
        let print = ast.print(value);
        let program = ast.main_program(vec![], vec![print]);

        assert_eq!(ast.validate().unwrap(), program);
    }

    #[test]
    fn validate_missing_root() {
        let mut ast = Ast::new();
        ast.int_literal(1);

        assert_matches!(ast.validate(), Err(AstError::MissingRoot));
    }

    #[test]
    fn validate_shared_node() {
        let mut ast = Ast::new();
        let value = ast.int_literal(1);
        let print1 = ast.print(value);
        let print2 = ast.print(value);
        ast.main_program(vec![], vec![print1, print2]);

        assert_matches!(ast.validate(), Err(AstError::SharedNode { node }) => {
            assert_eq!(node, value);
        });
    }

    #[test]
    fn validate_dangling_child() {
        let json = r#"{
            "nodes": [
                { "kind": "PrintStatement", "value": 7 }
            ],
            "root": null
        }"#;
        let ast = Ast::from_json(json).unwrap();

        assert_matches!(ast.validate(), Err(AstError::DanglingChild { .. }));
    }

    #[test]
    fn validate_forward_reference() {
        let json = r#"{
            "nodes": [
                { "kind": "PrintStatement", "value": 1 },
                { "kind": "IntLiteral", "value": 1 }
            ],
            "root": null
        }"#;
        let ast = Ast::from_json(json).unwrap();

        assert_matches!(ast.validate(), Err(AstError::ForwardReference { parent, child }) => {
            assert_eq!(parent.index(), 0);
            assert_eq!(child.index(), 1);
        });
    }

    #[test]
    fn validate_root_not_program() {
        let json = r#"{
            "nodes": [
                { "kind": "IntLiteral", "value": 1 }
            ],
            "root": 0
        }"#;
        let ast = Ast::from_json(json).unwrap();

        assert_matches!(
            ast.validate(),
            Err(AstError::RootNotProgram { kind: "IntLiteral" })
        );
    }

    #[test]
    fn validate_nested_executable_block() {
        let mut ast = Ast::new();
        let inner_statements = ast.statement_block(vec![]);
        let inner = ast.executable_block(None, inner_statements);
        ast.main_program(vec![], vec![inner]);

        assert_matches!(ast.validate(), Err(AstError::MisplacedNode { child, kind, .. }) => {
            assert_eq!(child, inner);
            assert_eq!(kind, "ExecutableBlock");
        });

        // Two sibling blocks can't both open `$main`.
        let json = r#"{
            "nodes": [
                { "kind": "StatementBlock", "statements": [] },
                { "kind": "ExecutableBlock", "variables": null, "statements": 0 },
                { "kind": "StatementBlock", "statements": [] },
                { "kind": "ExecutableBlock", "variables": null, "statements": 2 },
                { "kind": "StatementBlock", "statements": [3] },
                { "kind": "ExecutableBlock", "variables": null, "statements": 4 },
                { "kind": "Program", "functions": [1], "main": 5 }
            ],
            "root": 6
        }"#;
        let ast = Ast::from_json(json).unwrap();

        assert_matches!(ast.validate(), Err(AstError::MisplacedNode { .. }));
    }

    #[test]
    fn validate_function_body() {
        let mut ast = Ast::new();
        let statements = ast.statement_block(vec![]);
        let body = ast.executable_block(None, statements);
        let function = ast.function_definition("f", vec![], None, body);
        let main_statements = ast.statement_block(vec![]);
        let main = ast.executable_block(None, main_statements);
        let program = ast.program(vec![function], main);

        assert_eq!(ast.validate(), Ok(program));
    }

    #[test]
    fn deserialize_program() {
        let json = r#"{
            "nodes": [
                { "kind": "IntLiteral", "value": 5 },
                { "kind": "PrintStatement", "value": 0 },
                { "kind": "StatementBlock", "statements": [1] },
                { "kind": "ExecutableBlock", "variables": null, "statements": 2 },
                { "kind": "Program", "functions": [], "main": 3 }
            ],
            "root": 4
        }"#;
        let ast = Ast::from_json(json).unwrap();
        let root = ast.validate().unwrap();

        assert_matches!(ast.node(root), Node::Program(Program { functions, .. }) => {
            assert!(functions.is_empty());
        });
        assert_eq!(ast.iter().filter(|(_, node)| node.is_expression()).count(), 1);
    }
}
