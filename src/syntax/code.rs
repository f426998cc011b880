use super::{Ast, Node, NodeId};
use std::fmt;

/// Renders a node back into Nimble source text, for use in messages.
///
/// Blocks are abbreviated as `{ ... }`.
#[derive(Debug, Clone, Copy)]
pub struct Code<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> Code<'a> {
    pub fn new(ast: &'a Ast, id: NodeId) -> Self {
        Self { ast, id }
    }

    fn child(&self, id: NodeId) -> Code<'a> {
        Code::new(self.ast, id)
    }
}

impl fmt::Display for Code<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ast.node(self.id) {
            Node::Program(_) | Node::ExecutableBlock(_) => write!(f, "{{ ... }}"),
            Node::VariableBlock(_) | Node::StatementBlock(_) => write!(f, "{{ ... }}"),
            Node::VariableDeclaration(node) => {
                write!(f, "var {} : {}", node.name, node.type_name)?;
                if let Some(init) = node.init {
                    write!(f, " = {}", self.child(init))?;
                }
                Ok(())
            }
            Node::Assignment(node) => write!(f, "{} = {}", node.name, self.child(node.value)),
            Node::IfStatement(node) => {
                write!(f, "if {} {{ ... }}", self.child(node.condition))?;
                if node.else_block.is_some() {
                    write!(f, " else {{ ... }}")?;
                }
                Ok(())
            }
            Node::WhileStatement(node) => {
                write!(f, "while {} {{ ... }}", self.child(node.condition))
            }
            Node::PrintStatement(node) => write!(f, "print {}", self.child(node.value)),
            Node::FunctionDefinition(node) => {
                write!(f, "func {}(", node.name)?;
                for (i, param) in node.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", param.name, param.type_name)?;
                }
                write!(f, ")")?;
                if let Some(ty) = node.return_type {
                    write!(f, " : {}", ty)?;
                }
                write!(f, " {{ ... }}")
            }
            Node::FunctionCall(node) => {
                write!(f, "{}(", node.name)?;
                for (i, arg) in node.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.child(*arg))?;
                }
                write!(f, ")")
            }
            Node::Return(node) => match node.value {
                Some(value) => write!(f, "return {}", self.child(value)),
                None => write!(f, "return"),
            },
            Node::IntLiteral(node) => write!(f, "{}", node.value),
            Node::BoolLiteral(node) => write!(f, "{}", node.value),
            Node::StringLiteral(node) => write!(f, "\"{}\"", node.value),
            Node::Parenthesized(node) => write!(f, "({})", self.child(node.expression)),
            Node::UnaryOp(node) => {
                write!(f, "{}{}", node.operator.as_str(), self.child(node.operand))
            }
            Node::MulDiv(node) => write!(
                f,
                "{} {} {}",
                self.child(node.lhs),
                node.operator.as_str(),
                self.child(node.rhs)
            ),
            Node::AddSub(node) => write!(
                f,
                "{} {} {}",
                self.child(node.lhs),
                node.operator.as_str(),
                self.child(node.rhs)
            ),
            Node::Compare(node) => write!(
                f,
                "{} {} {}",
                self.child(node.lhs),
                node.operator.as_str(),
                self.child(node.rhs)
            ),
            Node::VariableRef(node) => write!(f, "{}", node.name),
        }
    }
}

impl Ast {
    pub fn code(&self, id: NodeId) -> Code<'_> {
        Code::new(self, id)
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{AddSubOperator, Ast, CompareOperator, TypeName, UnaryOperator};

    #[test]
    fn render_expression() {
        let mut ast = Ast::new();
        let x = ast.variable("x");
        let one = ast.int_literal(1);
        let sum = ast.add_sub(AddSubOperator::Add, x, one);
        let grouped = ast.parenthesized(sum);
        let neg = ast.unary(UnaryOperator::Minus, grouped);
        let ten = ast.int_literal(10);
        let cmp = ast.compare(CompareOperator::Le, neg, ten);

        assert_eq!(ast.code(cmp).to_string(), "-(x + 1) <= 10");
    }

    #[test]
    fn render_statements() {
        let mut ast = Ast::new();
        let s = ast.string_literal("hi");
        let decl = ast.variable_declaration("s", TypeName::String, Some(s));
        let one = ast.int_literal(1);
        let body = ast.statement_block(vec![]);
        let while_ = ast.while_statement(one, body);

        assert_eq!(ast.code(decl).to_string(), "var s : String = \"hi\"");
        assert_eq!(ast.code(while_).to_string(), "while 1 { ... }");
    }
}
