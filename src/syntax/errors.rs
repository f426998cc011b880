use super::NodeId;
use thiserror::Error;

/// A structural defect in an AST handed to the compiler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("node {parent} refers to missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("node {parent} refers to child {child} that was not created before it")]
    ForwardReference { parent: NodeId, child: NodeId },

    #[error("node {node} has more than one parent")]
    SharedNode { node: NodeId },

    #[error("node {parent} can't contain {kind} node {child}")]
    MisplacedNode {
        parent: NodeId,
        child: NodeId,
        kind: &'static str,
    },

    #[error("the tree has no program node")]
    MissingRoot,

    #[error("the root node must be a Program, but was {kind}")]
    RootNotProgram { kind: &'static str },
}
