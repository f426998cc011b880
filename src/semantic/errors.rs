use crate::syntax::NodeId;
use serde::Serialize;
use std::fmt;
use std::slice;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    UnsupportedLanguageFeature,
    DuplicateName,
    UndefinedName,
    AssignToWrongType,
    ConditionNotBool,
    InvalidNegation,
    InvalidBinaryOp,
    UnprintableExpression,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::UnsupportedLanguageFeature => "UNSUPPORTED_LANGUAGE_FEATURE",
            Category::DuplicateName => "DUPLICATE_NAME",
            Category::UndefinedName => "UNDEFINED_NAME",
            Category::AssignToWrongType => "ASSIGN_TO_WRONG_TYPE",
            Category::ConditionNotBool => "CONDITION_NOT_BOOL",
            Category::InvalidNegation => "INVALID_NEGATION",
            Category::InvalidBinaryOp => "INVALID_BINARY_OP",
            Category::UnprintableExpression => "UNPRINTABLE_EXPRESSION",
        };
        write!(f, "{}", name)
    }
}

/// A semantic error found in the node `node`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{category} at node {node}: {message}")]
pub struct Diagnostic {
    pub node: NodeId,
    pub category: Category,
    pub message: String,
}

/// Semantic errors in the order they were detected.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorLog {
    entries: Vec<Diagnostic>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, node: NodeId, category: Category, message: S) {
        self.entries.push(Diagnostic {
            node,
            category,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.entries.iter().map(|d| d.category).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a Diagnostic;
    type IntoIter = slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Ast;

    #[test]
    fn keeps_detection_order() {
        let mut ast = Ast::new();
        let first = ast.variable("y");
        let second = ast.print(first);

        let mut log = ErrorLog::new();
        assert!(!log.has_errors());

        log.add(first, Category::UndefinedName, "Variable y is not declared");
        log.add(second, Category::UnprintableExpression, "Can't print y");

        assert!(log.has_errors());
        assert_eq!(
            log.categories(),
            vec![Category::UndefinedName, Category::UnprintableExpression]
        );
        assert_eq!(
            log.iter().next().unwrap().to_string(),
            "UNDEFINED_NAME at node #0: Variable y is not declared"
        );
    }

    #[test]
    fn serialize_category() {
        let json = serde_json::to_string(&Category::InvalidBinaryOp).unwrap();

        assert_eq!(json, "\"INVALID_BINARY_OP\"");
    }
}
