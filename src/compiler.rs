pub mod cli;
pub use cli::{Command, CompilerOptions, Emit};

use crate::arena::BumpaloArena;
use crate::asm::{self, CodegenError, Mips};
use crate::semantic::{self, Diagnostic, ErrorLog};
use crate::syntax::{Ast, AstError};
use log::info;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    InputSourceError(#[from] io::Error),

    #[error("invalid AST input: {0}")]
    AstFormatError(#[from] serde_json::Error),

    #[error("malformed AST: {0}")]
    MalformedAst(#[from] AstError),

    #[error(transparent)]
    SemanticErrors(#[from] Report),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InvalidOption(message)
    }
}

/// The semantic errors that stopped a compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl From<ErrorLog> for Report {
    fn from(errors: ErrorLog) -> Self {
        Self {
            diagnostics: errors.into_vec(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "found {} semantic error(s)", self.diagnostics.len())?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

/// Compiles a program to MIPS assembly text.
pub fn compile(ast: &Ast) -> Result<String, CompilerError> {
    compile_to(ast, Emit::Asm)
}

/// Runs the compiler up to the stage that produces `emit`.
///
/// `Emit::Types` and `Emit::Diagnostics` stop after semantic analysis and
/// render its side tables as JSON; they succeed even if the program has
/// semantic errors.
pub fn compile_to(ast: &Ast, emit: Emit) -> Result<String, CompilerError> {
    let root = ast.validate()?;
    let arena = BumpaloArena::new();
    let analysis = semantic::analyze(&arena, ast, root);

    match emit {
        Emit::Types => Ok(serde_json::to_string_pretty(&analysis.types)?),
        Emit::Diagnostics => Ok(serde_json::to_string_pretty(&analysis.errors)?),
        Emit::Asm => {
            if analysis.errors.has_errors() {
                info!("[compile] {} semantic error(s)", analysis.errors.len());
                return Err(Report::from(analysis.errors).into());
            }

            let assembly = asm::generate(ast, root, &analysis, &Mips)?;
            Ok(assembly.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::Category;
    use crate::syntax::TypeName;
    use assert_matches::assert_matches;

    fn hello() -> Ast {
        let mut ast = Ast::new();
        let hi = ast.string_literal("hello");
        let decl = ast.variable_declaration("s", TypeName::String, Some(hi));
        let s = ast.variable("s");
        let print = ast.print(s);
        ast.main_program(vec![decl], vec![print]);
        ast
    }

    fn undeclared() -> Ast {
        let mut ast = Ast::new();
        let one = ast.int_literal(1);
        let assign = ast.assignment("x", one);
        ast.main_program(vec![], vec![assign]);
        ast
    }

    #[test]
    fn compile_program() {
        let asm = compile(&hello()).unwrap();

        assert!(asm.contains("var_main_s: .word 0"));
        assert!(asm.contains("string_0: .asciiz \"hello\""));
        assert!(asm.contains("la     $t0 string_0\nsw     $t0 var_main_s"));
    }

    #[test]
    fn compile_program_with_semantic_errors() {
        let err = compile(&undeclared()).unwrap_err();

        assert_matches!(&err, CompilerError::SemanticErrors(report) => {
            assert_eq!(report.len(), 1);
            assert_eq!(report.diagnostics()[0].category, Category::UndefinedName);
        });
        assert_eq!(
            err.to_string(),
            "found 1 semantic error(s)\n  UNDEFINED_NAME at node #1: Assignment target x not declared"
        );
    }

    #[test]
    fn compile_malformed_ast() {
        let mut ast = Ast::new();
        ast.int_literal(1);

        assert_matches!(
            compile(&ast),
            Err(CompilerError::MalformedAst(AstError::MissingRoot))
        );
    }

    #[test]
    fn emit_diagnostics_without_generating_code() {
        let json = compile_to(&undeclared(), Emit::Diagnostics).unwrap();

        assert!(json.contains("\"category\": \"UNDEFINED_NAME\""));
        assert!(json.contains("\"node\": 1"));

        let json = compile_to(&hello(), Emit::Diagnostics).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn emit_types() {
        let json = compile_to(&hello(), Emit::Types).unwrap();

        assert!(json.contains("\"0\": \"String\""));
        assert!(json.contains("\"2\": \"String\""));
    }
}
