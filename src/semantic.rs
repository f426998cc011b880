mod binder;
mod errors;
mod inferencer;
mod scope;
mod types;

pub use errors::{Category, Diagnostic, ErrorLog};
pub use scope::{Scope, Symbol};
pub use types::*;

use crate::arena::BumpaloArena;
use crate::syntax::{traverse, Ast, NodeId};
use binder::ScopeBinder;
use inferencer::TypeInferencer;
use log::debug;

/// The name of the scope of the program's executable block.
pub const MAIN_SCOPE: &str = "$main";

/// The result of the semantic passes over one program.
#[derive(Debug)]
pub struct Analysis<'a> {
    pub global_scope: &'a Scope<'a>,
    pub types: TypeMap,
    pub errors: ErrorLog,
}

impl<'a> Analysis<'a> {
    /// Returns `true` if no semantic error was found, i.e. code can be
    /// generated for the program.
    pub fn is_ok(&self) -> bool {
        !self.errors.has_errors()
    }
}

/// Runs both semantic passes over the program rooted at `root`.
///
/// The first pass builds the scope tree and rejects unsupported
/// constructs, the second re-enters the same scopes to type expressions
/// and check constraints. Errors never stop either pass.
pub fn analyze<'a>(arena: &'a BumpaloArena, ast: &'a Ast, root: NodeId) -> Analysis<'a> {
    let global_scope = Scope::global(arena);
    let mut types = TypeMap::new();
    let mut errors = ErrorLog::new();

    let mut binder = ScopeBinder::new(arena, global_scope, &mut errors);
    traverse(&mut binder, ast, root);
    debug!("[analyze] binder: {} error(s)", errors.len());

    let mut inferencer = TypeInferencer::new(arena, ast, global_scope, &mut types, &mut errors);
    traverse(&mut inferencer, ast, root);
    debug!(
        "[analyze] inference: {} typed node(s), {} error(s)",
        types.len(),
        errors.len()
    );

    Analysis {
        global_scope,
        types,
        errors,
    }
}
