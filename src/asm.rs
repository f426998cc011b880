//! ## Memory Layout
//!
//! ```ignore
//!    .data                         .text
//!    +-----------+----------------+------------------+      +-----------------+
//!    | bool text | variable cells | string constants |      | main: ... exit  |
//!    +-----------+----------------+------------------+      +-----------------+
//!
//!    stack: grows down from $sp, one word per pending left operand
//!    heap:  `sbrk` buffers for concatenated strings
//! ```
//!
//! - **Accumulator** - `$t0`. Every expression fragment leaves its value here.
//! - **Operand stack** - A binary expression pushes its left operand on the
//!   runtime stack while the right operand is evaluated, so nesting is not
//!   limited by the number of registers.
//! - **Variable cells** - One `.word` per (scope, identifier), zero at load.
//! - **String constants** - One `.asciiz` per string literal occurrence.
//! - **Booleans** - Encoded as 0 and 1, printed as `false` and `true`.
pub mod allocator;
pub mod emitter;
pub mod pool;
pub mod templates;

pub use allocator::{StorageAllocator, StorageCell};
pub use emitter::{Assembly, CodeGenerator, CodeMap};
pub use pool::{StringConstant, StringPool};
pub use templates::{Mips, Templates};

use crate::semantic::Analysis;
use crate::syntax::{traverse, Ast, NodeId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("refusing to generate code for a program with {errors} semantic error(s)")]
    UnresolvedProgram { errors: usize },
}

/// Generates the program rooted at `root`.
///
/// Code is generated only for programs without semantic errors; otherwise
/// nothing is emitted and an error is returned.
pub fn generate<'a>(
    ast: &'a Ast,
    root: NodeId,
    analysis: &Analysis<'a>,
    templates: &dyn Templates,
) -> Result<Assembly, CodegenError> {
    if analysis.errors.has_errors() {
        return Err(CodegenError::UnresolvedProgram {
            errors: analysis.errors.len(),
        });
    }

    let mut generator = CodeGenerator::new(&analysis.types, analysis.global_scope, templates);
    traverse(&mut generator, ast, root);

    Ok(generator.finish(root))
}
